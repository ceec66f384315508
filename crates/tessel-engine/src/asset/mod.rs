//! Lookup of drawable resources by numeric id.
//!
//! Missing assets are not errors: the `wrap_*_asset` helpers on
//! [`RenderStack`] skip the callback and log at debug level.

use std::collections::HashMap;

use crate::backend::GfxBackend;
use crate::coords::Vec3;
use crate::gfx::{FontAtlas, Sprite, SpriteAtlas, Texture};
use crate::render::{FontAtlasWrapper, RenderStack, SpriteAtlasWrapper, SpriteWrapper, TextureWrapper};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u32);

/// Source of drawable resources. Every lookup may come back empty.
pub trait AssetProvider {
    fn texture(&self, id: AssetId) -> Option<&Texture>;
    fn sprite(&self, id: AssetId) -> Option<&Sprite>;
    fn sprite_atlas(&self, id: AssetId) -> Option<&SpriteAtlas>;
    fn font_atlas(&self, id: AssetId) -> Option<&FontAtlas>;
}

/// In-memory [`AssetProvider`].
#[derive(Debug, Default)]
pub struct AssetBag {
    textures: HashMap<AssetId, Texture>,
    sprites: HashMap<AssetId, Sprite>,
    sprite_atlases: HashMap<AssetId, SpriteAtlas>,
    font_atlases: HashMap<AssetId, FontAtlas>,
}

impl AssetBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_texture(&mut self, id: AssetId, texture: Texture) -> &mut Self {
        self.textures.insert(id, texture);
        self
    }

    pub fn insert_sprite(&mut self, id: AssetId, sprite: Sprite) -> &mut Self {
        self.sprites.insert(id, sprite);
        self
    }

    pub fn insert_sprite_atlas(&mut self, id: AssetId, atlas: SpriteAtlas) -> &mut Self {
        self.sprite_atlases.insert(id, atlas);
        self
    }

    pub fn insert_font_atlas(&mut self, id: AssetId, font: FontAtlas) -> &mut Self {
        self.font_atlases.insert(id, font);
        self
    }

    /// Every texture referenced by the bag, deduplicated.
    pub fn textures_in_use(&self) -> Vec<Texture> {
        let mut all: Vec<Texture> = self
            .textures
            .values()
            .copied()
            .chain(self.sprites.values().map(Sprite::texture))
            .chain(self.sprite_atlases.values().map(SpriteAtlas::texture))
            .chain(self.font_atlases.values().map(FontAtlas::texture))
            .collect();
        all.sort_by_key(|t| t.id.get());
        all.dedup();
        all
    }

    /// Destroys every texture and empties the bag.
    pub fn release<B: GfxBackend + ?Sized>(&mut self, backend: &mut B) {
        for texture in self.textures_in_use() {
            texture.destroy(backend);
        }
        *self = Self::default();
    }
}

impl AssetProvider for AssetBag {
    fn texture(&self, id: AssetId) -> Option<&Texture> {
        self.textures.get(&id)
    }

    fn sprite(&self, id: AssetId) -> Option<&Sprite> {
        self.sprites.get(&id)
    }

    fn sprite_atlas(&self, id: AssetId) -> Option<&SpriteAtlas> {
        self.sprite_atlases.get(&id)
    }

    fn font_atlas(&self, id: AssetId) -> Option<&FontAtlas> {
        self.font_atlases.get(&id)
    }
}

fn missing(kind: &str, id: AssetId) {
    log::debug!("{kind} asset {} not found; skipping draw", id.0);
}

impl<B: GfxBackend> RenderStack<B> {
    pub fn wrap_texture_asset<P: AssetProvider + ?Sized>(
        &mut self,
        assets: &P,
        id: AssetId,
        f: impl FnOnce(&mut TextureWrapper<'_, B>),
    ) -> &mut Self {
        match assets.texture(id) {
            Some(texture) => self.wrap_texture(texture, f),
            None => {
                missing("texture", id);
                self
            }
        }
    }

    pub fn wrap_sprite_asset<P: AssetProvider + ?Sized>(
        &mut self,
        assets: &P,
        id: AssetId,
        f: impl FnOnce(&mut SpriteWrapper<'_, B>),
    ) -> &mut Self {
        match assets.sprite(id) {
            Some(sprite) => self.wrap_sprite(sprite, f),
            None => {
                missing("sprite", id);
                self
            }
        }
    }

    pub fn wrap_sprite_atlas_asset<P: AssetProvider + ?Sized>(
        &mut self,
        assets: &P,
        id: AssetId,
        f: impl FnOnce(&mut SpriteAtlasWrapper<'_, B>),
    ) -> &mut Self {
        match assets.sprite_atlas(id) {
            Some(atlas) => self.wrap_sprite_atlas(atlas, f),
            None => {
                missing("sprite atlas", id);
                self
            }
        }
    }

    pub fn wrap_font_atlas_asset<P: AssetProvider + ?Sized>(
        &mut self,
        assets: &P,
        id: AssetId,
        pos: Vec3,
        f: impl FnOnce(&mut FontAtlasWrapper<'_, B>),
    ) -> &mut Self {
        match assets.font_atlas(id) {
            Some(font) => self.wrap_font_atlas(font, pos, f),
            None => {
                missing("font atlas", id);
                self
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::coords::{ColorRgba, Size2, Vec2};
    use crate::gfx::ImageRgba;
    use crate::render::RendererConfig;

    fn setup() -> (RenderStack<RecordingBackend>, AssetBag) {
        let mut stack = RenderStack::new(RecordingBackend::full(), RendererConfig::default()).unwrap();
        let image = ImageRgba::solid(Size2::new(8, 8), ColorRgba::WHITE);
        let texture = Texture::upload(stack.backend_mut(), &image).unwrap();

        let mut bag = AssetBag::new();
        bag.insert_texture(AssetId(1), texture)
            .insert_sprite(AssetId(2), Sprite::new(texture))
            .insert_sprite_atlas(AssetId(3), SpriteAtlas::builder(texture).cell_size(4, 4).grid_size(2, 2).build());
        (stack, bag)
    }

    #[test]
    fn missing_asset_is_a_silent_no_op() {
        let (mut stack, bag) = setup();
        let mut called = false;
        stack.begin_2d_scene();
        stack.wrap_texture_asset(&bag, AssetId(99), |_| called = true);
        stack.wrap_font_atlas_asset(&bag, AssetId(1), Vec3::zero(), |_| called = true);
        stack.end_scene();
        assert!(!called);
        assert_eq!(stack.backend().draws().count(), 0);
    }

    #[test]
    fn present_assets_draw() {
        let (mut stack, bag) = setup();
        stack.begin_2d_scene();
        stack
            .wrap_texture_asset(&bag, AssetId(1), |w| {
                w.draw_quad(Vec3::zero());
            })
            .wrap_sprite_asset(&bag, AssetId(2), |w| {
                w.draw_quad_sized(Vec3::zero(), Vec2::splat(2.0));
            })
            .wrap_sprite_atlas_asset(&bag, AssetId(3), |w| {
                w.draw_cell(1, 1, Vec3::zero()).draw_index(7, Vec3::zero());
            });
        stack.end_scene();
        // The out-of-range atlas index draws nothing.
        assert_eq!(stack.backend().draws().count(), 3);
    }

    #[test]
    fn release_destroys_shared_texture_once() {
        let (mut stack, mut bag) = setup();
        bag.release(stack.backend_mut());
        assert_eq!(stack.backend().live_textures(), 0);
        assert!(stack.backend_mut().take_error().is_none());
        assert!(bag.texture(AssetId(1)).is_none());
    }
}
