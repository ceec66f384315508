//! Drawable resources: textures, sprites, sprite atlases and font atlases.
//!
//! Resources are plain values holding a [`Texture`] handle plus precomputed
//! UV rectangles. They never talk to the backend after construction; drawing
//! goes through [`crate::render::RenderStack`].

mod font_atlas;
mod font_bake;
mod image;
mod sprite;
mod sprite_atlas;
mod texture;

pub use font_atlas::{FontAtlas, FontAtlasBuilder};
pub use font_bake::{bake_font_atlas, FontBakeError};
pub use image::{ImageError, ImageRgba};
pub use sprite::Sprite;
pub use sprite_atlas::{SpriteAtlas, SpriteAtlasBuilder};
pub use texture::Texture;
