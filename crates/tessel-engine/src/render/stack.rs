use std::collections::HashMap;

use crate::backend::{BackendError, BlendFunc, GfxBackend, Projection, QuadPrimitive, TextureId};
use crate::coords::{ColorRgba, UvRect, Vec2, Vec3};
use crate::gfx::{FontAtlas, Sprite, SpriteAtlas, Texture};
use crate::view::{Anchor, Transform2, ViewDimens};

use super::quad_buffer::{QuadBufferCache, QuadBufferError, QuadBufferHandle, QuadRecord};
use super::wrappers::{FontAtlasWrapper, FontStyle, SpriteAtlasWrapper, SpriteWrapper, TextureWrapper};
use super::RendererConfig;

/// Projection mode selected by `begin_*_scene`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SceneMode {
    TwoD,
    ThreeD,
}

/// Runs `end` on drop so wraps release their state even if the callback unwinds.
struct Restore<'a, B: GfxBackend> {
    stack: &'a mut RenderStack<B>,
    end: fn(&mut RenderStack<B>),
}

impl<B: GfxBackend> Drop for Restore<'_, B> {
    fn drop(&mut self) {
        (self.end)(&mut *self.stack);
    }
}

/// The single owner of backend draw state.
///
/// Scale, offset, color, blend and texture are independent stacks: every
/// `begin_*` saves the current value of its axis and every matching `end_*`
/// restores it, so both begin/end pairs and `wrap_*` calls of the same kind
/// nest to any depth. Protocol violations (unbalanced ends, drawing outside
/// a scene) trip `debug_assert!`s and are unchecked in release builds.
///
/// All operations return `&mut Self` for chaining.
pub struct RenderStack<B: GfxBackend> {
    backend: B,
    dimens: ViewDimens,
    clear_color: ColorRgba,
    scene: Option<SceneMode>,
    quad_buffers: QuadBufferCache,
    font_colors: HashMap<String, ColorRgba>,

    transform: Transform2,
    scale_stack: Vec<(Vec2, f32)>,
    offset_stack: Vec<Vec2>,
    color: ColorRgba,
    color_stack: Vec<ColorRgba>,
    blend_stack: Vec<BlendFunc>,
    texture: Option<TextureId>,
    texture_stack: Vec<Option<TextureId>>,
    model_depth: usize,
}

impl<B: GfxBackend> RenderStack<B> {
    /// Applies the initial backend state. Any error the backend reports here is fatal.
    pub fn new(backend: B, config: RendererConfig) -> Result<Self, BackendError> {
        let dimens = ViewDimens::new(config.device_size, config.target_size);
        let font_colors = ColorRgba::NAMED
            .iter()
            .map(|(name, color)| ((*name).to_owned(), *color))
            .collect();

        let mut stack = Self {
            backend,
            dimens,
            clear_color: config.clear_color,
            scene: None,
            quad_buffers: QuadBufferCache::new(),
            font_colors,
            transform: Transform2::IDENTITY,
            scale_stack: Vec::new(),
            offset_stack: Vec::new(),
            color: ColorRgba::WHITE,
            color_stack: Vec::new(),
            blend_stack: Vec::new(),
            texture: None,
            texture_stack: Vec::new(),
            model_depth: 0,
        };

        let device = stack.dimens.device_size();
        stack.backend.set_viewport(device.x as u32, device.y as u32);
        stack.backend.set_clear_color(stack.clear_color);
        stack.backend.set_blend_func(BlendFunc::ALPHA);
        stack.backend.set_color(stack.color);
        stack.backend.bind_texture(None);

        if let Some(err) = stack.backend.take_error() {
            log::error!("failed to initialize {:?} backend: {err}", stack.backend.variant());
            return Err(err);
        }

        log::debug!(
            "render stack ready ({:?} backend, device {}x{}, target {}x{})",
            stack.backend.variant(),
            device.x,
            device.y,
            stack.dimens.target_size().x,
            stack.dimens.target_size().y
        );
        Ok(stack)
    }

    // ── scenes ────────────────────────────────────────────────────────────

    /// Orthographic projection over the device surface, origin top-left.
    pub fn begin_2d_scene(&mut self) -> &mut Self {
        self.begin_scene(SceneMode::TwoD)
    }

    /// Perspective projection for world geometry.
    pub fn begin_3d_scene(&mut self) -> &mut Self {
        self.begin_scene(SceneMode::ThreeD)
    }

    fn begin_scene(&mut self, mode: SceneMode) -> &mut Self {
        debug_assert!(self.is_balanced(), "scene switched with unbalanced render state");

        let size = self.dimens.device_size();
        let projection = match mode {
            SceneMode::TwoD => Projection::Ortho2d { width: size.x, height: size.y },
            SceneMode::ThreeD => Projection::Perspective3d { width: size.x, height: size.y },
        };
        self.backend.set_projection(projection);
        self.backend.load_identity();
        self.scene = Some(mode);
        self
    }

    /// Closes the current scene. Every axis must be back at its base value.
    pub fn end_scene(&mut self) -> &mut Self {
        debug_assert!(self.scene.is_some(), "end_scene without a begun scene");
        debug_assert!(self.is_balanced(), "scene ended with unbalanced render state");
        self.scene = None;
        self
    }

    /// True when no begin is waiting for its end on any axis.
    pub fn is_balanced(&self) -> bool {
        self.scale_stack.is_empty()
            && self.offset_stack.is_empty()
            && self.color_stack.is_empty()
            && self.blend_stack.is_empty()
            && self.texture_stack.is_empty()
            && self.model_depth == 0
    }

    // ── view ──────────────────────────────────────────────────────────────

    /// Recomputes the view for a new device size. Not allowed inside a scene.
    pub fn resize(&mut self, device_size: Vec2) -> &mut Self {
        debug_assert!(self.scene.is_none(), "resize inside a scene");
        self.dimens = self.dimens.resized(device_size);
        let size = self.dimens.device_size();
        self.backend.set_viewport(size.x as u32, size.y as u32);
        log::debug!("resized to {}x{} (aspect scale {})", size.x, size.y, self.dimens.aspect_scale());
        self
    }

    /// Clears color and depth with the configured clear color.
    pub fn clear_view(&mut self) -> &mut Self {
        self.backend.clear();
        self
    }

    pub fn set_clear_color(&mut self, color: ColorRgba) -> &mut Self {
        self.clear_color = color;
        self.backend.set_clear_color(color);
        self
    }

    // ── scale ─────────────────────────────────────────────────────────────

    /// Multiplies positions per axis; sizes by the smaller factor.
    pub fn begin_scale(&mut self, factor: Vec2) -> &mut Self {
        debug_assert!(factor.is_finite(), "non-finite scale {factor:?}");
        self.scale_stack.push((self.transform.scale, self.transform.size_scale));
        self.transform.scale = self.transform.scale.mul_vec(factor);
        self.transform.size_scale *= factor.min_element();
        self
    }

    pub fn begin_uniform_scale(&mut self, factor: f32) -> &mut Self {
        self.begin_scale(Vec2::splat(factor))
    }

    /// Largest uniform scale that fits the target inside the device.
    pub fn begin_auto_scale(&mut self) -> &mut Self {
        self.begin_uniform_scale(self.dimens.auto_scale())
    }

    /// Positions stretch to fill the device; sizes keep their aspect ratio.
    pub fn begin_stretch_scale(&mut self) -> &mut Self {
        self.scale_stack.push((self.transform.scale, self.transform.size_scale));
        self.transform.scale = self.transform.scale.mul_vec(self.dimens.scale());
        self.transform.size_scale *= self.dimens.aspect_scale();
        self
    }

    pub fn end_scale(&mut self) -> &mut Self {
        debug_assert!(!self.scale_stack.is_empty(), "end_scale without begin_scale");
        if let Some((scale, size_scale)) = self.scale_stack.pop() {
            self.transform.scale = scale;
            self.transform.size_scale = size_scale;
        }
        self
    }

    // ── offset ────────────────────────────────────────────────────────────

    /// Adds a device-space translation.
    pub fn begin_offset(&mut self, x: f32, y: f32) -> &mut Self {
        self.offset_stack.push(self.transform.offset);
        self.transform.offset = self.transform.offset + Vec2::new(x, y);
        self
    }

    /// Sets the offset that centers the scaled target on the device.
    /// Call after the scale is final.
    pub fn begin_auto_center_offset(&mut self) -> &mut Self {
        self.begin_anchor_offset(Anchor::CENTER)
    }

    /// Like [`begin_auto_center_offset`](Self::begin_auto_center_offset) with a
    /// normalized anchor: (0, 1) pins the target to the bottom-left.
    pub fn begin_anchor_offset(&mut self, anchor: Vec2) -> &mut Self {
        self.offset_stack.push(self.transform.offset);
        self.transform.offset = self.dimens.anchor_offset(self.transform.scale, anchor);
        self
    }

    pub fn end_offset(&mut self) -> &mut Self {
        debug_assert!(!self.offset_stack.is_empty(), "end_offset without begin_offset");
        if let Some(offset) = self.offset_stack.pop() {
            self.transform.offset = offset;
        }
        self
    }

    /// Auto scale plus centering offset. Pair with [`end_auto_center`](Self::end_auto_center).
    pub fn begin_auto_center(&mut self) -> &mut Self {
        self.begin_auto_anchor(Anchor::CENTER)
    }

    pub fn begin_auto_anchor(&mut self, anchor: Vec2) -> &mut Self {
        self.begin_auto_scale().begin_anchor_offset(anchor)
    }

    pub fn end_auto_center(&mut self) -> &mut Self {
        self.end_offset().end_scale()
    }

    // ── color ─────────────────────────────────────────────────────────────

    pub fn begin_color(&mut self, color: ColorRgba) -> &mut Self {
        self.color_stack.push(self.color);
        self.set_color(color);
        self
    }

    pub fn end_color(&mut self) -> &mut Self {
        debug_assert!(!self.color_stack.is_empty(), "end_color without begin_color");
        if let Some(color) = self.color_stack.pop() {
            self.set_color(color);
        }
        self
    }

    fn set_color(&mut self, color: ColorRgba) {
        self.color = color;
        self.backend.set_color(color);
    }

    // ── blend ─────────────────────────────────────────────────────────────

    pub fn begin_add_blend(&mut self) -> &mut Self {
        self.begin_blend(BlendFunc::ADDITIVE)
    }

    /// Saves all four factors of the current function; [`end_blend`](Self::end_blend)
    /// restores them verbatim.
    pub fn begin_blend(&mut self, func: BlendFunc) -> &mut Self {
        self.blend_stack.push(self.backend.blend_func());
        self.backend.set_blend_func(func);
        self
    }

    pub fn end_blend(&mut self) -> &mut Self {
        debug_assert!(!self.blend_stack.is_empty(), "end_blend without begin_blend");
        if let Some(func) = self.blend_stack.pop() {
            self.backend.set_blend_func(func);
        }
        self
    }

    // ── texture ───────────────────────────────────────────────────────────

    pub fn begin_texture(&mut self, texture: &Texture) -> &mut Self {
        self.begin_texture_id(Some(texture.id))
    }

    /// `None` unbinds for flat-colored quads until the matching end.
    pub fn begin_texture_id(&mut self, texture: Option<TextureId>) -> &mut Self {
        self.texture_stack.push(self.texture);
        self.bind_texture(texture);
        self
    }

    pub fn end_texture(&mut self) -> &mut Self {
        debug_assert!(!self.texture_stack.is_empty(), "end_texture without begin_texture");
        if let Some(texture) = self.texture_stack.pop() {
            self.bind_texture(texture);
        }
        self
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) {
        self.texture = texture;
        self.backend.bind_texture(texture);
    }

    // ── model matrix ──────────────────────────────────────────────────────

    pub fn translate_model_matrix(&mut self, by: Vec3) -> &mut Self {
        self.backend.translate(by);
        self
    }

    pub fn rotate_model_matrix(&mut self, angle_deg: f32, axis: Vec3) -> &mut Self {
        self.backend.rotate(angle_deg, axis);
        self
    }

    pub fn update_model_matrix(&mut self) -> &mut Self {
        self.backend.update_transform();
        self
    }

    pub fn push_model_matrix(&mut self) -> &mut Self {
        self.model_depth += 1;
        self.backend.push_transform();
        self
    }

    pub fn pop_model_matrix(&mut self) -> &mut Self {
        debug_assert!(self.model_depth > 0, "pop_model_matrix without push_model_matrix");
        self.model_depth = self.model_depth.saturating_sub(1);
        self.backend.pop_transform();
        self
    }

    // ── wraps ─────────────────────────────────────────────────────────────

    fn scoped<R>(&mut self, end: fn(&mut Self), f: impl FnOnce(&mut Self) -> R) -> R {
        let mut guard = Restore { stack: self, end };
        f(&mut *guard.stack)
    }

    pub fn wrap_color(&mut self, color: ColorRgba, f: impl FnOnce(&mut Self)) -> &mut Self {
        self.begin_color(color);
        self.scoped(|s| { s.end_color(); }, f);
        self
    }

    pub fn wrap_scale(&mut self, factor: Vec2, f: impl FnOnce(&mut Self)) -> &mut Self {
        self.begin_scale(factor);
        self.scoped(|s| { s.end_scale(); }, f);
        self
    }

    pub fn wrap_offset(&mut self, x: f32, y: f32, f: impl FnOnce(&mut Self)) -> &mut Self {
        self.begin_offset(x, y);
        self.scoped(|s| { s.end_offset(); }, f);
        self
    }

    pub fn wrap_auto_center(&mut self, f: impl FnOnce(&mut Self)) -> &mut Self {
        self.begin_auto_center();
        self.scoped(|s| { s.end_auto_center(); }, f);
        self
    }

    pub fn wrap_auto_anchor(&mut self, anchor: Vec2, f: impl FnOnce(&mut Self)) -> &mut Self {
        self.begin_auto_anchor(anchor);
        self.scoped(|s| { s.end_auto_center(); }, f);
        self
    }

    pub fn wrap_add_blend(&mut self, f: impl FnOnce(&mut Self)) -> &mut Self {
        self.wrap_blend(BlendFunc::ADDITIVE, f)
    }

    pub fn wrap_blend(&mut self, func: BlendFunc, f: impl FnOnce(&mut Self)) -> &mut Self {
        self.begin_blend(func);
        self.scoped(|s| { s.end_blend(); }, f);
        self
    }

    pub fn wrap_texture_id(&mut self, texture: Option<TextureId>, f: impl FnOnce(&mut Self)) -> &mut Self {
        self.begin_texture_id(texture);
        self.scoped(|s| { s.end_texture(); }, f);
        self
    }

    pub fn wrap_texture(&mut self, texture: &Texture, f: impl FnOnce(&mut TextureWrapper<'_, B>)) -> &mut Self {
        self.wrap_texture_src(texture, UvRect::FULL, f)
    }

    /// Like [`wrap_texture`](Self::wrap_texture), sampling only `src`.
    pub fn wrap_texture_src(
        &mut self,
        texture: &Texture,
        src: UvRect,
        f: impl FnOnce(&mut TextureWrapper<'_, B>),
    ) -> &mut Self {
        let texture = *texture;
        self.wrap_texture_id(Some(texture.id), |s| f(&mut TextureWrapper::new(s, texture, src)))
    }

    pub fn wrap_sprite(&mut self, sprite: &Sprite, f: impl FnOnce(&mut SpriteWrapper<'_, B>)) -> &mut Self {
        self.wrap_texture_id(Some(sprite.texture().id), |s| f(&mut SpriteWrapper::new(s, sprite)))
    }

    pub fn wrap_sprite_atlas(
        &mut self,
        atlas: &SpriteAtlas,
        f: impl FnOnce(&mut SpriteAtlasWrapper<'_, B>),
    ) -> &mut Self {
        self.wrap_texture_id(Some(atlas.texture().id), |s| f(&mut SpriteAtlasWrapper::new(s, atlas)))
    }

    /// Prints with the font's own cell size and spacing.
    pub fn wrap_font_atlas(
        &mut self,
        font: &FontAtlas,
        pos: Vec3,
        f: impl FnOnce(&mut FontAtlasWrapper<'_, B>),
    ) -> &mut Self {
        self.wrap_font_atlas_with(font, pos, FontStyle::of(font), f)
    }

    pub fn wrap_font_atlas_with(
        &mut self,
        font: &FontAtlas,
        pos: Vec3,
        style: FontStyle,
        f: impl FnOnce(&mut FontAtlasWrapper<'_, B>),
    ) -> &mut Self {
        self.wrap_texture_id(Some(font.texture().id), |s| {
            f(&mut FontAtlasWrapper::new(s, font, pos, style))
        })
    }

    /// Rotates everything drawn in `f` by `angle_deg` about the z axis through `pos`.
    pub fn wrap_rotate(&mut self, pos: Vec3, angle_deg: f32, f: impl FnOnce(&mut Self)) -> &mut Self {
        let pivot = self.transform.scaled_pos(pos);
        self.push_model_matrix()
            .translate_model_matrix(pivot)
            .rotate_model_matrix(angle_deg, Vec3::Z)
            .translate_model_matrix(-pivot)
            .update_model_matrix();
        self.scoped(|s| { s.pop_model_matrix(); }, f);
        self
    }

    // ── drawing ───────────────────────────────────────────────────────────

    /// One quad at target-space `pos` with target-space `size`, full texture.
    pub fn draw_quad(&mut self, pos: Vec3, size: Vec2) -> &mut Self {
        self.draw_src_quad(UvRect::FULL, pos, size)
    }

    /// One quad sampling `src` of the bound texture.
    pub fn draw_src_quad(&mut self, src: UvRect, pos: Vec3, size: Vec2) -> &mut Self {
        debug_assert!(self.scene.is_some(), "draw outside a scene");
        let dest = self.transform.dest_quad(pos, size);
        self.backend.draw_quad(&QuadPrimitive::from_dest(dest, src));
        self
    }

    // ── quad buffers ──────────────────────────────────────────────────────

    pub fn gen_quad_buffers(&mut self, count: usize) -> Result<QuadBufferHandle, QuadBufferError> {
        self.quad_buffers.generate(count)
    }

    pub fn delete_quad_buffers(&mut self, handle: QuadBufferHandle, count: usize) -> Result<(), QuadBufferError> {
        self.quad_buffers.delete(handle, count)
    }

    pub fn compile_quad_buffer(
        &mut self,
        handle: QuadBufferHandle,
        index: usize,
        record: QuadRecord,
    ) -> Result<(), QuadBufferError> {
        self.quad_buffers.compile(handle, index, record)
    }

    /// Replays a compiled slot under the current model transform and color.
    /// A record with its own texture binds it for the duration of the draw.
    pub fn draw_quad_buffer(&mut self, handle: QuadBufferHandle, index: usize) -> Result<(), QuadBufferError> {
        debug_assert!(self.scene.is_some(), "draw outside a scene");
        let record = *self.quad_buffers.record(handle, index)?;
        let quad = QuadPrimitive::from_corners(record.vertices, Some(record.normal));

        match record.texture {
            Some(texture) => {
                self.wrap_texture_id(Some(texture), |s| s.backend.draw_quad(&quad));
            }
            None => self.backend.draw_quad(&quad),
        }
        Ok(())
    }

    pub fn quad_buffers(&self) -> &QuadBufferCache {
        &self.quad_buffers
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn dimens(&self) -> &ViewDimens {
        &self.dimens
    }

    #[inline]
    pub fn clear_color(&self) -> ColorRgba {
        self.clear_color
    }

    #[inline]
    pub fn scene(&self) -> Option<SceneMode> {
        self.scene
    }

    #[inline]
    pub fn color(&self) -> ColorRgba {
        self.color
    }

    pub fn blend(&self) -> BlendFunc {
        self.backend.blend_func()
    }

    #[inline]
    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    #[inline]
    pub fn scale(&self) -> Vec2 {
        self.transform.scale
    }

    #[inline]
    pub fn size_scale(&self) -> f32 {
        self.transform.size_scale
    }

    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.transform.offset
    }

    #[inline]
    pub fn transform(&self) -> Transform2 {
        self.transform
    }

    /// Named colors usable in `print_fmt` runs.
    pub fn font_color(&self, name: &str) -> Option<ColorRgba> {
        self.font_colors.get(name).copied()
    }

    pub fn set_font_color(&mut self, name: impl Into<String>, color: ColorRgba) -> &mut Self {
        self.font_colors.insert(name.into(), color);
        self
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Direct backend access for resource creation and flushing. Changing
    /// draw state through it bypasses the stacks.
    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Logs a pending backend error, if any. Returns whether one was found.
    pub fn check_backend(&mut self) -> bool {
        match self.backend.take_error() {
            Some(err) => {
                log::warn!("{err}");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendCmd, BlendFactor, RecordingBackend};
    use crate::coords::Size2;
    use crate::gfx::ImageRgba;

    fn stack_with(device: (f32, f32), target: (f32, f32)) -> RenderStack<RecordingBackend> {
        let config = RendererConfig::new(device.into(), target.into());
        RenderStack::new(RecordingBackend::full(), config).unwrap()
    }

    fn stack() -> RenderStack<RecordingBackend> {
        stack_with((800.0, 600.0), (400.0, 300.0))
    }

    fn record(texture: Option<TextureId>) -> QuadRecord {
        QuadRecord {
            texture,
            normal: Vec3::new(0.0, 0.0, -1.0),
            vertices: [
                Vec3::new(-0.5, -0.5, -1.0),
                Vec3::new(0.5, -0.5, -1.0),
                Vec3::new(0.5, 0.5, -1.0),
                Vec3::new(-0.5, 0.5, -1.0),
            ],
        }
    }

    // ── init ──────────────────────────────────────────────────────────────

    #[test]
    fn init_applies_base_state() {
        let s = stack();
        assert_eq!(s.backend().blend_func(), BlendFunc::ALPHA);
        assert_eq!(s.backend().clear_color(), ColorRgba::BLACK);
        assert!(s.is_balanced());
        assert_eq!(s.font_color("hotpink"), Some(ColorRgba::HOT_PINK));
    }

    #[test]
    fn init_error_is_fatal() {
        let mut backend = RecordingBackend::full();
        backend.inject_error("init", "context rejected depth size");
        let err = RenderStack::new(backend, RendererConfig::default()).err();
        assert_eq!(err.map(|e| e.op), Some("init"));
    }

    // ── scale / offset ────────────────────────────────────────────────────

    #[test]
    fn nested_scales_compose_and_restore() {
        let mut s = stack();
        s.begin_uniform_scale(2.0).begin_scale(Vec2::new(3.0, 0.5));
        assert_eq!(s.scale(), Vec2::new(6.0, 1.0));
        assert_eq!(s.size_scale(), 1.0);
        s.end_scale();
        assert_eq!(s.scale(), Vec2::splat(2.0));
        s.end_scale();
        assert_eq!(s.transform(), Transform2::IDENTITY);
    }

    #[test]
    fn auto_scale_preserves_aspect() {
        let mut s = stack();
        s.begin_auto_scale();
        assert_eq!(s.scale(), Vec2::splat(2.0));
        s.end_scale();

        let mut s = stack_with((400.0, 600.0), (400.0, 300.0));
        s.begin_auto_scale();
        assert_eq!(s.scale(), Vec2::splat(1.0));
    }

    #[test]
    fn auto_center_offset_uses_current_scale() {
        let mut s = stack_with((800.0, 600.0), (300.0, 200.0));
        s.begin_uniform_scale(2.0).begin_auto_center_offset();
        assert_eq!(s.offset(), Vec2::new(100.0, 100.0));
        s.end_offset().end_scale();
        assert!(s.is_balanced());
    }

    #[test]
    fn auto_center_offset_centers_each_axis_by_its_own_scale() {
        let mut s = stack();
        s.begin_scale(Vec2::new(2.0, 1.0)).begin_auto_center_offset();
        assert_eq!(s.offset(), Vec2::new(0.0, 150.0));
        s.end_offset().end_scale();
        assert!(s.is_balanced());
    }

    #[test]
    fn stretch_then_center_stays_on_device() {
        let mut s = stack_with((800.0, 300.0), (400.0, 300.0));
        s.begin_2d_scene();
        s.begin_stretch_scale().begin_auto_center_offset();
        assert_eq!(s.offset(), Vec2::zero());
        s.draw_quad(Vec3::new(399.0, 299.0, 0.0), Vec2::new(1.0, 1.0));
        s.end_offset().end_scale().end_scene();

        let drawn = s.backend().draws().last().cloned().unwrap();
        let [tl, _, br, _] = drawn.quad.positions();
        assert_eq!((tl.x, tl.y), (798.0, 299.0));
        assert!(br.x <= 800.0 && br.y <= 300.0);
    }

    #[test]
    fn auto_anchor_bottom_left() {
        let mut s = stack_with((1000.0, 600.0), (400.0, 300.0));
        s.wrap_auto_anchor(Anchor::BOTTOM_LEFT, |s| {
            assert_eq!(s.scale(), Vec2::splat(2.0));
            assert_eq!(s.offset(), Vec2::new(0.0, 0.0));
        });
        s.wrap_auto_center(|s| {
            assert_eq!(s.offset(), Vec2::new(100.0, 0.0));
        });
        assert_eq!(s.transform(), Transform2::IDENTITY);
    }

    #[test]
    fn stretch_scale_keeps_quad_aspect() {
        let mut s = stack_with((800.0, 300.0), (400.0, 300.0));
        s.begin_2d_scene();
        s.begin_stretch_scale();
        s.draw_quad(Vec3::new(10.0, 10.0, 0.0), Vec2::new(5.0, 5.0));
        s.end_scale();

        let drawn = s.backend().draws().last().cloned().unwrap();
        let [tl, _, br, _] = drawn.quad.positions();
        assert_eq!((tl.x, tl.y), (20.0, 10.0));
        assert_eq!((br.x, br.y), (25.0, 15.0));
    }

    #[test]
    fn draw_quad_applies_scale_then_offset() {
        let mut s = stack();
        s.begin_2d_scene();
        s.begin_uniform_scale(2.0).begin_offset(10.0, 20.0);
        s.draw_quad(Vec3::new(5.0, 5.0, 1.0), Vec2::new(4.0, 2.0));
        s.end_offset().end_scale().end_scene();

        let drawn = s.backend().draws().last().cloned().unwrap();
        let [tl, tr, br, bl] = drawn.quad.positions();
        assert_eq!(tl, Vec3::new(20.0, 30.0, 1.0));
        assert_eq!(tr, Vec3::new(28.0, 30.0, 1.0));
        assert_eq!(br, Vec3::new(28.0, 34.0, 1.0));
        assert_eq!(bl, Vec3::new(20.0, 34.0, 1.0));
    }

    // ── color / blend / texture ───────────────────────────────────────────

    #[test]
    fn wrap_color_sets_and_restores() {
        let mut s = stack();
        let blue = ColorRgba::new(0.0, 0.0, 1.0, 1.0);
        s.wrap_color(blue, |s| {
            assert_eq!(s.color(), blue);
            assert_eq!(s.backend().color(), blue);
        });
        assert_eq!(s.color(), ColorRgba::WHITE);
        assert_eq!(s.backend().color(), ColorRgba::WHITE);
    }

    #[test]
    fn same_kind_wraps_nest() {
        let mut s = stack();
        s.wrap_color(ColorRgba::RED, |s| {
            s.wrap_color(ColorRgba::GREEN, |s| {
                assert_eq!(s.color(), ColorRgba::GREEN);
            });
            assert_eq!(s.color(), ColorRgba::RED);
        });
        assert_eq!(s.color(), ColorRgba::WHITE);
    }

    #[test]
    fn add_blend_restores_all_four_factors() {
        let mut s = stack();
        let custom = BlendFunc::separate(
            BlendFactor::DstColor,
            BlendFactor::Zero,
            BlendFactor::One,
            BlendFactor::OneMinusDstAlpha,
        );
        s.begin_blend(custom);
        s.wrap_add_blend(|s| assert_eq!(s.blend(), BlendFunc::ADDITIVE));
        assert_eq!(s.blend(), custom);
        s.end_blend();
        assert_eq!(s.blend(), BlendFunc::ALPHA);
    }

    #[test]
    fn texture_binding_nests() {
        let mut s = stack();
        let a = s.backend_mut().create_texture(Size2::new(1, 1), &[0; 4]).unwrap();
        let b = s.backend_mut().create_texture(Size2::new(1, 1), &[0; 4]).unwrap();
        s.wrap_texture_id(Some(a), |s| {
            s.wrap_texture_id(Some(b), |s| assert_eq!(s.backend().texture(), Some(b)));
            assert_eq!(s.backend().texture(), Some(a));
        });
        assert_eq!(s.texture(), None);
        assert!(s.backend_mut().take_error().is_none());
    }

    #[test]
    fn wrap_releases_when_callback_panics() {
        let mut s = stack();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            s.wrap_color(ColorRgba::RED, |_| panic!("callback failed"));
        }));
        assert!(result.is_err());
        assert_eq!(s.color(), ColorRgba::WHITE);
        assert!(s.is_balanced());
    }

    // ── model matrix ──────────────────────────────────────────────────────

    #[test]
    fn wrap_rotate_pivots_on_scaled_pos() {
        let mut s = stack();
        s.begin_2d_scene();
        s.backend_mut().take_commands();
        s.begin_uniform_scale(2.0);
        s.wrap_rotate(Vec3::new(10.0, 5.0, 0.0), 90.0, |s| {
            assert_eq!(s.backend().transform_depth(), 1);
        });
        s.end_scale();

        let pivot = Vec3::new(20.0, 10.0, 0.0);
        assert_eq!(
            s.backend().commands(),
            &[
                BackendCmd::PushTransform,
                BackendCmd::Translate(pivot),
                BackendCmd::Rotate { angle_deg: 90.0, axis: Vec3::Z },
                BackendCmd::Translate(-pivot),
                BackendCmd::UpdateTransform,
                BackendCmd::PopTransform,
            ]
        );
        assert!(s.is_balanced());
    }

    #[test]
    fn reduced_backend_ignores_transforms() {
        let mut s = RenderStack::new(RecordingBackend::reduced(), RendererConfig::default()).unwrap();
        s.begin_3d_scene();
        s.backend_mut().take_commands();
        s.wrap_rotate(Vec3::zero(), 45.0, |s| {
            s.draw_quad(Vec3::zero(), Vec2::splat(1.0));
        });
        assert!(s.is_balanced());
        assert!(s.backend().commands().iter().all(|c| matches!(c, BackendCmd::Draw(_))));
        assert!(s.backend_mut().take_error().is_none());
    }

    // ── quad buffers ──────────────────────────────────────────────────────

    #[test]
    fn quad_buffer_replays_compiled_record() {
        let mut s = stack();
        let tex = s.backend_mut().create_texture(Size2::new(1, 1), &[0; 4]).unwrap();
        let h = s.gen_quad_buffers(2).unwrap();
        s.compile_quad_buffer(h, 1, record(Some(tex))).unwrap();
        s.compile_quad_buffer(h, 0, record(None)).unwrap();

        s.begin_3d_scene();
        s.draw_quad_buffer(h, 1).unwrap();
        s.draw_quad_buffer(h, 0).unwrap();
        s.end_scene();

        let draws: Vec<_> = s.backend().draws().cloned().collect();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].texture, Some(tex));
        assert_eq!(draws[0].quad.positions(), record(None).vertices);
        assert_eq!(draws[0].quad.normal, Some(Vec3::new(0.0, 0.0, -1.0)));
        assert_eq!(draws[1].texture, None);
        assert_eq!(s.texture(), None);
    }

    #[test]
    fn quad_buffer_errors_are_reported() {
        let mut s = stack();
        let h = s.gen_quad_buffers(1).unwrap();
        s.begin_3d_scene();
        assert_eq!(s.draw_quad_buffer(h, 0), Err(QuadBufferError::NotCompiled { handle: h, index: 0 }));
        assert!(matches!(s.draw_quad_buffer(h, 1), Err(QuadBufferError::IndexOutOfRange { .. })));
        s.end_scene();
        assert_eq!(s.backend().draws().count(), 0);

        let empty = s.gen_quad_buffers(0).unwrap();
        assert_eq!(s.delete_quad_buffers(empty, 0), Ok(()));
    }

    // ── fonts ─────────────────────────────────────────────────────────────

    fn font(s: &mut RenderStack<RecordingBackend>) -> FontAtlas {
        let image = ImageRgba::solid(Size2::new(40, 20), ColorRgba::WHITE);
        let texture = Texture::upload(s.backend_mut(), &image).unwrap();
        FontAtlas::builder(texture)
            .cell_size(10, 10)
            .spacing(2, 4)
            .index_to_rune_lines(&["abcd", "é?{}"])
            .default_rune('?')
            .build()
    }

    #[test]
    fn print_advances_per_code_point() {
        let mut s = stack();
        let font = font(&mut s);
        s.begin_2d_scene();
        s.wrap_font_atlas(&font, Vec3::new(0.0, 0.0, 0.0), |w| {
            w.print_str("aé\nb");
            assert_eq!(w.pos(), Vec3::new(12.0, 14.0, 0.0));
        });
        s.end_scene();
        assert_eq!(s.backend().draws().count(), 3);
        assert_eq!(s.texture(), None);
    }

    #[test]
    fn print_fmt_substitutes_args_and_colors_runs() {
        let mut s = stack();
        let font = font(&mut s);
        s.begin_2d_scene();
        s.wrap_font_atlas(&font, Vec3::zero(), |w| {
            w.print_fmt("{red a{} }b{{{}", &["c"]);
        });
        s.end_scene();

        let colors: Vec<_> = s.backend().draws().map(|d| d.color).collect();
        // a, c (red) then b, '{', then the literal "{}" once args run out.
        assert_eq!(
            colors,
            vec![
                ColorRgba::RED,
                ColorRgba::RED,
                ColorRgba::WHITE,
                ColorRgba::WHITE,
                ColorRgba::WHITE,
                ColorRgba::WHITE,
            ]
        );
        assert_eq!(s.color(), ColorRgba::WHITE);
    }

    #[test]
    fn print_fmt_closes_unclosed_runs() {
        let mut s = stack();
        let font = font(&mut s);
        s.begin_2d_scene();
        s.wrap_font_atlas(&font, Vec3::zero(), |w| {
            w.print_fmt("{0x00ff00 a{blue b", &[]);
            assert_eq!(w.stack().color(), ColorRgba::WHITE);
        });
        s.end_scene();

        let colors: Vec<_> = s.backend().draws().map(|d| d.color).collect();
        assert_eq!(colors, vec![ColorRgba::GREEN, ColorRgba::BLUE]);
    }

    #[test]
    fn draw_bg_fills_padded_block_untextured() {
        let mut s = stack();
        let font = font(&mut s);
        s.begin_2d_scene();
        s.wrap_font_atlas(&font, Vec3::new(50.0, 50.0, 0.0), |w| {
            w.set_bg_padding(Vec2::new(3.0, 3.0));
            assert_eq!(w.pos(), Vec3::new(53.0, 53.0, 0.0));
            assert_eq!(w.calc_total_size((3, 2)), Vec2::new(40.0, 30.0));
            w.draw_bg(ColorRgba::BLACK, (3, 2));
        });
        s.end_scene();

        let bg = s.backend().draws().next().cloned().unwrap();
        assert_eq!(bg.texture, None);
        assert_eq!(bg.color, ColorRgba::BLACK);
        assert_eq!(bg.quad.positions()[0], Vec3::new(50.0, 50.0, 0.0));
        assert_eq!(bg.quad.positions()[2], Vec3::new(90.0, 80.0, 0.0));
    }

    // ── protocol violations ───────────────────────────────────────────────

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "end_color without begin_color")]
    fn unbalanced_end_panics_in_debug() {
        stack().end_color();
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "draw outside a scene")]
    fn draw_without_scene_panics_in_debug() {
        stack().draw_quad(Vec3::zero(), Vec2::splat(1.0));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "scene ended with unbalanced render state")]
    fn scene_end_with_open_scale_panics_in_debug() {
        let mut s = stack();
        s.begin_2d_scene().begin_uniform_scale(2.0).end_scene();
    }

    // ── properties ────────────────────────────────────────────────────────

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn begin_end_round_trips_exactly(
                factors in prop::collection::vec((0.01f32..100.0, 0.01f32..100.0), 0..8),
                offsets in prop::collection::vec((-500.0f32..500.0, -500.0f32..500.0), 0..8),
            ) {
                let mut s = stack();
                let before = s.transform();

                for (x, y) in &factors {
                    s.begin_scale(Vec2::new(*x, *y));
                }
                for (x, y) in &offsets {
                    s.begin_offset(*x, *y);
                }
                for _ in &offsets {
                    s.end_offset();
                }
                for _ in &factors {
                    s.end_scale();
                }

                prop_assert_eq!(s.transform(), before);
                prop_assert!(s.is_balanced());
            }

            #[test]
            fn mixed_axes_restore_in_reverse_order(
                ops in prop::collection::vec(axis_op(), 0..16),
            ) {
                let mut s = stack();
                let textures = [
                    s.backend_mut().create_texture(Size2::new(1, 1), &[0; 4]).unwrap(),
                    s.backend_mut().create_texture(Size2::new(1, 1), &[0; 4]).unwrap(),
                ];

                let mut saved = Vec::new();
                for op in &ops {
                    saved.push(snapshot(&s));
                    match *op {
                        AxisOp::Scale(x, y) => { s.begin_scale(Vec2::new(x, y)); }
                        AxisOp::Offset(x, y) => { s.begin_offset(x, y); }
                        AxisOp::Center => { s.begin_auto_center_offset(); }
                        AxisOp::Color(color) => { s.begin_color(color); }
                        AxisOp::Blend(additive) => {
                            s.begin_blend(if additive { BlendFunc::ADDITIVE } else { BlendFunc::ALPHA });
                        }
                        AxisOp::Texture(slot) => { s.begin_texture_id(slot.map(|i| textures[i])); }
                    }
                }

                for op in ops.iter().rev() {
                    match op {
                        AxisOp::Scale(..) => { s.end_scale(); }
                        AxisOp::Offset(..) | AxisOp::Center => { s.end_offset(); }
                        AxisOp::Color(_) => { s.end_color(); }
                        AxisOp::Blend(_) => { s.end_blend(); }
                        AxisOp::Texture(_) => { s.end_texture(); }
                    }
                    let expected = saved.pop().unwrap();
                    prop_assert_eq!(snapshot(&s), expected);
                }

                prop_assert!(s.is_balanced());
                prop_assert_eq!(s.color(), ColorRgba::WHITE);
                prop_assert_eq!(s.blend(), BlendFunc::ALPHA);
                prop_assert_eq!(s.texture(), None);
                prop_assert_eq!(s.transform(), Transform2::IDENTITY);
            }
        }

        #[derive(Debug, Clone)]
        enum AxisOp {
            Scale(f32, f32),
            Offset(f32, f32),
            Center,
            Color(ColorRgba),
            Blend(bool),
            Texture(Option<usize>),
        }

        fn axis_op() -> impl Strategy<Value = AxisOp> {
            prop_oneof![
                (0.1f32..10.0, 0.1f32..10.0).prop_map(|(x, y)| AxisOp::Scale(x, y)),
                (-100.0f32..100.0, -100.0f32..100.0).prop_map(|(x, y)| AxisOp::Offset(x, y)),
                Just(AxisOp::Center),
                (0.0f32..1.0, 0.0f32..1.0, 0.0f32..1.0, 0.0f32..1.0)
                    .prop_map(|(r, g, b, a)| AxisOp::Color(ColorRgba::new(r, g, b, a))),
                any::<bool>().prop_map(AxisOp::Blend),
                prop::option::of(0usize..2).prop_map(AxisOp::Texture),
            ]
        }

        fn snapshot(
            s: &RenderStack<RecordingBackend>,
        ) -> (ColorRgba, BlendFunc, Option<TextureId>, Transform2) {
            (s.color(), s.blend(), s.texture(), s.transform())
        }
    }
}
