use std::collections::BTreeSet;

use crate::coords::{ColorRgba, Size2, Vec3};

use super::{
    validate_pixels, BackendError, BackendVariant, BlendFunc, GfxBackend, Projection,
    QuadPrimitive, TextureId,
};

/// A quad together with the backend state it was drawn under.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnQuad {
    pub quad: QuadPrimitive,
    pub color: ColorRgba,
    pub texture: Option<TextureId>,
    pub blend: BlendFunc,
    /// Depth of the model transform stack at draw time.
    pub transform_depth: usize,
}

/// One effective backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCmd {
    Viewport { width: u32, height: u32 },
    Projection(Projection),
    Color(ColorRgba),
    BindTexture(Option<TextureId>),
    Blend(BlendFunc),
    ClearColor(ColorRgba),
    Clear,
    Draw(DrawnQuad),
    CreateTexture { id: TextureId, size: Size2 },
    DestroyTexture(TextureId),
    LoadIdentity,
    PushTransform,
    PopTransform,
    Translate(Vec3),
    Rotate { angle_deg: f32, axis: Vec3 },
    UpdateTransform,
}

/// Headless backend that tracks backend state and logs every call.
///
/// Used for tests and for running without a window. The reduced variant drops
/// transform stack calls, the same way an ES-style backend would.
#[derive(Debug)]
pub struct RecordingBackend {
    variant: BackendVariant,
    log: Vec<BackendCmd>,

    color: ColorRgba,
    texture: Option<TextureId>,
    blend: BlendFunc,
    clear_color: ColorRgba,
    projection: Option<Projection>,
    transform_depth: usize,

    textures: BTreeSet<TextureId>,
    next_texture: u32,

    error: Option<BackendError>,
    injected: Option<BackendError>,
}

impl RecordingBackend {
    pub fn new(variant: BackendVariant) -> Self {
        Self {
            variant,
            log: Vec::new(),
            color: ColorRgba::white(),
            texture: None,
            blend: BlendFunc::ALPHA,
            clear_color: ColorRgba::black(),
            projection: None,
            transform_depth: 0,
            textures: BTreeSet::new(),
            next_texture: 1,
            error: None,
            injected: None,
        }
    }

    pub fn full() -> Self {
        Self::new(BackendVariant::Full)
    }

    pub fn reduced() -> Self {
        Self::new(BackendVariant::Reduced)
    }

    /// Makes the next [`GfxBackend::take_error`] report `error`, as if the
    /// previous call had failed inside the driver.
    pub fn inject_error(&mut self, op: &'static str, message: impl Into<String>) {
        self.injected = Some(BackendError::new(op, message));
    }

    pub fn commands(&self) -> &[BackendCmd] {
        &self.log
    }

    /// Drains the command log, keeping the tracked state.
    pub fn take_commands(&mut self) -> Vec<BackendCmd> {
        std::mem::take(&mut self.log)
    }

    pub fn draws(&self) -> impl Iterator<Item = &DrawnQuad> {
        self.log.iter().filter_map(|cmd| match cmd {
            BackendCmd::Draw(d) => Some(d),
            _ => None,
        })
    }

    pub fn color(&self) -> ColorRgba {
        self.color
    }

    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    pub fn clear_color(&self) -> ColorRgba {
        self.clear_color
    }

    pub fn projection(&self) -> Option<Projection> {
        self.projection
    }

    pub fn transform_depth(&self) -> usize {
        self.transform_depth
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    fn record_error(&mut self, err: BackendError) {
        log::trace!("recording backend: {err}");
        self.error.get_or_insert(err);
    }

    fn transform_op(&mut self, cmd: BackendCmd) -> bool {
        if self.variant == BackendVariant::Reduced {
            log::trace!("reduced backend: dropping {cmd:?}");
            return false;
        }
        self.log.push(cmd);
        true
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::full()
    }
}

impl GfxBackend for RecordingBackend {
    fn variant(&self) -> BackendVariant {
        self.variant
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.log.push(BackendCmd::Viewport { width, height });
    }

    fn set_projection(&mut self, projection: Projection) {
        self.projection = Some(projection);
        self.log.push(BackendCmd::Projection(projection));
    }

    fn set_color(&mut self, color: ColorRgba) {
        self.color = color;
        self.log.push(BackendCmd::Color(color));
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) {
        if let Some(id) = texture {
            if !self.textures.contains(&id) {
                self.record_error(BackendError::new(
                    "bind_texture",
                    format!("texture {} does not exist", id.get()),
                ));
            }
        }
        self.texture = texture;
        self.log.push(BackendCmd::BindTexture(texture));
    }

    fn set_blend_func(&mut self, func: BlendFunc) {
        self.blend = func;
        self.log.push(BackendCmd::Blend(func));
    }

    fn blend_func(&self) -> BlendFunc {
        self.blend
    }

    fn set_clear_color(&mut self, color: ColorRgba) {
        self.clear_color = color;
        self.log.push(BackendCmd::ClearColor(color));
    }

    fn clear(&mut self) {
        self.log.push(BackendCmd::Clear);
    }

    fn draw_quad(&mut self, quad: &QuadPrimitive) {
        self.log.push(BackendCmd::Draw(DrawnQuad {
            quad: *quad,
            color: self.color,
            texture: self.texture,
            blend: self.blend,
            transform_depth: self.transform_depth,
        }));
    }

    fn create_texture(&mut self, size: Size2, rgba: &[u8]) -> Result<TextureId, BackendError> {
        validate_pixels(size, rgba)?;

        let id = TextureId::new(self.next_texture)
            .ok_or_else(|| BackendError::new("create_texture", "texture ids exhausted"))?;
        self.next_texture = self.next_texture.wrapping_add(1);
        self.textures.insert(id);
        self.log.push(BackendCmd::CreateTexture { id, size });
        Ok(id)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        if !self.textures.remove(&texture) {
            self.record_error(BackendError::new(
                "destroy_texture",
                format!("texture {} does not exist", texture.get()),
            ));
        }
        if self.texture == Some(texture) {
            self.texture = None;
        }
        self.log.push(BackendCmd::DestroyTexture(texture));
    }

    fn take_error(&mut self) -> Option<BackendError> {
        self.injected.take().or_else(|| self.error.take())
    }

    fn load_identity(&mut self) {
        self.transform_op(BackendCmd::LoadIdentity);
    }

    fn push_transform(&mut self) {
        if self.transform_op(BackendCmd::PushTransform) {
            self.transform_depth += 1;
        }
    }

    fn pop_transform(&mut self) {
        if !self.transform_op(BackendCmd::PopTransform) {
            return;
        }
        match self.transform_depth.checked_sub(1) {
            Some(depth) => self.transform_depth = depth,
            None => self.record_error(BackendError::new("pop_transform", "stack underflow")),
        }
    }

    fn translate(&mut self, by: Vec3) {
        self.transform_op(BackendCmd::Translate(by));
    }

    fn rotate(&mut self, angle_deg: f32, axis: Vec3) {
        self.transform_op(BackendCmd::Rotate { angle_deg, axis });
    }

    fn update_transform(&mut self) {
        self.transform_op(BackendCmd::UpdateTransform);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── state tracking ────────────────────────────────────────────────────

    #[test]
    fn draw_captures_current_state() {
        let mut b = RecordingBackend::full();
        b.set_color(ColorRgba::RED);
        b.set_blend_func(BlendFunc::ADDITIVE);
        b.draw_quad(&QuadPrimitive::from_corners([Vec3::zero(); 4], None));

        let d = b.draws().next().unwrap();
        assert_eq!(d.color, ColorRgba::RED);
        assert_eq!(d.blend, BlendFunc::ADDITIVE);
        assert_eq!(d.texture, None);
    }

    #[test]
    fn textures_get_distinct_ids() {
        let mut b = RecordingBackend::full();
        let a = b.create_texture(Size2::new(1, 1), &[0; 4]).unwrap();
        let c = b.create_texture(Size2::new(2, 1), &[0; 8]).unwrap();
        assert_ne!(a, c);
        assert_eq!(b.live_textures(), 2);

        b.destroy_texture(a);
        assert_eq!(b.live_textures(), 1);
        assert!(b.take_error().is_none());
    }

    #[test]
    fn bad_pixel_data_is_rejected() {
        let mut b = RecordingBackend::full();
        let err = b.create_texture(Size2::new(2, 2), &[0; 4]).unwrap_err();
        assert_eq!(err.op, "create_texture");
        assert!(b.create_texture(Size2::new(0, 2), &[]).is_err());
    }

    // ── errors ────────────────────────────────────────────────────────────

    #[test]
    fn unknown_texture_bind_is_reported_once() {
        let mut b = RecordingBackend::full();
        b.bind_texture(TextureId::new(42));
        assert_eq!(b.take_error().map(|e| e.op), Some("bind_texture"));
        assert!(b.take_error().is_none());
    }

    #[test]
    fn injected_error_wins() {
        let mut b = RecordingBackend::full();
        b.inject_error("init", "context lost");
        let err = b.take_error().unwrap();
        assert_eq!(err.to_string(), "backend error in init: context lost");
    }

    // ── variants ──────────────────────────────────────────────────────────

    #[test]
    fn full_variant_tracks_transform_depth() {
        let mut b = RecordingBackend::full();
        b.push_transform();
        b.push_transform();
        assert_eq!(b.transform_depth(), 2);
        b.pop_transform();
        assert_eq!(b.transform_depth(), 1);
    }

    #[test]
    fn full_variant_reports_underflow() {
        let mut b = RecordingBackend::full();
        b.pop_transform();
        assert_eq!(b.take_error().map(|e| e.op), Some("pop_transform"));
    }

    #[test]
    fn reduced_variant_drops_transform_ops() {
        let mut b = RecordingBackend::reduced();
        b.push_transform();
        b.translate(Vec3::X);
        b.rotate(90.0, Vec3::Z);
        b.update_transform();
        b.pop_transform();
        b.pop_transform();

        assert!(b.commands().is_empty());
        assert_eq!(b.transform_depth(), 0);
        assert!(b.take_error().is_none());
    }

    #[test]
    fn boxed_backend_forwards() {
        let mut b: Box<dyn GfxBackend> = Box::new(RecordingBackend::reduced());
        assert_eq!(b.variant(), BackendVariant::Reduced);
        b.set_blend_func(BlendFunc::ADDITIVE);
        assert_eq!(b.blend_func(), BlendFunc::ADDITIVE);
    }
}
