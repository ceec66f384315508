use crate::coords::{ColorRgba, Size2, Vec3};

use super::{BackendError, BackendVariant, BlendFunc, Projection, QuadPrimitive, TextureId};

/// Minimal capability set the render stack drives.
///
/// A backend is a single global state machine: color, blend function, bound
/// texture and (for the full variant) a model transform stack. Only
/// [`crate::render::RenderStack`] is expected to mutate that state.
///
/// The transform stack operations have no-op default bodies; the reduced
/// variant keeps them that way.
pub trait GfxBackend {
    fn variant(&self) -> BackendVariant;

    /// Device-pixel drawable area.
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Replaces the projection. Also resets the model transform to identity.
    fn set_projection(&mut self, projection: Projection);

    /// Tint applied to subsequent draws.
    fn set_color(&mut self, color: ColorRgba);

    /// `None` draws flat, untextured quads.
    fn bind_texture(&mut self, texture: Option<TextureId>);

    fn set_blend_func(&mut self, func: BlendFunc);

    fn blend_func(&self) -> BlendFunc;

    fn set_clear_color(&mut self, color: ColorRgba);

    /// Clears color and depth.
    fn clear(&mut self);

    fn draw_quad(&mut self, quad: &QuadPrimitive);

    /// Uploads tightly packed RGBA8 pixels.
    fn create_texture(&mut self, size: Size2, rgba: &[u8]) -> Result<TextureId, BackendError>;

    fn destroy_texture(&mut self, texture: TextureId);

    /// Returns and clears the last recorded error, if any.
    fn take_error(&mut self) -> Option<BackendError>;

    // ── fixed-function transform stack ────────────────────────────────────

    fn load_identity(&mut self) {}

    fn push_transform(&mut self) {}

    fn pop_transform(&mut self) {}

    fn translate(&mut self, by: Vec3) {
        let _ = by;
    }

    /// Rotation of `angle_deg` degrees about `axis`.
    fn rotate(&mut self, angle_deg: f32, axis: Vec3) {
        let _ = (angle_deg, axis);
    }

    /// Makes transform changes visible to subsequent draws.
    fn update_transform(&mut self) {}
}

impl<B: GfxBackend + ?Sized> GfxBackend for Box<B> {
    fn variant(&self) -> BackendVariant {
        (**self).variant()
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        (**self).set_viewport(width, height)
    }

    fn set_projection(&mut self, projection: Projection) {
        (**self).set_projection(projection)
    }

    fn set_color(&mut self, color: ColorRgba) {
        (**self).set_color(color)
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) {
        (**self).bind_texture(texture)
    }

    fn set_blend_func(&mut self, func: BlendFunc) {
        (**self).set_blend_func(func)
    }

    fn blend_func(&self) -> BlendFunc {
        (**self).blend_func()
    }

    fn set_clear_color(&mut self, color: ColorRgba) {
        (**self).set_clear_color(color)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn draw_quad(&mut self, quad: &QuadPrimitive) {
        (**self).draw_quad(quad)
    }

    fn create_texture(&mut self, size: Size2, rgba: &[u8]) -> Result<TextureId, BackendError> {
        (**self).create_texture(size, rgba)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        (**self).destroy_texture(texture)
    }

    fn take_error(&mut self) -> Option<BackendError> {
        (**self).take_error()
    }

    fn load_identity(&mut self) {
        (**self).load_identity()
    }

    fn push_transform(&mut self) {
        (**self).push_transform()
    }

    fn pop_transform(&mut self) {
        (**self).pop_transform()
    }

    fn translate(&mut self, by: Vec3) {
        (**self).translate(by)
    }

    fn rotate(&mut self, angle_deg: f32, axis: Vec3) {
        (**self).rotate(angle_deg, axis)
    }

    fn update_transform(&mut self) {
        (**self).update_transform()
    }
}

/// Checks that pixel data matches `size`. Shared by backend implementations.
pub(crate) fn validate_pixels(size: Size2, rgba: &[u8]) -> Result<(), BackendError> {
    if size.is_empty() {
        return Err(BackendError::new(
            "create_texture",
            format!("texture size {}x{} is empty", size.w, size.h),
        ));
    }
    let expected = size.area() * 4;
    if rgba.len() != expected {
        return Err(BackendError::new(
            "create_texture",
            format!("expected {expected} bytes of RGBA8 data, got {}", rgba.len()),
        ));
    }
    Ok(())
}
