use crate::coords::{ColorRgba, Vec2};

/// Start-up parameters for [`super::RenderStack`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RendererConfig {
    /// Output surface size in device pixels.
    pub device_size: Vec2,
    /// Logical resolution draw calls are authored against.
    pub target_size: Vec2,
    pub clear_color: ColorRgba,
}

impl RendererConfig {
    #[inline]
    pub const fn new(device_size: Vec2, target_size: Vec2) -> Self {
        Self {
            device_size,
            target_size,
            clear_color: ColorRgba::BLACK,
        }
    }

    pub fn with_clear_color(mut self, color: ColorRgba) -> Self {
        self.clear_color = color;
        self
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::new(Vec2::new(1600.0, 900.0), Vec2::new(1600.0, 900.0))
    }
}
