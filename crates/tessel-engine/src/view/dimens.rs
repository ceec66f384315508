use crate::coords::Vec2;

/// Normalized anchor inside the device area, `(0, 0)` top-left to `(1, 1)` bottom-right.
pub struct Anchor;

impl Anchor {
    pub const CENTER: Vec2 = Vec2::new(0.5, 0.5);
    pub const TOP_LEFT: Vec2 = Vec2::new(0.0, 0.0);
    pub const TOP_RIGHT: Vec2 = Vec2::new(1.0, 0.0);
    pub const BOTTOM_LEFT: Vec2 = Vec2::new(0.0, 1.0);
    pub const BOTTOM_RIGHT: Vec2 = Vec2::new(1.0, 1.0);
}

/// Device size vs. target size and the scales derived from them.
///
/// Immutable per resize event; [`ViewDimens::resized`] produces the next value.
/// Every size component is clamped to at least 1 so no scale ever divides by zero.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewDimens {
    device_size: Vec2,
    target_size: Vec2,
    init_size: Vec2,
    scale: Vec2,
    aspect_scale: f32,
}

impl ViewDimens {
    pub fn new(device_size: Vec2, target_size: Vec2) -> Self {
        let device_size = device_size.at_least(1.0);
        let target_size = target_size.at_least(1.0);

        let mut dimens = Self {
            device_size,
            target_size,
            init_size: device_size,
            scale: Vec2::splat(1.0),
            aspect_scale: 1.0,
        };
        dimens.recompute();
        dimens
    }

    /// Returns the dimensions for a new device size. Target and initial sizes carry over.
    #[must_use]
    pub fn resized(self, device_size: Vec2) -> Self {
        let mut dimens = Self {
            device_size: device_size.at_least(1.0),
            ..self
        };
        dimens.recompute();
        dimens
    }

    fn recompute(&mut self) {
        self.scale = Vec2::new(
            self.device_size.x / self.target_size.x,
            self.device_size.y / self.target_size.y,
        );
        self.aspect_scale = self.scale.min_element();
    }

    #[inline]
    pub fn device_size(&self) -> Vec2 {
        self.device_size
    }

    #[inline]
    pub fn target_size(&self) -> Vec2 {
        self.target_size
    }

    /// Device size at construction time.
    #[inline]
    pub fn init_size(&self) -> Vec2 {
        self.init_size
    }

    /// Per-axis `device / target`.
    #[inline]
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// `min(scale.x, scale.y)`: the largest uniform scale that fits without cropping.
    #[inline]
    pub fn aspect_scale(&self) -> f32 {
        self.aspect_scale
    }

    /// Scale factor used by auto scaling. Preserves the aspect ratio.
    #[inline]
    pub fn auto_scale(&self) -> f32 {
        self.aspect_scale
    }

    /// Offset that places the target area, scaled per axis by `scale`, at
    /// `anchor` inside the device area: `(device - target * scale) * anchor`.
    pub fn anchor_offset(&self, scale: Vec2, anchor: Vec2) -> Vec2 {
        (self.device_size - self.target_size.mul_vec(scale)).mul_vec(anchor)
    }

    /// [`anchor_offset`](Self::anchor_offset) at [`Anchor::CENTER`].
    pub fn center_offset(&self, scale: Vec2) -> Vec2 {
        self.anchor_offset(scale, Anchor::CENTER)
    }

    /// Width over height of the device area.
    #[inline]
    pub fn device_aspect(&self) -> f32 {
        self.device_size.x / self.device_size.y
    }
}
