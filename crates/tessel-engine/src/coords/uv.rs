/// Normalized texture sub-rectangle: `(u1, v1)` top-left, `(u2, v2)` bottom-right.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UvRect {
    pub u1: f32,
    pub v1: f32,
    pub u2: f32,
    pub v2: f32,
}

impl UvRect {
    /// The whole texture.
    pub const FULL: UvRect = UvRect::new(0.0, 0.0, 1.0, 1.0);

    #[inline]
    pub const fn new(u1: f32, v1: f32, u2: f32, v2: f32) -> Self {
        Self { u1, v1, u2, v2 }
    }

    /// UVs for the four quad corners in winding order
    /// (top-left, top-right, bottom-right, bottom-left).
    #[inline]
    pub fn corners(self) -> [[f32; 2]; 4] {
        [
            [self.u1, self.v1],
            [self.u2, self.v1],
            [self.u2, self.v2],
            [self.u1, self.v2],
        ]
    }
}

impl Default for UvRect {
    fn default() -> Self {
        Self::FULL
    }
}
