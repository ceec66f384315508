use super::Vec2;

/// Integer pixel dimensions of an image or texture.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Size2 {
    pub w: u32,
    pub h: u32,
}

impl Size2 {
    #[inline]
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Number of pixels (`w * h`).
    #[inline]
    pub fn area(self) -> usize {
        self.w as usize * self.h as usize
    }

    #[inline]
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.w as f32, self.h as f32)
    }
}
