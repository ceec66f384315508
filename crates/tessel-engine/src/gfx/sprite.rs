use crate::coords::{Size2, UvRect};

use super::Texture;

/// A rectangular region of a texture.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sprite {
    texture: Texture,
    size: Size2,
    src: UvRect,
}

impl Sprite {
    /// The whole texture.
    pub fn new(texture: Texture) -> Self {
        Self::region(texture, (0, 0), Size2::new(0, 0), 0)
    }

    /// A region starting at `offset` (pixels). A zero `size` component means
    /// the rest of the texture along that axis, minus padding on both sides.
    pub fn region(texture: Texture, offset: (u32, u32), size: Size2, padding: u32) -> Self {
        let p2 = padding * 2;
        let size = Size2::new(
            if size.w > 0 { size.w } else { texture.size.w.saturating_sub(p2 + offset.0) },
            if size.h > 0 { size.h } else { texture.size.h.saturating_sub(p2 + offset.1) },
        );
        let src = Self::build_src(texture.size, offset, size, padding);
        Self { texture, size, src }
    }

    /// Normalized UVs of a pixel region. An axis with zero texture extent maps to 0.
    pub fn build_src(tex_size: Size2, offset: (u32, u32), size: Size2, padding: u32) -> UvRect {
        let axis = |tex: u32, off: u32, len: u32| -> (f32, f32) {
            if tex == 0 {
                return (0.0, 0.0);
            }
            let tex = tex as f32;
            let start = (off + padding) as f32;
            (start / tex, (start + len as f32) / tex)
        };
        let (u1, u2) = axis(tex_size.w, offset.0, size.w);
        let (v1, v2) = axis(tex_size.h, offset.1, size.h);
        UvRect::new(u1, v1, u2, v2)
    }

    #[inline]
    pub fn texture(&self) -> Texture {
        self.texture
    }

    #[inline]
    pub fn size(&self) -> Size2 {
        self.size
    }

    #[inline]
    pub fn src(&self) -> UvRect {
        self.src
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TextureId;

    fn tex(w: u32, h: u32) -> Texture {
        Texture {
            id: TextureId::new(1).unwrap(),
            size: Size2::new(w, h),
        }
    }

    #[test]
    fn whole_texture_is_full_uv() {
        let s = Sprite::new(tex(64, 32));
        assert_eq!(s.size(), Size2::new(64, 32));
        assert_eq!(s.src(), UvRect::FULL);
    }

    #[test]
    fn region_with_padding() {
        let s = Sprite::region(tex(100, 50), (10, 0), Size2::new(0, 20), 5);
        // Width: 100 - 10 - 2*5.
        assert_eq!(s.size(), Size2::new(80, 20));
        assert_eq!(s.src(), UvRect::new(0.15, 0.1, 0.95, 0.5));
    }

    #[test]
    fn zero_texture_axis_yields_zero_uv() {
        let src = Sprite::build_src(Size2::new(0, 10), (0, 0), Size2::new(4, 5), 0);
        assert_eq!(src, UvRect::new(0.0, 0.0, 0.0, 0.5));
    }
}
