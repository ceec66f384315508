use std::num::NonZeroU32;

use crate::coords::{UvRect, Vec2, Vec3};
use crate::view::DestQuad;

/// Which capability set a backend offers. Chosen once at start-up.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BackendVariant {
    /// Every operation, including the fixed-function transform stack.
    Full,
    /// ES-style subset: transform stack operations are no-ops.
    Reduced,
}

/// Opaque handle to a texture owned by a backend.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TextureId(NonZeroU32);

impl TextureId {
    /// Returns `None` for the reserved value 0 ("no texture").
    #[inline]
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Projection selected by a scene begin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Projection {
    /// Orthographic over the device area: x `0..width`, y `height..0`, z `-5..5`.
    Ortho2d { width: f32, height: f32 },
    /// Perspective with a 45° vertical field of view, aspect `width / height`,
    /// near plane 0.01 and far plane 5.0.
    Perspective3d { width: f32, height: f32 },
}

impl Projection {
    pub const ORTHO_NEAR: f32 = -5.0;
    pub const ORTHO_FAR: f32 = 5.0;
    pub const FOV_Y_DEG: f32 = 45.0;
    pub const PERSPECTIVE_NEAR: f32 = 0.01;
    pub const PERSPECTIVE_FAR: f32 = 5.0;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
    OneMinusDstColor,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Separate blend function, the four parameters the backend keeps as global state.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BlendFunc {
    pub src_rgb: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_rgb: BlendFactor,
    pub dst_alpha: BlendFactor,
}

impl BlendFunc {
    /// Standard "over" blending. Backends start in this state.
    pub const ALPHA: BlendFunc = BlendFunc::uniform(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);

    /// Additive blending (`One`, `One`).
    pub const ADDITIVE: BlendFunc = BlendFunc::uniform(BlendFactor::One, BlendFactor::One);

    /// Same factors for color and alpha.
    #[inline]
    pub const fn uniform(src: BlendFactor, dst: BlendFactor) -> Self {
        Self {
            src_rgb: src,
            src_alpha: src,
            dst_rgb: dst,
            dst_alpha: dst,
        }
    }

    #[inline]
    pub const fn separate(
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) -> Self {
        Self {
            src_rgb,
            src_alpha,
            dst_rgb,
            dst_alpha,
        }
    }
}

impl Default for BlendFunc {
    fn default() -> Self {
        Self::ALPHA
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QuadVertex {
    pub pos: Vec3,
    pub uv: Vec2,
}

/// One four-vertex quad as handed to a backend.
///
/// Vertices are wound top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QuadPrimitive {
    pub vertices: [QuadVertex; 4],
    pub normal: Option<Vec3>,
}

impl QuadPrimitive {
    /// Screen-aligned quad sampling `src`.
    pub fn from_dest(dest: DestQuad, src: UvRect) -> Self {
        Self::with_uvs(dest.corners(), src, None)
    }

    /// Arbitrary quad sampling the whole texture.
    pub fn from_corners(corners: [Vec3; 4], normal: Option<Vec3>) -> Self {
        Self::with_uvs(corners, UvRect::FULL, normal)
    }

    fn with_uvs(corners: [Vec3; 4], src: UvRect, normal: Option<Vec3>) -> Self {
        let uvs = src.corners();
        let vertices = std::array::from_fn(|i| QuadVertex {
            pos: corners[i],
            uv: Vec2::new(uvs[i][0], uvs[i][1]),
        });
        Self { vertices, normal }
    }

    pub fn positions(&self) -> [Vec3; 4] {
        self.vertices.map(|v| v.pos)
    }
}
