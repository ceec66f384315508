//! Coordinate and geometry types shared by the transform engine, the render
//! stack and the backends.
//!
//! Canonical 2D space:
//! - Target-space pixels (the logical resolution content is authored against)
//! - Origin top-left
//! - +X right, +Y down
//!
//! 3D scenes use the same types with `z` as world depth.

mod color;
mod size;
mod uv;
mod vec2;
mod vec3;
mod viewport;

pub use color::ColorRgba;
pub use size::Size2;
pub use uv::UvRect;
pub use vec2::Vec2;
pub use vec3::Vec3;
pub use viewport::Viewport;
