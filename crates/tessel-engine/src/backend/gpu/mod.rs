//! wgpu implementation of the full backend variant.
//!
//! Convention:
//! - the render stack hands over device-space positions (or world positions in 3D scenes)
//! - the backend applies projection * model on the CPU and submits clip-space vertices
//! - one render pass per [`WgpuBackend::flush`]

mod ctx;
mod pipeline;
mod wgpu_backend;

pub use ctx::{RenderCtx, RenderTarget};
pub use wgpu_backend::WgpuBackend;
