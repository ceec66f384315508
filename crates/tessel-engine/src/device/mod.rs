//! GPU device + surface management.
//!
//! Owns the wgpu device and queue, configures the window surface and hands
//! out one acquired frame at a time. Drawing itself goes through
//! [`crate::backend::gpu::WgpuBackend`].

mod gpu;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
