//! Window + runtime loop.
//!
//! Owns the `winit` event loop and windows; each window carries its own
//! [`crate::device::Gpu`] and frame clock.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
