//! Host-facing contracts.
//!
//! The runtime drives an [`App`]; each redraw hands it a [`FrameCtx`] that can
//! turn a [`crate::render::RenderStack`] pass into a presented frame.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
