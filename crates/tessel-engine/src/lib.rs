//! Tessel engine crate.
//!
//! A scoped 2D/3D quad renderer: game code draws through a
//! [`render::RenderStack`] in a fixed logical resolution, and the stack maps
//! everything onto whichever [`backend::GfxBackend`] was picked at start-up.
//! The platform runtime (window, GPU device, frame clock) lives alongside it.

pub mod asset;
pub mod backend;
pub mod coords;
pub mod core;
pub mod device;
pub mod gfx;
pub mod logging;
pub mod render;
pub mod time;
pub mod view;
pub mod window;
