//! Graphics backend abstraction.
//!
//! The render stack talks to a [`GfxBackend`]; two variants exist:
//! - full: every operation including the model transform stack
//!   ([`gpu::WgpuBackend`], and [`RecordingBackend::full`])
//! - reduced: transform stack operations are no-ops ([`RecordingBackend::reduced`])
//!
//! The variant is picked once at start-up. `Box<dyn GfxBackend>` is itself a
//! backend so the choice can be made at runtime.

mod api;
mod error;
pub mod gpu;
mod record;
mod types;

pub use api::GfxBackend;
pub(crate) use api::validate_pixels;
pub use error::BackendError;
pub use record::{BackendCmd, DrawnQuad, RecordingBackend};
pub use types::{
    BackendVariant, BlendFactor, BlendFunc, Projection, QuadPrimitive, QuadVertex, TextureId,
};
