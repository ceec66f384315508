//! Render state stack.
//!
//! [`RenderStack`] is the only component that mutates backend draw state.
//! Game code begins a scene, then issues scoped draws through it directly,
//! through the resource wrappers, or through the quad-buffer cache.
//!
//! Convention:
//! - draw positions and sizes are in target (logical) pixels, top-left origin, +Y down
//! - the current scale and offset map them to device pixels before they reach the backend
//! - quad-buffer geometry is in world units and only sees the model transform

mod config;
pub mod quad_buffer;
mod stack;
pub mod wrappers;

pub use config::RendererConfig;
pub use quad_buffer::{QuadBufferCache, QuadBufferError, QuadBufferHandle, QuadRecord};
pub use stack::{RenderStack, SceneMode};
pub use wrappers::{FontAtlasWrapper, FontStyle, SpriteAtlasWrapper, SpriteWrapper, TextureWrapper};
