//! Resource-scoped drawing helpers handed to `wrap_*` callbacks.
//!
//! Each wrapper borrows the render stack while its resource's texture is
//! bound and turns target-space positions into quads with the right UVs.

mod font_atlas;
mod sprite;
mod sprite_atlas;
mod texture;

pub use font_atlas::{FontAtlasWrapper, FontStyle};
pub use sprite::SpriteWrapper;
pub use sprite_atlas::SpriteAtlasWrapper;
pub use texture::TextureWrapper;
