//! Coordinate/transform engine.
//!
//! Pure computation of scale and offset values from the device size and the
//! logical target size. Nothing in here talks to a backend.
//!
//! Spaces:
//! - device space: raw pixels of the output surface
//! - target space: the fixed logical resolution content is authored against
//! - scaled/offset space: target space after scale + offset (letterboxing)

mod dimens;
mod transform;

pub use dimens::{Anchor, ViewDimens};
pub use transform::{DestQuad, Transform2};
