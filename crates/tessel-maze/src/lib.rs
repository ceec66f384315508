//! Maze rendering on top of the tessel render stack.
//!
//! [`MazeRenderer`] is the callback contract a maze geometry engine drives.
//! [`MazeRenderAdapter`] satisfies it with nothing but a
//! [`tessel_engine::render::RenderStack`], and [`MazeScene`] is a small
//! engine that turns a text grid into faces and drives that contract.

mod adapter;
mod contract;
mod map;

pub use adapter::MazeRenderAdapter;
pub use contract::{MazeRenderer, MazeVertex, QuadListData};
pub use map::{Cell, MazeCamera, MazeMap, MazeMapError, MazeScene, MazeTextures};
