//! Resource management
//!
//! Meshes and materials the pass draws with.

mod material;
mod mesh;

pub use material::*;
pub use mesh::*;
