//! Procedural geometry for the bevel box.
//!
//! Everything here is pure data: no GPU types, no mutable global state.

mod bevel_box;
mod mesh;

pub use bevel_box::{BevelBox, BoxParams, GeometryCache, Patch, PatchKind};
pub use mesh::{Mesh, Vertex};
