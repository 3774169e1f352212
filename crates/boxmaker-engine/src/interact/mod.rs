//! Pointer → texture mapping, hit-testing and layer dragging.

mod drag;
mod mapping;

pub use drag::{DragController, DragState, hit_test};
pub use mapping::screen_to_texture;
