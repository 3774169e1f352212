//! Editable scene: layer model, interaction mode and camera.
//!
//! Responsibilities:
//! - keep text and icon layers in paint order
//! - track whether the master texture must be recomposited
//! - hold the per-editor state that would otherwise be global

mod layer;
mod stack;
mod state;

pub use layer::{IconLayer, LayerRef, Placed, TextEdit, TextLayer};
pub use stack::LayerStack;
pub use state::{InteractionMode, SceneState};
