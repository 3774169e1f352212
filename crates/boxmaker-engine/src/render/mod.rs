//! GPU rendering subsystem.
//!
//! Each renderer owns its GPU resources and creates them lazily on first use,
//! so renderers can be constructed before a device exists.
//!
//! Frame order: surface clear, backdrop (no depth), bevel box (depth tested).

mod backdrop;
mod box_renderer;
mod common;
mod ctx;

pub use backdrop::BackdropRenderer;
pub use box_renderer::{BoxRenderer, LightParams};
pub use ctx::{RenderCtx, RenderTarget};
