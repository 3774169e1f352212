//! Window + runtime loop.
//!
//! Owns the `winit` event loop and the editor window, and paces frames at a
//! fixed interval.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
