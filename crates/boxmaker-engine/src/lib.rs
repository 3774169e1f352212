//! boxmaker engine: texture compositing, layer placement and bevel-box
//! rendering for the mockup editor.
//!
//! [`editor::Editor`] is the entry point; everything below it except the
//! `device`, `render` and `window` modules runs without a GPU.

pub mod camera;
pub mod compose;
pub mod coords;
pub mod core;
pub mod device;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod input;
pub mod interact;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;
pub mod text;
pub mod time;
pub mod window;

pub use editor::{Editor, EditorConfig};
