//! Color model shared by the compositor, the renderers and the studio.
//!
//! - `Rgba8`: straight-alpha sRGB bytes, the authoring format for layer and
//!   background colors (what a color picker hands over)
//! - `Color`: linear premultiplied `f32`, what GPU clear values and uniforms use

mod color;
mod rgba8;

pub use color::Color;
pub use rgba8::{ParseColorError, Rgba8};
