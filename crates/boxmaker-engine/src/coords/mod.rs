//! Coordinate and geometry types shared by the compositor, hit-testing and renderers.
//!
//! Two 2D spaces exist:
//! - viewport space: logical window pixels, origin top-left, +Y down
//! - texture space: master texture texels, origin top-left, +Y down
//!
//! The flip to a bottom-left origin happens once, when the master texture is
//! handed to the GPU (see `compose::RasterBuffer::flipped_bytes`).

mod rect;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::{TextureSize, Viewport};
