//! Master texture compositing.
//!
//! `Compositor::rebuild` regenerates the whole raster from the scene; the
//! result is uploaded as-is (after a vertical flip) by the box renderer.

mod compositor;
mod raster;

pub use compositor::{Compositor, CompositorConfig, RebuildReport};
pub(crate) use compositor::{decode_image, fit_to_texture_limit};
pub use raster::RasterBuffer;
