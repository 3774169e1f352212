//! Frame pacing.
//!
//! The runtime sleeps until [`FrameTicker::deadline`] and draws one frame per
//! tick. Every method takes the current `Instant` so tests can drive time.

mod ticker;

pub use ticker::{FrameTicker, FrameTime};
