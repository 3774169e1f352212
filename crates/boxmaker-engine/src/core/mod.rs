//! Contract between the platform loop and the application.
//!
//! The runtime owns the window, GPU and input bookkeeping; the application
//! only ever sees a [`FrameCtx`] per tick.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
