//! winit → engine input translation. The only place winit input types appear.

mod winit_events;

pub use winit_events::{key_text, translate_window_event};
