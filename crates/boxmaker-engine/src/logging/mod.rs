//! Logger initialization for binaries and tests.
//!
//! Library code only uses the `log` macros; `env_logger` is wired up here once.

mod init;

pub use init::{DEFAULT_FILTER, LoggingConfig, init_logging};
