//! Logger initialization.
//!
//! Library code only uses the `log` facade; binaries call [`init_logging`]
//! once at start-up to install `env_logger`.

mod init;

pub use init::{init_logging, LoggingConfig};
