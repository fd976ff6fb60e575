//! Logger setup over the `log` facade.
//!
//! The library only emits through `log`; binaries call [`init_logging`] once.

mod init;

pub use init::{init_logging, LoggingConfig};
