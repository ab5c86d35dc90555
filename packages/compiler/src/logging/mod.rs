//! Logging
//!
//! The compiler reports through a [`Logger`] rather than printing directly, so
//! hosts can route diagnostics wherever they like.

mod console_logger;
mod logger;

pub use console_logger::ConsoleLogger;
pub use logger::{LogLevel, LogRecord, Logger, MemoryLogger, NullLogger};
