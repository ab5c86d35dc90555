// Console Logger
//
// Logger that writes to the process console.

use super::logger::{LogLevel, Logger};

/// Console logger. Errors and warnings go to stderr, the rest to stdout.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    level: LogLevel,
    prefix: String,
}

impl ConsoleLogger {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            prefix: "mvvm".to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

impl Logger for ConsoleLogger {
    fn level(&self) -> LogLevel {
        self.level
    }

    fn log(&self, level: LogLevel, msg: &str) {
        if !self.is_enabled(level) {
            return;
        }
        match level {
            LogLevel::Debug | LogLevel::Info => {
                println!("[{}] [{}] {}", self.prefix, level.label(), msg)
            }
            LogLevel::Warn | LogLevel::Error => {
                eprintln!("[{}] [{}] {}", self.prefix, level.label(), msg)
            }
        }
    }
}
