//! Leveled logging collaborator.
//!
//! Components never log through a global; each one holds an `Arc<dyn Logger>`
//! handed to it at construction. [`LogLogger`] forwards to the `log` facade,
//! which is what the binary wires up.

use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Verbose,
    Information,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Verbose => "verbose",
            LogLevel::Information => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
        };
        f.write_str(s)
    }
}

pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);

    fn verbose(&self, message: &str) {
        self.log(LogLevel::Verbose, message);
    }

    fn info(&self, message: &str) {
        self.log(LogLevel::Information, message);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn critical(&self, message: &str) {
        self.log(LogLevel::Critical, message);
    }
}

pub type SharedLogger = Arc<dyn Logger>;

/// Forwards messages to the `log` crate under the `svcfetch` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogLogger;

impl LogLogger {
    pub fn shared() -> SharedLogger {
        Arc::new(LogLogger)
    }
}

impl Logger for LogLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Verbose => log::debug!(target: "svcfetch", "{}", message),
            LogLevel::Information => log::info!(target: "svcfetch", "{}", message),
            LogLevel::Warning => log::warn!(target: "svcfetch", "{}", message),
            LogLevel::Error => log::error!(target: "svcfetch", "{}", message),
            LogLevel::Critical => log::error!(target: "svcfetch", "[critical] {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingLogger;

    #[test]
    fn test_default_methods_route_levels() {
        let logger = RecordingLogger::default();
        logger.verbose("a");
        logger.info("b");
        logger.warn("c");
        logger.error("d");
        logger.critical("e");

        let levels: Vec<LogLevel> = logger.entries().into_iter().map(|(l, _)| l).collect();
        assert_eq!(
            levels,
            vec![
                LogLevel::Verbose,
                LogLevel::Information,
                LogLevel::Warning,
                LogLevel::Error,
                LogLevel::Critical
            ]
        );
    }

    #[test_log::test]
    fn test_log_logger_does_not_panic() {
        let logger = LogLogger;
        logger.info("hello");
        logger.critical("world");
    }

    #[test]
    fn test_level_display() {
        assert_eq!(LogLevel::Warning.to_string(), "warn");
        assert_eq!(LogLevel::Critical.to_string(), "critical");
    }
}
