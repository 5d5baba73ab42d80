//! Log record representation consumed by the syslog pipeline.
//!
//! Records are produced by the host's logging framework and are read-only
//! once handed to [`crate::SyslogManager::publish`].

use std::fmt;
use std::time::SystemTime;

use crate::level::Level;

#[derive(Clone, Debug)]
pub struct LogRecord {
    /// Name of the logger that created this record.
    pub logger: String,
    /// Host level of the record.
    pub level: Level,
    /// The log message content.
    pub message: String,
    /// Time the record was created.
    pub timestamp: SystemTime,
}

impl LogRecord {
    /// Construct a record stamped with the current time.
    pub fn new(logger: &str, level: Level, message: &str) -> Self {
        Self::with_timestamp(logger, level, message, SystemTime::now())
    }

    /// Construct a record with an explicit creation time.
    pub fn with_timestamp(logger: &str, level: Level, message: &str, timestamp: SystemTime) -> Self {
        Self {
            logger: logger.to_owned(),
            level,
            message: message.to_owned(),
            timestamp,
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.logger, self.level, self.message)
    }
}
