//! Configuration of the syslog delivery pipeline.
//!
//! [`SyslogConfigBuilder`] validates host supplied values and produces an
//! immutable [`SyslogConfig`]. [`SyslogSettings`] adapts loosely typed host
//! settings onto the builder.

mod build;
mod settings;
mod types;

pub use build::SyslogConfigBuilder;
pub use settings::{SyslogSettings, trim_to_null};
pub use types::{
    BackoffPolicy, ConfigError, DEFAULT_APP_NAME, DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_CAP,
    DEFAULT_BACKOFF_RESET, DEFAULT_CONNECT_TIMEOUT, DEFAULT_SYSLOG_SERVER_PORT,
    DEFAULT_WRITE_TIMEOUT, ResolvePolicy, StreamTimeouts, SyslogConfig, TlsOptions, Transport,
};
