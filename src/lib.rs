//! Syslog delivery for host log records.
//!
//! Records flow through a [`SyslogManager`], which filters them by level,
//! renders them as RFC 3164 or RFC 5424 messages and sends them to a
//! collector over UDP, TCP or TCP with TLS. Delivery failures are reported
//! through the [`log`] facade and never reach the caller.

pub mod config;
pub mod formatter;
pub mod level;
pub mod log_record;
pub mod manager;
pub mod rate_limited_warner;
pub mod severity;
pub mod transport;

pub use config::{
    BackoffPolicy, ConfigError, ResolvePolicy, StreamTimeouts, SyslogConfig, SyslogConfigBuilder,
    SyslogSettings, TlsOptions, Transport,
};
pub use formatter::{FormatError, MessageFormat, MessageMeta, SyslogFormatter, local_hostname};
pub use level::{Level, ParseLevelError};
pub use log_record::LogRecord;
pub use manager::{ManagerState, SyslogManager};
pub use rate_limited_warner::RateLimitedWarner;
pub use severity::{Facility, Severity, passes_filter};
pub use transport::{ConnectionStatus, SendError, SendErrorKind, TransportSender};
