//! Type definitions for syslog delivery configuration.

use std::{fmt, io, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{formatter::MessageFormat, level::Level, severity::Facility};

/// Default collector port for every transport.
pub const DEFAULT_SYSLOG_SERVER_PORT: u16 = 514;
/// Default application name written into each message.
pub const DEFAULT_APP_NAME: &str = "femtosyslog";
/// Default connection timeout applied when establishing stream sockets.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default write timeout applied to stream socket writes.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);
/// Default base delay between reconnection attempts.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(100);
/// Default maximum delay between reconnection attempts.
pub const DEFAULT_BACKOFF_CAP: Duration = Duration::from_secs(10);
/// Default duration of healthy writes that resets backoff state.
pub const DEFAULT_BACKOFF_RESET: Duration = Duration::from_secs(30);

/// Errors that may occur while building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid syslog server port: {0} (expected 1-65535)")]
    InvalidPort(u32),
    #[error("syslog server hostname is required")]
    MissingHostname,
    #[error("malformed syslog server hostname: {0:?}")]
    InvalidHostname(String),
    #[error("invalid message hostname: {0:?}")]
    InvalidMessageHostname(String),
    #[error("invalid app name: {0:?}")]
    InvalidAppName(String),
    #[error("{0} must be greater than zero")]
    InvalidTimeout(&'static str),
    #[error("unknown syslog transport: {0}")]
    UnknownTransport(String),
    #[error(transparent)]
    UnknownFormat(#[from] crate::formatter::ParseFormatError),
    #[error(transparent)]
    UnknownFacility(#[from] crate::severity::ParseFacilityError),
    #[error(transparent)]
    UnknownLevel(#[from] crate::level::ParseLevelError),
    /// The transport for a valid configuration could not be prepared.
    #[error("failed to prepare syslog transport: {0}")]
    Transport(#[from] io::Error),
}

/// Network substrate used to reach the collector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Transport {
    #[default]
    Udp,
    Tcp,
    TcpTls,
}

impl Transport {
    pub const ALL: [Transport; 3] = [Transport::Udp, Transport::Tcp, Transport::TcpTls];

    /// Stable identifier used in persisted settings.
    pub fn name(self) -> &'static str {
        match self {
            Transport::Udp => "UDP",
            Transport::Tcp => "TCP",
            Transport::TcpTls => "TCP_TLS",
        }
    }

    /// Human readable label for operator-facing text.
    pub fn label(self) -> &'static str {
        match self {
            Transport::Udp => "UDP",
            Transport::Tcp => "TCP",
            Transport::TcpTls => "TCP + TLS",
        }
    }

    pub fn is_stream(self) -> bool {
        !matches!(self, Transport::Udp)
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Transport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase();
        match compact.as_str() {
            "UDP" => Ok(Self::Udp),
            "TCP" => Ok(Self::Tcp),
            "TCPTLS" | "TCPSSL" | "TLS" => Ok(Self::TcpTls),
            _ => Err(ConfigError::UnknownTransport(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Transport {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Transport> for String {
    fn from(transport: Transport) -> Self {
        transport.name().to_owned()
    }
}

/// How the UDP sender resolves the collector address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvePolicy {
    /// Resolve the hostname before every datagram.
    #[default]
    PerSend,
    /// Resolve once and reuse the address until a send fails.
    Cached,
}

/// TLS settings for the `TCP + TLS` transport.
///
/// Certificates are always validated against the platform trust store plus
/// any extra roots supplied here.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TlsOptions {
    /// Name verified against the server certificate. Defaults to the
    /// configured server hostname.
    pub domain: Option<String>,
    /// Additional PEM encoded root certificates.
    pub root_certificates: Vec<Vec<u8>>,
}

/// Bounds on blocking stream socket operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamTimeouts {
    pub connect: Duration,
    pub write: Duration,
}

impl Default for StreamTimeouts {
    fn default() -> Self {
        Self {
            connect: DEFAULT_CONNECT_TIMEOUT,
            write: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

/// Exponential backoff policy for reconnection attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub cap: Duration,
    pub reset_after: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: DEFAULT_BACKOFF_BASE,
            cap: DEFAULT_BACKOFF_CAP,
            reset_after: DEFAULT_BACKOFF_RESET,
        }
    }
}

/// Validated, immutable description of one delivery pipeline.
///
/// Only [`SyslogConfigBuilder`](super::SyslogConfigBuilder) constructs
/// values, so every instance satisfies the port, hostname and app name
/// invariants. A configuration without a server hostname disables delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyslogConfig {
    pub(super) transport: Transport,
    pub(super) server_hostname: Option<String>,
    pub(super) server_port: u16,
    pub(super) min_level: Level,
    pub(super) app_name: String,
    pub(super) message_hostname: Option<String>,
    pub(super) facility: Facility,
    pub(super) format: MessageFormat,
    pub(super) resolve_policy: ResolvePolicy,
    pub(super) tls: TlsOptions,
    pub(super) timeouts: StreamTimeouts,
    pub(super) backoff: BackoffPolicy,
}

impl SyslogConfig {
    /// Start building a configuration from defaults.
    pub fn builder() -> super::SyslogConfigBuilder {
        super::SyslogConfigBuilder::new()
    }

    /// Whether this configuration names a collector to deliver to.
    pub fn is_enabled(&self) -> bool {
        self.server_hostname.is_some()
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn server_hostname(&self) -> Option<&str> {
        self.server_hostname.as_deref()
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn message_hostname(&self) -> Option<&str> {
        self.message_hostname.as_deref()
    }

    pub fn facility(&self) -> Facility {
        self.facility
    }

    pub fn format(&self) -> MessageFormat {
        self.format
    }

    pub fn resolve_policy(&self) -> ResolvePolicy {
        self.resolve_policy
    }

    pub fn tls(&self) -> &TlsOptions {
        &self.tls
    }

    pub fn timeouts(&self) -> StreamTimeouts {
        self.timeouts
    }

    pub fn backoff(&self) -> BackoffPolicy {
        self.backoff
    }

    /// `host:port` of the collector, when delivery is enabled.
    pub fn target(&self) -> Option<String> {
        self.server_hostname
            .as_deref()
            .map(|host| format!("{host}:{}", self.server_port))
    }
}

impl Default for SyslogConfig {
    /// Disabled configuration carrying every default.
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            server_hostname: None,
            server_port: DEFAULT_SYSLOG_SERVER_PORT,
            min_level: Level::default(),
            app_name: DEFAULT_APP_NAME.to_owned(),
            message_hostname: None,
            facility: Facility::default(),
            format: MessageFormat::default(),
            resolve_policy: ResolvePolicy::default(),
            tls: TlsOptions::default(),
            timeouts: StreamTimeouts::default(),
            backoff: BackoffPolicy::default(),
        }
    }
}

impl fmt::Display for SyslogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SyslogConfig{{server={}:{}, transport={}, level={}, app_name={}, message_hostname={}, facility={}, format={}}}",
            self.server_hostname.as_deref().unwrap_or("<unset>"),
            self.server_port,
            self.transport.label(),
            self.min_level,
            self.app_name,
            self.message_hostname.as_deref().unwrap_or("<local>"),
            self.facility,
            self.format,
        )
    }
}
