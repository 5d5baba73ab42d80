//! Fluent construction and validation of [`SyslogConfig`].

use std::time::Duration;

use crate::{
    formatter::{MAX_APP_NAME_LEN, MAX_HOSTNAME_LEN, MessageFormat, is_header_token},
    level::Level,
    severity::Facility,
};

use super::types::{
    BackoffPolicy, ConfigError, ResolvePolicy, StreamTimeouts, SyslogConfig, TlsOptions, Transport,
};

/// Longest DNS name accepted as a collector hostname.
const MAX_SERVER_HOSTNAME_LEN: usize = 253;

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value.is_zero() {
            Err(ConfigError::InvalidTimeout($field))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! value_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.config.$field = value;
            self
        }
    };
}

/// Builder for [`SyslogConfig`] values.
///
/// Starts from the defaults: UDP to port 514, minimum level `FINE`, facility
/// `USER`, RFC 3164 messages and no server hostname (delivery disabled).
#[derive(Clone, Debug, Default)]
pub struct SyslogConfigBuilder {
    config: SyslogConfig,
    port: Option<u32>,
}

impl SyslogConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the collector hostname and port together.
    pub fn with_server(mut self, hostname: impl Into<String>, port: u16) -> Self {
        self.config.server_hostname = Some(hostname.into());
        self.port = Some(u32::from(port));
        self
    }

    /// Set or clear the collector hostname. Clearing disables delivery.
    pub fn with_server_hostname(mut self, hostname: Option<String>) -> Self {
        self.config.server_hostname = hostname;
        self
    }

    /// Set the collector port. Accepts a wide integer so host supplied
    /// values can be range checked by [`build`](Self::build).
    pub fn with_port(mut self, port: u32) -> Self {
        self.port = Some(port);
        self
    }

    /// Override the hostname written into messages.
    pub fn with_message_hostname(mut self, hostname: Option<String>) -> Self {
        self.config.message_hostname = hostname;
        self
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.config.app_name = app_name.into();
        self
    }

    value_setter!(with_transport, transport, Transport);
    value_setter!(
        #[doc = "Set the least severe level that is forwarded."]
        with_min_level,
        min_level,
        Level
    );
    value_setter!(with_facility, facility, Facility);
    value_setter!(with_format, format, MessageFormat);
    value_setter!(with_resolve_policy, resolve_policy, ResolvePolicy);
    value_setter!(with_tls, tls, TlsOptions);
    value_setter!(with_backoff, backoff, BackoffPolicy);

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeouts.connect = timeout;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeouts.write = timeout;
        self
    }

    /// Validate the collected values and produce an immutable configuration.
    pub fn build(self) -> Result<SyslogConfig, ConfigError> {
        let Self { mut config, port } = self;
        if let Some(port) = port {
            config.server_port = u16::try_from(port)
                .ok()
                .filter(|p| *p != 0)
                .ok_or(ConfigError::InvalidPort(port))?;
        }
        if let Some(hostname) = &config.server_hostname {
            validate_server_hostname(hostname)?;
        }
        if let Some(hostname) = &config.message_hostname
            && !is_header_token(hostname, MAX_HOSTNAME_LEN)
        {
            return Err(ConfigError::InvalidMessageHostname(hostname.clone()));
        }
        if !is_header_token(&config.app_name, MAX_APP_NAME_LEN) {
            return Err(ConfigError::InvalidAppName(config.app_name));
        }
        validate_timeouts(&config.timeouts)?;
        validate_backoff(&config.backoff)?;
        Ok(config)
    }

    /// Like [`build`](Self::build) but rejects configurations that would
    /// disable delivery.
    pub fn build_enabled(self) -> Result<SyslogConfig, ConfigError> {
        let config = self.build()?;
        if config.is_enabled() {
            Ok(config)
        } else {
            Err(ConfigError::MissingHostname)
        }
    }
}

fn validate_server_hostname(hostname: &str) -> Result<(), ConfigError> {
    if hostname.is_empty() {
        return Err(ConfigError::MissingHostname);
    }
    let well_formed = hostname.len() <= MAX_SERVER_HOSTNAME_LEN
        && !hostname.starts_with(['-', '.'])
        && hostname
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | ':'));
    if well_formed {
        Ok(())
    } else {
        Err(ConfigError::InvalidHostname(hostname.to_owned()))
    }
}

fn validate_timeouts(timeouts: &StreamTimeouts) -> Result<(), ConfigError> {
    ensure_positive!(timeouts.connect, "connect_timeout")?;
    ensure_positive!(timeouts.write, "write_timeout")?;
    Ok(())
}

fn validate_backoff(backoff: &BackoffPolicy) -> Result<(), ConfigError> {
    ensure_positive!(backoff.base, "backoff_base")?;
    ensure_positive!(backoff.cap, "backoff_cap")?;
    ensure_positive!(backoff.reset_after, "backoff_reset_after")?;
    Ok(())
}
