//! Normalisation of raw host settings into a [`SyslogConfig`].
//!
//! Hosts typically persist settings as loosely typed strings captured from a
//! form or a settings file. [`SyslogSettings`] accepts those values verbatim;
//! blank strings count as unset and unset values fall back to defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{formatter::MessageFormat, level::Level, severity::Facility};

use super::{
    build::SyslogConfigBuilder,
    types::{BackoffPolicy, ConfigError, ResolvePolicy, SyslogConfig, TlsOptions, Transport},
};

/// Settings as produced by a host configuration surface.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyslogSettings {
    pub syslog_transport: Option<String>,
    pub syslog_server_hostname: Option<String>,
    pub syslog_server_port: Option<u32>,
    pub level_filter: Option<String>,
    pub app_name: Option<String>,
    pub message_hostname: Option<String>,
    pub facility: Option<String>,
    pub message_format: Option<String>,
    pub resolve_policy: Option<ResolvePolicy>,
    pub tls_domain: Option<String>,
    /// Extra PEM trust anchors; blank entries are ignored.
    pub tls_root_certificates_pem: Vec<String>,
    pub connect_timeout_ms: Option<u64>,
    pub write_timeout_ms: Option<u64>,
    pub backoff_base_ms: Option<u64>,
    pub backoff_cap_ms: Option<u64>,
    pub backoff_reset_ms: Option<u64>,
}

/// Return `None` for missing or whitespace-only values.
pub fn trim_to_null(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_or_default<T>(value: Option<&str>) -> Result<T, ConfigError>
where
    T: std::str::FromStr + Default,
    ConfigError: From<T::Err>,
{
    match trim_to_null(value) {
        Some(raw) => Ok(raw.parse()?),
        None => Ok(T::default()),
    }
}

impl SyslogSettings {
    /// Convert the raw settings into a validated configuration.
    ///
    /// A port of `0` is treated as unset, matching form submissions that
    /// leave the field empty.
    pub fn into_config(self) -> Result<SyslogConfig, ConfigError> {
        self.to_builder()?.build()
    }

    /// Convert the raw settings into a builder for further adjustment.
    pub fn to_builder(&self) -> Result<SyslogConfigBuilder, ConfigError> {
        let transport: Transport = parse_or_default(self.syslog_transport.as_deref())?;
        let min_level: Level = parse_or_default(self.level_filter.as_deref())?;
        let facility: Facility = parse_or_default(self.facility.as_deref())?;
        let format: MessageFormat = parse_or_default(self.message_format.as_deref())?;

        let mut builder = SyslogConfigBuilder::new()
            .with_transport(transport)
            .with_server_hostname(owned(self.syslog_server_hostname.as_deref()))
            .with_min_level(min_level)
            .with_message_hostname(owned(self.message_hostname.as_deref()))
            .with_facility(facility)
            .with_format(format)
            .with_resolve_policy(self.resolve_policy.unwrap_or_default())
            .with_tls(TlsOptions {
                domain: owned(self.tls_domain.as_deref()),
                root_certificates: self
                    .tls_root_certificates_pem
                    .iter()
                    .filter_map(|pem| trim_to_null(Some(pem.as_str())))
                    .map(|pem| pem.as_bytes().to_vec())
                    .collect(),
            })
            .with_backoff(self.backoff_policy());
        if let Some(port) = self.syslog_server_port.filter(|p| *p != 0) {
            builder = builder.with_port(port);
        }
        if let Some(app_name) = trim_to_null(self.app_name.as_deref()) {
            builder = builder.with_app_name(app_name);
        }
        if let Some(ms) = self.connect_timeout_ms {
            builder = builder.with_connect_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.write_timeout_ms {
            builder = builder.with_write_timeout(Duration::from_millis(ms));
        }
        Ok(builder)
    }

    fn backoff_policy(&self) -> BackoffPolicy {
        let mut policy = BackoffPolicy::default();
        if let Some(ms) = self.backoff_base_ms {
            policy.base = Duration::from_millis(ms);
        }
        if let Some(ms) = self.backoff_cap_ms {
            policy.cap = Duration::from_millis(ms);
        }
        if let Some(ms) = self.backoff_reset_ms {
            policy.reset_after = Duration::from_millis(ms);
        }
        policy
    }
}

fn millis(duration: Duration) -> Option<u64> {
    u64::try_from(duration.as_millis()).ok()
}

fn owned(value: Option<&str>) -> Option<String> {
    trim_to_null(value).map(str::to_owned)
}

impl From<&SyslogConfig> for SyslogSettings {
    fn from(config: &SyslogConfig) -> Self {
        Self {
            syslog_transport: Some(config.transport().name().to_owned()),
            syslog_server_hostname: config.server_hostname().map(str::to_owned),
            syslog_server_port: Some(u32::from(config.server_port())),
            level_filter: Some(config.min_level().as_str().to_owned()),
            app_name: Some(config.app_name().to_owned()),
            message_hostname: config.message_hostname().map(str::to_owned),
            facility: Some(config.facility().label().to_owned()),
            message_format: Some(config.format().name().to_owned()),
            resolve_policy: Some(config.resolve_policy()),
            tls_domain: config.tls().domain.clone(),
            tls_root_certificates_pem: config
                .tls()
                .root_certificates
                .iter()
                .map(|pem| String::from_utf8_lossy(pem).into_owned())
                .collect(),
            connect_timeout_ms: millis(config.timeouts().connect),
            write_timeout_ms: millis(config.timeouts().write),
            backoff_base_ms: millis(config.backoff().base),
            backoff_cap_ms: millis(config.backoff().cap),
            backoff_reset_ms: millis(config.backoff().reset_after),
        }
    }
}
