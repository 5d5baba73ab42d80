//! Syslog message rendering.
//!
//! [`MessageFormat`] selects between the RFC 3164 and RFC 5424 wire formats.
//! Rendering is pure: no I/O, no shared state beyond the lazily resolved
//! local hostname. [`SyslogFormatter`] bundles the static metadata of one
//! configuration so the publish path only supplies the record.

use std::{borrow::Cow, fmt, str::FromStr};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    log_record::LogRecord,
    severity::{Facility, Severity},
};

mod rfc3164;
mod rfc5424;

/// Maximum RFC 5424 `APP-NAME` length.
pub const MAX_APP_NAME_LEN: usize = 48;
/// Maximum RFC 5424 `HOSTNAME` length.
pub const MAX_HOSTNAME_LEN: usize = 255;

const FALLBACK_HOSTNAME: &str = "localhost";

static LOCAL_HOSTNAME: Lazy<String> = Lazy::new(|| {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| is_header_token(name, MAX_HOSTNAME_LEN))
        .unwrap_or_else(|| FALLBACK_HOSTNAME.to_owned())
});

/// Hostname of the local machine, resolved once per process.
pub fn local_hostname() -> &'static str {
    LOCAL_HOSTNAME.as_str()
}

/// Errors raised while rendering a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("app name {0:?} is not a valid syslog header token")]
    InvalidAppName(String),
    #[error("hostname {0:?} is not a valid syslog header token")]
    InvalidHostname(String),
}

/// Wire format of rendered messages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MessageFormat {
    #[default]
    Rfc3164,
    Rfc5424,
}

impl MessageFormat {
    pub const ALL: [MessageFormat; 2] = [MessageFormat::Rfc3164, MessageFormat::Rfc5424];

    pub fn name(self) -> &'static str {
        match self {
            MessageFormat::Rfc3164 => "RFC_3164",
            MessageFormat::Rfc5424 => "RFC_5424",
        }
    }

    /// Render `record` with the supplied header metadata.
    pub fn format(self, record: &LogRecord, meta: &MessageMeta<'_>) -> Result<Vec<u8>, FormatError> {
        match self {
            MessageFormat::Rfc3164 => rfc3164::render(record, meta),
            MessageFormat::Rfc5424 => rfc5424::render(record, meta),
        }
    }
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a message format name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown message format: {0}")]
pub struct ParseFormatError(pub String);

impl FromStr for MessageFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase();
        match normalised.as_str() {
            "RFC3164" => Ok(Self::Rfc3164),
            "RFC5424" => Ok(Self::Rfc5424),
            _ => Err(ParseFormatError(s.to_owned())),
        }
    }
}

impl TryFrom<String> for MessageFormat {
    type Error = ParseFormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MessageFormat> for String {
    fn from(format: MessageFormat) -> Self {
        format.name().to_owned()
    }
}

/// Static header fields applied to a rendered message.
#[derive(Clone, Copy, Debug)]
pub struct MessageMeta<'a> {
    pub app_name: &'a str,
    pub hostname: &'a str,
    pub facility: Facility,
    pub severity: Severity,
}

impl MessageMeta<'_> {
    fn priority(&self) -> u8 {
        self.severity.priority(self.facility)
    }

    fn checked_hostname(&self) -> Result<&str, FormatError> {
        if is_header_token(self.hostname, MAX_HOSTNAME_LEN) {
            Ok(self.hostname)
        } else {
            Err(FormatError::InvalidHostname(self.hostname.to_owned()))
        }
    }

    fn checked_app_name(&self, max_len: usize) -> Result<&str, FormatError> {
        if is_header_token(self.app_name, max_len) {
            Ok(self.app_name)
        } else {
            Err(FormatError::InvalidAppName(self.app_name.to_owned()))
        }
    }
}

/// Formatter bound to the static metadata of one configuration.
#[derive(Clone, Debug)]
pub struct SyslogFormatter {
    format: MessageFormat,
    app_name: String,
    hostname: String,
    facility: Facility,
}

impl SyslogFormatter {
    /// Build a formatter. `hostname` falls back to [`local_hostname`].
    pub fn new(
        format: MessageFormat,
        app_name: impl Into<String>,
        hostname: Option<&str>,
        facility: Facility,
    ) -> Self {
        Self {
            format,
            app_name: app_name.into(),
            hostname: hostname.map_or_else(|| local_hostname().to_owned(), str::to_owned),
            facility,
        }
    }

    pub fn message_format(&self) -> MessageFormat {
        self.format
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Render `record`, deriving the severity from its host level.
    pub fn format(&self, record: &LogRecord) -> Result<Vec<u8>, FormatError> {
        let meta = MessageMeta {
            app_name: &self.app_name,
            hostname: &self.hostname,
            facility: self.facility,
            severity: record.level.severity(),
        };
        self.format.format(record, &meta)
    }
}

/// Return `true` when `value` is a non-empty run of printable US-ASCII no
/// longer than `max_len`.
pub(crate) fn is_header_token(value: &str, max_len: usize) -> bool {
    !value.is_empty() && value.len() <= max_len && value.bytes().all(|b| (33..=126).contains(&b))
}

/// Make free text safe for a single syslog line.
///
/// NUL bytes are removed; CR, LF and other control characters become spaces.
pub(crate) fn sanitise_message(message: &str) -> Cow<'_, str> {
    if !message.chars().any(|c| c.is_control() && c != '\t') {
        return Cow::Borrowed(message);
    }
    Cow::Owned(
        message
            .chars()
            .filter(|&c| c != '\0')
            .map(|c| if c.is_control() && c != '\t' { ' ' } else { c })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use rstest::rstest;
    use static_assertions::assert_impl_all;

    #[test]
    fn formatter_is_send_sync() {
        assert_impl_all!(SyslogFormatter: Send, Sync);
    }

    #[rstest]
    #[case("plain text", "plain text")]
    #[case("line one\nline two", "line one line two")]
    #[case("crlf\r\nend", "crlf  end")]
    #[case("nul\0byte", "nulbyte")]
    #[case("tab\tkept", "tab\tkept")]
    #[case("bell\u{7}", "bell ")]
    fn sanitises_message_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitise_message(input), expected);
    }

    #[rstest]
    fn clean_messages_are_borrowed() {
        assert!(matches!(sanitise_message("no controls"), Cow::Borrowed(_)));
    }

    #[rstest]
    #[case("app", 48, true)]
    #[case("", 48, false)]
    #[case("with space", 48, false)]
    #[case("new\nline", 48, false)]
    #[case("caf\u{e9}", 48, false)]
    #[case("abcdef", 5, false)]
    fn validates_header_tokens(#[case] value: &str, #[case] max: usize, #[case] expected: bool) {
        assert_eq!(is_header_token(value, max), expected);
    }

    #[rstest]
    #[case("rfc3164", MessageFormat::Rfc3164)]
    #[case("RFC_5424", MessageFormat::Rfc5424)]
    #[case("rfc-5424", MessageFormat::Rfc5424)]
    fn parses_format_names(#[case] input: &str, #[case] expected: MessageFormat) {
        assert_eq!(input.parse::<MessageFormat>(), Ok(expected));
    }

    #[rstest]
    fn local_hostname_is_a_valid_token() {
        assert!(is_header_token(local_hostname(), MAX_HOSTNAME_LEN));
    }

    #[rstest]
    fn formatter_defaults_hostname_to_local_machine() {
        let formatter = SyslogFormatter::new(MessageFormat::Rfc3164, "app", None, Facility::User);
        assert_eq!(formatter.hostname(), local_hostname());
    }

    #[rstest]
    fn formatter_derives_severity_from_level() {
        let formatter =
            SyslogFormatter::new(MessageFormat::Rfc3164, "app", Some("host"), Facility::Local0);
        let bytes = formatter
            .format(&LogRecord::new("core", Level::Severe, "boom"))
            .expect("format record");
        let text = String::from_utf8(bytes).expect("utf-8 output");
        assert!(text.starts_with("<131>"), "unexpected PRI in {text}");
    }

    #[rstest]
    fn rejects_invalid_hostname_override() {
        let formatter =
            SyslogFormatter::new(MessageFormat::Rfc5424, "app", Some("bad host"), Facility::User);
        let err = formatter
            .format(&LogRecord::new("core", Level::Info, "msg"))
            .expect_err("hostname with space must fail");
        assert_eq!(err, FormatError::InvalidHostname("bad host".into()));
    }
}
