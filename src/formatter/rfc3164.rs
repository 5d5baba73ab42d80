//! BSD syslog (RFC 3164) rendering.

use chrono::{DateTime, Local};

use super::{FormatError, MessageMeta, sanitise_message};
use crate::log_record::LogRecord;

/// Maximum length of the `TAG` field.
const MAX_TAG_LEN: usize = 32;

/// Render `<PRI>Mmm dd hh:mm:ss HOSTNAME TAG: MSG` in local time.
pub(super) fn render(record: &LogRecord, meta: &MessageMeta<'_>) -> Result<Vec<u8>, FormatError> {
    let hostname = meta.checked_hostname()?;
    let app_name = meta.checked_app_name(usize::MAX)?;
    // Header tokens are ASCII so byte truncation stays on a char boundary.
    let tag = &app_name[..app_name.len().min(MAX_TAG_LEN)];
    let timestamp = DateTime::<Local>::from(record.timestamp).format("%b %e %H:%M:%S");
    let line = format!(
        "<{}>{} {} {}: {}",
        meta.priority(),
        timestamp,
        hostname,
        tag,
        sanitise_message(&record.message)
    );
    Ok(line.into_bytes())
}
