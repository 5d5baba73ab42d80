//! IETF syslog (RFC 5424) rendering.

use chrono::{DateTime, SecondsFormat, Utc};

use super::{FormatError, MAX_APP_NAME_LEN, MessageMeta, is_header_token, sanitise_message};
use crate::log_record::LogRecord;

const NILVALUE: &str = "-";
const MAX_MSGID_LEN: usize = 32;

/// Render `<PRI>1 TIMESTAMP HOSTNAME APP-NAME PROCID MSGID SD MSG`.
///
/// Structured data is always the nil value. `MSGID` carries the logger name
/// when it is a valid header token.
pub(super) fn render(record: &LogRecord, meta: &MessageMeta<'_>) -> Result<Vec<u8>, FormatError> {
    let hostname = meta.checked_hostname()?;
    let app_name = meta.checked_app_name(MAX_APP_NAME_LEN)?;
    let timestamp =
        DateTime::<Utc>::from(record.timestamp).to_rfc3339_opts(SecondsFormat::Millis, true);
    let msg_id = if is_header_token(&record.logger, MAX_MSGID_LEN) {
        record.logger.as_str()
    } else {
        NILVALUE
    };
    let mut line = format!(
        "<{}>1 {} {} {} {} {} {}",
        meta.priority(),
        timestamp,
        hostname,
        app_name,
        std::process::id(),
        msg_id,
        NILVALUE
    );
    let message = sanitise_message(&record.message);
    if !message.is_empty() {
        line.push(' ');
        line.push_str(&message);
    }
    Ok(line.into_bytes())
}
