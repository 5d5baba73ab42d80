//! Stream framing for syslog over TCP.
//!
//! RFC 5424 messages use octet counting (`LEN SP MSG`, RFC 6587 §3.4.1).
//! RFC 3164 messages use non-transparent framing with a trailing LF, which
//! legacy collectors expect. Messages are sanitised before framing so they
//! never contain an embedded LF.

use crate::formatter::MessageFormat;

/// Frame a rendered message for a stream transport.
pub fn frame_message(format: MessageFormat, message: &[u8]) -> Vec<u8> {
    match format {
        MessageFormat::Rfc5424 => {
            let prefix = format!("{} ", message.len());
            let mut framed = Vec::with_capacity(prefix.len() + message.len());
            framed.extend_from_slice(prefix.as_bytes());
            framed.extend_from_slice(message);
            framed
        }
        MessageFormat::Rfc3164 => {
            let mut framed = Vec::with_capacity(message.len() + 1);
            framed.extend_from_slice(message);
            framed.push(b'\n');
            framed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn octet_counting_prefixes_length() {
        let framed = frame_message(MessageFormat::Rfc5424, b"<14>1 - - - - - - hi");
        assert_eq!(framed, b"20 <14>1 - - - - - - hi");
    }

    #[rstest]
    fn octet_counting_counts_bytes_not_chars() {
        let framed = frame_message(MessageFormat::Rfc5424, "\u{e9}".as_bytes());
        assert_eq!(&framed[..2], b"2 ");
    }

    #[rstest]
    fn legacy_framing_appends_newline() {
        let framed = frame_message(MessageFormat::Rfc3164, b"<14>msg");
        assert_eq!(framed, b"<14>msg\n");
    }
}
