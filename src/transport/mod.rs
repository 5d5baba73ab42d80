//! Network transports delivering rendered syslog messages.
//!
//! [`TransportSender`] is a closed set of variants, one per
//! [`Transport`](crate::config::Transport). UDP is connectionless; TCP and
//! TCP+TLS share [`StreamSender`], which owns one persistent connection and
//! frames each message for the stream.

mod backoff;
mod connection;
mod framing;
mod stream;
mod udp;


use std::io;

use thiserror::Error;

use crate::config::{ConfigError, SyslogConfig, Transport};

pub use connection::TlsSession;
pub use framing::frame_message;
pub use stream::{ConnectionStatus, StreamSender};
pub use udp::UdpSender;

/// Failure to deliver a single message.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("cannot resolve syslog server {target}: {source}")]
    Unresolvable {
        target: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot connect to syslog server {target}: {reason}")]
    ConnectFailed { target: String, reason: String },
    #[error("failed to write to syslog server {target}: {source}")]
    WriteFailed {
        target: String,
        #[source]
        source: io::Error,
    },
    #[error("TLS handshake with syslog server {target} failed: {reason}")]
    TlsHandshakeFailed { target: String, reason: String },
    #[error("syslog sender for {target} is closed")]
    Closed { target: String },
}

/// Field-less discriminant of [`SendError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SendErrorKind {
    Unresolvable,
    ConnectFailed,
    WriteFailed,
    TlsHandshakeFailed,
    Closed,
}

impl SendError {
    pub fn kind(&self) -> SendErrorKind {
        match self {
            SendError::Unresolvable { .. } => SendErrorKind::Unresolvable,
            SendError::ConnectFailed { .. } => SendErrorKind::ConnectFailed,
            SendError::WriteFailed { .. } => SendErrorKind::WriteFailed,
            SendError::TlsHandshakeFailed { .. } => SendErrorKind::TlsHandshakeFailed,
            SendError::Closed { .. } => SendErrorKind::Closed,
        }
    }
}

/// Sender for the configured transport.
#[derive(Debug)]
pub enum TransportSender {
    Udp(UdpSender),
    Tcp(StreamSender),
    TcpTls(StreamSender),
}

impl TransportSender {
    /// Prepare a sender for `config`. No connection is opened until the
    /// first send.
    pub fn from_config(config: &SyslogConfig) -> Result<Self, ConfigError> {
        let host = config.server_hostname().ok_or(ConfigError::MissingHostname)?;
        let port = config.server_port();
        let stream = |tls: Option<TlsSession>| {
            StreamSender::new(
                host,
                port,
                config.format(),
                tls,
                config.timeouts(),
                config.backoff(),
            )
        };
        let sender = match config.transport() {
            Transport::Udp => {
                TransportSender::Udp(UdpSender::new(host, port, config.resolve_policy()))
            }
            Transport::Tcp => TransportSender::Tcp(stream(None)),
            Transport::TcpTls => {
                let tls = TlsSession::new(config.tls(), host)?;
                TransportSender::TcpTls(stream(Some(tls)))
            }
        };
        Ok(sender)
    }

    /// Deliver one rendered message.
    pub fn send(&self, message: &[u8]) -> Result<(), SendError> {
        match self {
            TransportSender::Udp(sender) => sender.send(message),
            TransportSender::Tcp(sender) | TransportSender::TcpTls(sender) => sender.send(message),
        }
    }

    /// Release the socket. Later sends fail with [`SendError::Closed`].
    pub fn close(&self) {
        match self {
            TransportSender::Udp(sender) => sender.close(),
            TransportSender::Tcp(sender) | TransportSender::TcpTls(sender) => sender.close(),
        }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            TransportSender::Udp(sender) => sender.is_closed(),
            TransportSender::Tcp(sender) | TransportSender::TcpTls(sender) => sender.is_closed(),
        }
    }

    pub fn transport(&self) -> Transport {
        match self {
            TransportSender::Udp(_) => Transport::Udp,
            TransportSender::Tcp(_) => Transport::Tcp,
            TransportSender::TcpTls(_) => Transport::TcpTls,
        }
    }

    pub fn target(&self) -> String {
        match self {
            TransportSender::Udp(sender) => sender.target(),
            TransportSender::Tcp(sender) | TransportSender::TcpTls(sender) => sender.target(),
        }
    }

    /// Connection state for stream transports; `None` for UDP.
    pub fn connection_status(&self) -> Option<ConnectionStatus> {
        match self {
            TransportSender::Udp(_) => None,
            TransportSender::Tcp(sender) | TransportSender::TcpTls(sender) => Some(sender.status()),
        }
    }
}

impl Drop for TransportSender {
    fn drop(&mut self) {
        self.close();
    }
}
