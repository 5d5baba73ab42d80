//! Persistent TCP and TCP+TLS syslog connections.
//!
//! Connection state lives behind the sender's private mutex. A send makes at
//! most one connection attempt and never sleeps: after a failed attempt the
//! state records when the next attempt is allowed, and sends arriving before
//! then fail fast.

use std::{
    mem,
    net::{Shutdown, TcpStream},
    sync::atomic::{AtomicBool, Ordering},
    time::Instant,
};

use parking_lot::Mutex;

use crate::{
    config::{BackoffPolicy, StreamTimeouts},
    formatter::MessageFormat,
};

use super::{
    SendError,
    backoff::BackoffState,
    connection::{ActiveConnection, TlsSession, connect_tcp, resolve},
    framing::frame_message,
};

/// Observable connection state of a stream sender.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connected,
    Failed { error: String, retry_after: Instant },
    Closed,
}

enum ConnectionState {
    Disconnected,
    Connected(ActiveConnection),
    Failed { error: String, retry_after: Instant },
    Closed,
}

struct StreamState {
    connection: ConnectionState,
    backoff: BackoffState,
}

/// Sender maintaining a single outbound stream connection.
pub struct StreamSender {
    host: String,
    port: u16,
    format: MessageFormat,
    tls: Option<TlsSession>,
    timeouts: StreamTimeouts,
    state: Mutex<StreamState>,
    /// Clone of the live socket so `close` can interrupt an in-flight write.
    shutdown_handle: Mutex<Option<TcpStream>>,
    closed: AtomicBool,
}

impl StreamSender {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        format: MessageFormat,
        tls: Option<TlsSession>,
        timeouts: StreamTimeouts,
        backoff: BackoffPolicy,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            format,
            tls,
            timeouts,
            state: Mutex::new(StreamState {
                connection: ConnectionState::Disconnected,
                backoff: BackoffState::new(backoff),
            }),
            shutdown_handle: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn status(&self) -> ConnectionStatus {
        match &self.state.lock().connection {
            ConnectionState::Disconnected => ConnectionStatus::Disconnected,
            ConnectionState::Connected(_) => ConnectionStatus::Connected,
            ConnectionState::Failed { error, retry_after } => ConnectionStatus::Failed {
                error: error.clone(),
                retry_after: *retry_after,
            },
            ConnectionState::Closed => ConnectionStatus::Closed,
        }
    }

    fn connect(&self) -> Result<ActiveConnection, SendError> {
        let addrs = resolve(&self.host, self.port).map_err(|source| SendError::Unresolvable {
            target: self.target(),
            source,
        })?;
        let stream =
            connect_tcp(&addrs, self.timeouts.connect).map_err(|err| SendError::ConnectFailed {
                target: self.target(),
                reason: err.to_string(),
            })?;
        let connection = match &self.tls {
            None => ActiveConnection::PlainTcp(stream),
            Some(tls) => {
                let stream = tls.handshake(stream, self.timeouts.connect).map_err(|reason| {
                    SendError::TlsHandshakeFailed {
                        target: self.target(),
                        reason,
                    }
                })?;
                ActiveConnection::Tls(Box::new(stream))
            }
        };
        connection
            .set_write_timeout(self.timeouts.write)
            .map_err(|err| SendError::ConnectFailed {
                target: self.target(),
                reason: err.to_string(),
            })?;
        Ok(connection)
    }

    /// Frame and write `message`, reconnecting at most once.
    pub fn send(&self, message: &[u8]) -> Result<(), SendError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(self.closed_error());
        }
        let frame = frame_message(self.format, message);
        let mut state = self.state.lock();
        let now = Instant::now();

        match &state.connection {
            ConnectionState::Closed => return Err(self.closed_error()),
            ConnectionState::Failed { error, retry_after } if now < *retry_after => {
                return Err(SendError::ConnectFailed {
                    target: self.target(),
                    reason: format!(
                        "{error}; next attempt in {}ms",
                        retry_after.duration_since(now).as_millis()
                    ),
                });
            }
            _ => {}
        }

        if !matches!(state.connection, ConnectionState::Connected(_)) {
            match self.connect() {
                Ok(connection) => {
                    log::debug!("connected to syslog server {}", self.target());
                    *self.shutdown_handle.lock() = connection.shutdown_handle().ok();
                    state.connection = ConnectionState::Connected(connection);
                }
                Err(err) => {
                    let delay = state.backoff.next_delay(now);
                    state.connection = ConnectionState::Failed {
                        error: err.to_string(),
                        retry_after: now + delay,
                    };
                    return Err(err);
                }
            }
        }

        let ConnectionState::Connected(connection) = &mut state.connection else {
            return Err(self.closed_error());
        };
        match connection.write_frame(&frame) {
            Ok(()) => {
                state.backoff.record_success(now);
                Ok(())
            }
            Err(source) => {
                if let ConnectionState::Connected(connection) =
                    mem::replace(&mut state.connection, ConnectionState::Disconnected)
                {
                    connection.shutdown();
                }
                self.shutdown_handle.lock().take();
                if self.closed.load(Ordering::Acquire) {
                    state.connection = ConnectionState::Closed;
                }
                Err(SendError::WriteFailed {
                    target: self.target(),
                    source,
                })
            }
        }
    }

    /// Close the connection. Idempotent; an in-flight write is interrupted
    /// and later sends fail with [`SendError::Closed`].
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(socket) = self.shutdown_handle.lock().take() {
            let _ = socket.shutdown(Shutdown::Both);
        }
        let mut state = self.state.lock();
        if let ConnectionState::Connected(connection) =
            mem::replace(&mut state.connection, ConnectionState::Closed)
        {
            connection.shutdown();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn closed_error(&self) -> SendError {
        SendError::Closed {
            target: self.target(),
        }
    }
}

impl std::fmt::Debug for StreamSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSender")
            .field("target", &self.target())
            .field("format", &self.format)
            .field("tls", &self.tls)
            .field("closed", &self.is_closed())
            .finish()
    }
}
