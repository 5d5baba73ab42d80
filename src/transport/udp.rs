//! Connectionless syslog over UDP.

use std::{
    io,
    net::{SocketAddr, UdpSocket},
};

use parking_lot::{Mutex, RwLock, RwLockWriteGuard};

use crate::config::ResolvePolicy;

use super::{SendError, connection::resolve};

/// Sockets bound lazily per address family.
#[derive(Default)]
struct Sockets {
    v4: Option<UdpSocket>,
    v6: Option<UdpSocket>,
}

impl Sockets {
    fn for_addr(&self, addr: &SocketAddr) -> Option<&UdpSocket> {
        match addr {
            SocketAddr::V4(_) => self.v4.as_ref(),
            SocketAddr::V6(_) => self.v6.as_ref(),
        }
    }

    fn bind_for(&mut self, addr: &SocketAddr) -> io::Result<&UdpSocket> {
        let (slot, bind_addr) = match addr {
            SocketAddr::V4(_) => (&mut self.v4, "0.0.0.0:0"),
            SocketAddr::V6(_) => (&mut self.v6, "[::]:0"),
        };
        if slot.is_none() {
            *slot = Some(UdpSocket::bind(bind_addr)?);
        }
        slot.as_ref()
            .ok_or_else(|| io::Error::other("udp socket unavailable"))
    }
}

/// Sends one datagram per message. Loss is accepted silently.
pub struct UdpSender {
    host: String,
    port: u16,
    policy: ResolvePolicy,
    /// `None` once the sender is closed.
    sockets: RwLock<Option<Sockets>>,
    pub(super) cached: Mutex<Option<SocketAddr>>,
}

impl UdpSender {
    pub fn new(host: impl Into<String>, port: u16, policy: ResolvePolicy) -> Self {
        Self {
            host: host.into(),
            port,
            policy,
            sockets: RwLock::new(Some(Sockets::default())),
            cached: Mutex::new(None),
        }
    }

    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn resolve(&self) -> Result<SocketAddr, SendError> {
        if self.policy == ResolvePolicy::Cached
            && let Some(addr) = *self.cached.lock()
        {
            return Ok(addr);
        }
        let addr = resolve(&self.host, self.port)
            .map(|addrs| addrs[0])
            .map_err(|source| SendError::Unresolvable {
                target: self.target(),
                source,
            })?;
        if self.policy == ResolvePolicy::Cached {
            *self.cached.lock() = Some(addr);
        }
        Ok(addr)
    }

    fn forget_address(&self) {
        if self.policy == ResolvePolicy::Cached {
            self.cached.lock().take();
        }
    }

    /// Send `message` as a single datagram.
    pub fn send(&self, message: &[u8]) -> Result<(), SendError> {
        if self.sockets.read().is_none() {
            return Err(self.closed());
        }
        let addr = self.resolve()?;
        let result = {
            let guard = self.sockets.read();
            match guard.as_ref() {
                None => return Err(self.closed()),
                Some(sockets) => sockets
                    .for_addr(&addr)
                    .map(|socket| socket.send_to(message, addr)),
            }
        };
        let result = match result {
            Some(result) => result,
            None => self.bind_and_send(&addr, message)?,
        };
        result.map(drop).map_err(|source| {
            self.forget_address();
            SendError::WriteFailed {
                target: self.target(),
                source,
            }
        })
    }

    fn bind_and_send(
        &self,
        addr: &SocketAddr,
        message: &[u8],
    ) -> Result<io::Result<usize>, SendError> {
        let mut guard = self.sockets.write();
        let Some(sockets) = guard.as_mut() else {
            return Err(self.closed());
        };
        if let Err(source) = sockets.bind_for(addr) {
            return Err(SendError::WriteFailed {
                target: self.target(),
                source,
            });
        }
        let guard = RwLockWriteGuard::downgrade(guard);
        Ok(guard
            .as_ref()
            .and_then(|sockets| sockets.for_addr(addr))
            .map(|socket| socket.send_to(message, *addr))
            .unwrap_or_else(|| Err(io::Error::other("udp socket unavailable"))))
    }

    /// Release the sockets. Subsequent sends fail with [`SendError::Closed`].
    pub fn close(&self) {
        self.sockets.write().take();
    }

    pub fn is_closed(&self) -> bool {
        self.sockets.read().is_none()
    }

    fn closed(&self) -> SendError {
        SendError::Closed {
            target: self.target(),
        }
    }
}

impl std::fmt::Debug for UdpSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpSender")
            .field("target", &self.target())
            .field("policy", &self.policy)
            .field("closed", &self.is_closed())
            .finish()
    }
}
