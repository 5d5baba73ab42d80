//! Stream socket primitives shared by the TCP and TLS transports.

use std::{
    io::{self, Write},
    net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs},
    time::Duration,
};

use native_tls::{Certificate, HandshakeError, TlsConnector, TlsStream};

use crate::config::TlsOptions;

/// Resolve `host:port` into candidate socket addresses.
pub fn resolve(host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
    if addrs.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no addresses found for {host}"),
        ));
    }
    Ok(addrs)
}

/// Connect to the first reachable address, bounding each attempt by `timeout`.
pub fn connect_tcp(addrs: &[SocketAddr], timeout: Duration) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(addr, timeout) {
            Ok(stream) => {
                stream.set_nonblocking(false)?;
                stream.set_nodelay(true)?;
                return Ok(stream);
            }
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no addresses")))
}

/// Prepared TLS client settings for one collector.
#[derive(Clone)]
pub struct TlsSession {
    connector: TlsConnector,
    domain: String,
}

impl TlsSession {
    /// Build a connector trusting the platform roots plus any extra roots.
    pub fn new(options: &TlsOptions, server_hostname: &str) -> io::Result<Self> {
        let mut builder = TlsConnector::builder();
        for pem in &options.root_certificates {
            let cert = Certificate::from_pem(pem).map_err(io::Error::other)?;
            builder.add_root_certificate(cert);
        }
        let connector = builder.build().map_err(io::Error::other)?;
        let domain = options
            .domain
            .clone()
            .unwrap_or_else(|| server_hostname.to_owned());
        Ok(Self { connector, domain })
    }

    /// Perform the client handshake, bounding every read and write by
    /// `timeout`. The read timeout is cleared once the session is up.
    pub fn handshake(
        &self,
        stream: TcpStream,
        timeout: Duration,
    ) -> Result<TlsStream<TcpStream>, String> {
        stream
            .set_read_timeout(Some(timeout))
            .and_then(|()| stream.set_write_timeout(Some(timeout)))
            .map_err(|err| err.to_string())?;
        let stream = self
            .connector
            .connect(&self.domain, stream)
            .map_err(|err| match err {
                HandshakeError::Failure(err) => err.to_string(),
                HandshakeError::WouldBlock(_) => "handshake timed out".to_owned(),
            })?;
        stream
            .get_ref()
            .set_read_timeout(None)
            .map_err(|err| err.to_string())?;
        Ok(stream)
    }
}

impl std::fmt::Debug for TlsSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsSession")
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

/// Established stream connection to the collector.
pub enum ActiveConnection {
    PlainTcp(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl ActiveConnection {
    fn tcp(&self) -> &TcpStream {
        match self {
            ActiveConnection::PlainTcp(stream) => stream,
            ActiveConnection::Tls(stream) => stream.get_ref(),
        }
    }

    /// Update the write timeout for the underlying socket.
    pub fn set_write_timeout(&self, timeout: Duration) -> io::Result<()> {
        self.tcp().set_write_timeout(Some(timeout))
    }

    /// Clone the raw socket so it can be shut down from another thread.
    pub fn shutdown_handle(&self) -> io::Result<TcpStream> {
        self.tcp().try_clone()
    }

    /// Write a full frame and flush it to the socket.
    pub fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        match self {
            ActiveConnection::PlainTcp(stream) => {
                stream.write_all(frame)?;
                stream.flush()
            }
            ActiveConnection::Tls(stream) => {
                stream.write_all(frame)?;
                stream.flush()
            }
        }
    }

    /// Close the connection, sending a TLS close_notify where applicable.
    pub fn shutdown(self) {
        match self {
            ActiveConnection::PlainTcp(stream) => {
                let _ = stream.shutdown(Shutdown::Both);
            }
            ActiveConnection::Tls(mut stream) => {
                let _ = stream.shutdown();
                let _ = stream.get_ref().shutdown(Shutdown::Both);
            }
        }
    }
}
