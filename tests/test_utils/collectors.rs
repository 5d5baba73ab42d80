//! Loopback syslog collectors for integration tests.
//!
//! Each collector binds an ephemeral port on 127.0.0.1 so tests can run in
//! parallel without coordinating port numbers.

#![allow(dead_code)]

use std::{
    io::{BufRead, BufReader},
    net::{TcpListener, UdpSocket},
    sync::mpsc,
    thread,
    time::Duration,
};

use femtosyslog::MessageFormat;

pub const RECV_TIMEOUT: Duration = Duration::from_secs(2);
pub const QUIET_PERIOD: Duration = Duration::from_millis(200);

/// Datagram collector.
pub struct UdpCollector {
    socket: UdpSocket,
}

impl UdpCollector {
    pub fn bind() -> Self {
        let socket = UdpSocket::bind(("127.0.0.1", 0)).expect("bind udp collector");
        Self { socket }
    }

    pub fn port(&self) -> u16 {
        self.socket.local_addr().expect("collector address").port()
    }

    /// Wait for the next datagram.
    pub fn recv(&self) -> String {
        self.socket
            .set_read_timeout(Some(RECV_TIMEOUT))
            .expect("set read timeout");
        let mut buf = [0u8; 4096];
        let (len, _) = self.socket.recv_from(&mut buf).expect("datagram received");
        String::from_utf8(buf[..len].to_vec()).expect("utf-8 datagram")
    }

    /// Collect every datagram that arrives before the socket goes quiet.
    pub fn drain(&self) -> Vec<String> {
        self.socket
            .set_read_timeout(Some(QUIET_PERIOD))
            .expect("set read timeout");
        let mut buf = [0u8; 4096];
        let mut received = Vec::new();
        while let Ok((len, _)) = self.socket.recv_from(&mut buf) {
            received.push(String::from_utf8_lossy(&buf[..len]).into_owned());
        }
        received
    }
}

/// Stream collector accepting a single connection and decoding frames
/// according to the message format in use.
pub struct TcpCollector {
    port: u16,
    frames: mpsc::Receiver<String>,
}

impl TcpCollector {
    pub fn spawn(format: MessageFormat) -> Self {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind tcp collector");
        let port = listener.local_addr().expect("listener address").port();
        let (tx, frames) = mpsc::channel();
        thread::spawn(move || {
            let Ok((stream, _)) = listener.accept() else {
                return;
            };
            let mut reader = BufReader::new(stream);
            while let Some(frame) = read_frame(&mut reader, format) {
                if tx.send(frame).is_err() {
                    break;
                }
            }
        });
        Self { port, frames }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn recv(&self) -> String {
        self.frames.recv_timeout(RECV_TIMEOUT).expect("frame received")
    }
}

fn read_frame(reader: &mut impl BufRead, format: MessageFormat) -> Option<String> {
    match format {
        MessageFormat::Rfc3164 => {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) | Err(_) => None,
                Ok(_) => Some(line.trim_end_matches('\n').to_owned()),
            }
        }
        MessageFormat::Rfc5424 => {
            let mut len = Vec::new();
            match reader.read_until(b' ', &mut len) {
                Ok(0) | Err(_) => return None,
                Ok(_) => {}
            }
            let len: usize = std::str::from_utf8(len.strip_suffix(b" ")?)
                .ok()?
                .parse()
                .ok()?;
            let mut payload = vec![0u8; len];
            reader.read_exact(&mut payload).ok()?;
            String::from_utf8(payload).ok()
        }
    }
}
