//! # Raw TCP Transport
//!
//! Most networked receipt printers accept raw ESC/POS on TCP port 9100.

use std::io::Write;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::Transport;
use crate::error::SlipcastError;

/// Default raw printing port
pub const DEFAULT_PORT: u16 = 9100;

/// Default connect/write timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Raw socket connection to a network printer.
pub struct TcpTransport {
    stream: TcpStream,
}

/// Resolve `host` or `host:port`, defaulting to port 9100.
pub fn resolve(addr: &str) -> Result<SocketAddr, SlipcastError> {
    let with_port = if addr.rsplit_once(':').is_some_and(|(_, p)| p.parse::<u16>().is_ok()) {
        addr.to_string()
    } else {
        format!("{}:{}", addr, DEFAULT_PORT)
    };
    with_port
        .to_socket_addrs()
        .map_err(|e| SlipcastError::Transport(format!("Cannot resolve {}: {}", addr, e)))?
        .next()
        .ok_or_else(|| SlipcastError::Transport(format!("No address for {}", addr)))
}

impl TcpTransport {
    /// Connect to `host` or `host:port`.
    pub fn connect(addr: &str, timeout: Duration) -> Result<Self, SlipcastError> {
        let socket = resolve(addr)?;
        let stream = TcpStream::connect_timeout(&socket, timeout)
            .map_err(|e| SlipcastError::Transport(format!("Failed to connect to {}: {}", socket, e)))?;
        stream
            .set_write_timeout(Some(timeout))
            .map_err(|e| SlipcastError::Transport(e.to_string()))?;
        log::debug!("connected to printer at {}", socket);
        Ok(Self { stream })
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, data: &[u8]) -> Result<(), SlipcastError> {
        self.stream
            .write_all(data)
            .and_then(|_| self.stream.flush())
            .map_err(|e| SlipcastError::Transport(format!("Write failed: {}", e)))
    }
}
