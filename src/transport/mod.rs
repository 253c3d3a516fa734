//! # Printer Transport Layer
//!
//! Delivery of a finished command buffer. The pipeline ends at a byte buffer;
//! these helpers only move that buffer to a printer.
//!
//! ## Available Transports
//!
//! - [`device`]: Printer device nodes (USB `/dev/usb/lp0`, serial `/dev/ttyUSB0`)
//! - [`network`]: Raw TCP printing (port 9100)
//!
//! Neither transport retries. Failures come back as
//! [`SlipcastError::Transport`](crate::error::SlipcastError::Transport).

pub mod device;
pub mod network;

pub use device::DeviceTransport;
pub use network::TcpTransport;

use crate::error::SlipcastError;

/// Something that accepts printer bytes.
pub trait Transport {
    fn send(&mut self, data: &[u8]) -> Result<(), SlipcastError>;
}

/// Write a command buffer to a printer device node or spool file.
pub fn write_device(path: impl AsRef<std::path::Path>, data: &[u8]) -> Result<(), SlipcastError> {
    DeviceTransport::open(path)?.send(data)
}

/// Send a command buffer over a raw TCP socket (`host` or `host:port`).
pub fn send_tcp(addr: &str, data: &[u8], timeout: std::time::Duration) -> Result<(), SlipcastError> {
    TcpTransport::connect(addr, timeout)?.send(data)
}
