//! # Device File Transport
//!
//! Writes to a printer device node. Serial devices are switched to raw mode
//! first so binary raster data passes through unmodified.
//!
//! ## Chunked Writes
//!
//! Large buffers are written in chunks with a short pause between them, so
//! slow serial links do not overrun the printer's receive buffer.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::Duration;

use super::Transport;
use crate::error::SlipcastError;

/// Default chunk size for writes (bytes)
const CHUNK_SIZE: usize = 4096;

/// Delay between chunks (milliseconds)
const CHUNK_DELAY_MS: u64 = 2;

/// # Device Transport
///
/// ```no_run
/// use slipcast::transport::{DeviceTransport, Transport};
///
/// let mut printer = DeviceTransport::open("/dev/usb/lp0")?;
/// printer.send(&[0x1B, 0x64, 3])?;
/// # Ok::<(), slipcast::SlipcastError>(())
/// ```
pub struct DeviceTransport {
    file: File,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl DeviceTransport {
    /// Open a printer device (or any writable file).
    pub fn open<P: AsRef<Path>>(device: P) -> Result<Self, SlipcastError> {
        let path = device.as_ref();

        let file = OpenOptions::new()
            .write(true)
            .create(!path.starts_with("/dev"))
            .truncate(!path.starts_with("/dev"))
            .open(path)
            .map_err(|e| {
                SlipcastError::Transport(format!("Failed to open {}: {}", path.display(), e))
            })?;

        #[cfg(unix)]
        configure_tty_raw(&file)?;

        Ok(Self {
            file,
            chunk_size: CHUNK_SIZE,
            chunk_delay: Duration::from_millis(CHUNK_DELAY_MS),
        })
    }

    /// Set the chunk size for large writes. Default is 4096 bytes.
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size.max(1);
    }

    /// Set the delay between chunks. Default is 2ms.
    pub fn set_chunk_delay(&mut self, delay: Duration) {
        self.chunk_delay = delay;
    }
}

impl Transport for DeviceTransport {
    fn send(&mut self, data: &[u8]) -> Result<(), SlipcastError> {
        if data.len() <= self.chunk_size {
            self.file
                .write_all(data)
                .map_err(|e| SlipcastError::Transport(format!("Write failed: {}", e)))?;
        } else {
            for chunk in data.chunks(self.chunk_size) {
                self.file
                    .write_all(chunk)
                    .map_err(|e| SlipcastError::Transport(format!("Write failed: {}", e)))?;

                if !self.chunk_delay.is_zero() {
                    thread::sleep(self.chunk_delay);
                }
            }
        }

        self.file
            .flush()
            .map_err(|e| SlipcastError::Transport(format!("Flush failed: {}", e)))?;

        log::debug!("wrote {} bytes to device", data.len());
        Ok(())
    }
}

/// Switch a serial line to raw 8-bit mode so raster bytes are not rewritten
/// (no `\n` to `\r\n` output mapping, no XON/XOFF). Other files are left alone.
#[cfg(unix)]
fn configure_tty_raw(file: &File) -> Result<(), SlipcastError> {
    use std::io;
    use std::mem::MaybeUninit;
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();
    if unsafe { libc::isatty(fd) } != 1 {
        return Ok(());
    }

    let mut termios = MaybeUninit::<libc::termios>::uninit();
    if unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) } != 0 {
        return Err(SlipcastError::Transport(format!(
            "Cannot read serial settings: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };
    unsafe { libc::cfmakeraw(&mut termios) };

    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) } != 0 {
        return Err(SlipcastError::Transport(format!(
            "Cannot set raw serial mode: {}",
            io::Error::last_os_error()
        )));
    }
    log::debug!("serial device switched to raw mode");
    Ok(())
}
