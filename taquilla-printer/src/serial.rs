//! Serial transport
//!
//! Godex printers speak 8-N-1 over RS-232 or USB-serial bridges. A single
//! STX byte doubles as the liveness probe and the status poll trigger; the
//! reply is logged as a raw hex dump, its bits are not interpreted.

use std::io::{Read, Write};
use std::time::Duration;

use serialport::SerialPort;
use tracing::{debug, info, warn};

use crate::error::{PrintError, PrintResult};

/// EPL status-request byte (STX)
pub const STATUS_REQUEST: u8 = 0x02;

/// Response cap for liveness probes and standalone status polls
pub const STATUS_READ_CAP: usize = 100;

/// Response cap for the status poll that follows a send
pub const SEND_STATUS_READ_CAP: usize = 32;

/// An open serial connection to the printer.
///
/// Held by the manager until disconnect; the port closes on drop.
pub struct SerialChannel {
    port: Box<dyn SerialPort>,
    path: String,
}

impl SerialChannel {
    /// Open `path` at the given baud rate with 8 data bits, no parity,
    /// one stop bit and the given read timeout.
    pub fn open(path: &str, baud: u32, timeout: Duration) -> PrintResult<Self> {
        let port = serialport::new(path, baud)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .timeout(timeout)
            .open()
            .map_err(|e| PrintError::Connection(format!("{}: {}", path, e)))?;

        Ok(Self {
            port,
            path: path.to_string(),
        })
    }

    /// The port path this channel was opened on
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Write the full payload and flush.
    pub fn send(&mut self, data: &[u8]) -> PrintResult<()> {
        self.port
            .write_all(data)
            .map_err(|e| PrintError::Transmission(format!("{}: {}", self.path, e)))?;
        self.port
            .flush()
            .map_err(|e| PrintError::Transmission(format!("{}: {}", self.path, e)))?;
        Ok(())
    }

    /// Send the status-request byte and read back up to `cap` bytes.
    ///
    /// Returns `None` when the printer stays silent or the port errors.
    pub fn poll_status(&mut self, settle: Duration, cap: usize) -> Option<Vec<u8>> {
        request_status(&mut self.port, settle, cap)
    }
}

/// Send STX over any byte channel, wait out the settle delay and read the
/// reply. Any error counts as "no reply".
pub(crate) fn request_status<C>(channel: &mut C, settle: Duration, cap: usize) -> Option<Vec<u8>>
where
    C: Read + Write + ?Sized,
{
    if let Err(e) = channel.write_all(&[STATUS_REQUEST]) {
        debug!(error = %e, "Status request write failed");
        return None;
    }
    let _ = channel.flush();

    std::thread::sleep(settle);

    let mut buf = vec![0u8; cap];
    match channel.read(&mut buf) {
        Ok(n) if n > 0 => {
            buf.truncate(n);
            Some(buf)
        }
        Ok(_) => None,
        Err(e) => {
            debug!(error = %e, "Status read failed");
            None
        }
    }
}

/// Liveness probe: open the port transiently, send STX and see whether
/// anything at all comes back. Open/write/read errors are swallowed.
pub fn probe(path: &str, baud: u32, timeout: Duration, settle: Duration) -> bool {
    let mut channel = match SerialChannel::open(path, baud, timeout) {
        Ok(c) => c,
        Err(e) => {
            warn!(port = path, error = %e, "Probe open failed");
            return false;
        }
    };

    match request_status(&mut channel.port, settle, STATUS_READ_CAP) {
        Some(reply) => {
            info!(port = path, reply = %hex::encode(&reply), "Printer responded to probe");
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Byte channel with a scripted reply
    struct FakeChannel {
        reply: Vec<u8>,
        written: Vec<u8>,
    }

    impl FakeChannel {
        fn with_reply(reply: &[u8]) -> Self {
            Self {
                reply: reply.to_vec(),
                written: Vec::new(),
            }
        }
    }

    impl Read for FakeChannel {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.reply.is_empty() {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "no reply"));
            }
            let n = self.reply.len().min(buf.len());
            buf[..n].copy_from_slice(&self.reply[..n]);
            self.reply.drain(..n);
            Ok(n)
        }
    }

    impl Write for FakeChannel {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn silent_channel_reads_as_dead() {
        let mut channel = FakeChannel::with_reply(&[]);
        let reply = request_status(&mut channel, Duration::ZERO, STATUS_READ_CAP);
        assert!(reply.is_none());
        assert_eq!(channel.written, vec![STATUS_REQUEST]);
    }

    #[test]
    fn any_reply_reads_as_alive() {
        let mut channel = FakeChannel::with_reply(&[0x40]);
        let reply = request_status(&mut channel, Duration::ZERO, STATUS_READ_CAP);
        assert_eq!(reply, Some(vec![0x40]));
    }

    #[test]
    fn reply_is_capped() {
        let mut channel = FakeChannel::with_reply(&[0xAA; 200]);
        let reply = request_status(&mut channel, Duration::ZERO, STATUS_READ_CAP).unwrap();
        assert_eq!(reply.len(), STATUS_READ_CAP);
    }
}
