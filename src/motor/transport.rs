// Byte transport to the motor controller
//
// The controller listens on a plain serial line and never answers, so the
// transport only needs an open/closed state and a write.

use serialport::{self, SerialPort};
use std::io::Write;
use std::time::Duration;
use tracing::debug;

/// Default serial configuration for the motor controller
pub const DEFAULT_BAUDRATE: u32 = 9600;
pub const DEFAULT_TIMEOUT_MS: u64 = 100;

/// Error types for transport writes
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// What happened to a frame handed to the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Sent,
    /// Transport was not open; nothing was written
    Skipped,
}

/// Byte-oriented channel to the motor controller
///
/// `write_frame` returns exactly once per call, including when the write is skipped.
pub trait Transport {
    fn is_open(&self) -> bool;

    fn write_frame(&mut self, bytes: &[u8]) -> Result<WriteOutcome>;
}

/// Serial line to the motor controller. `None` while the port is not open.
pub struct SerialTransport {
    port_name: String,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    /// Open a new connection to the motor controller
    pub fn open(port_name: &str, baudrate: u32) -> Result<Self> {
        let port = serialport::new(port_name, baudrate)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()?;

        Ok(Self {
            port_name: port_name.to_string(),
            port: Some(port),
        })
    }

    /// A transport that never opened; every write is skipped
    pub fn closed(port_name: &str) -> Self {
        Self {
            port_name: port_name.to_string(),
            port: None,
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl Transport for SerialTransport {
    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn write_frame(&mut self, bytes: &[u8]) -> Result<WriteOutcome> {
        let Some(port) = self.port.as_mut() else {
            return Ok(WriteOutcome::Skipped);
        };

        debug!("Write {:02X?} to {}", bytes, self.port_name);
        port.write_all(bytes)?;
        port.flush()?;
        Ok(WriteOutcome::Sent)
    }
}

/// In-memory transport recording every written frame.
/// Clones share the log, so frames stay visible after the transport is dropped.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct RecordingTransport {
    pub open: bool,
    pub fail_writes: bool,
    written: std::rc::Rc<std::cell::RefCell<Vec<Vec<u8>>>>,
}

#[cfg(test)]
impl RecordingTransport {
    pub fn open() -> Self {
        Self {
            open: true,
            ..Default::default()
        }
    }

    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.written.borrow().clone()
    }
}

#[cfg(test)]
impl Transport for RecordingTransport {
    fn is_open(&self) -> bool {
        self.open
    }

    fn write_frame(&mut self, bytes: &[u8]) -> Result<WriteOutcome> {
        if !self.open {
            return Ok(WriteOutcome::Skipped);
        }
        if self.fail_writes {
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "port unplugged",
            )));
        }
        self.written.borrow_mut().push(bytes.to_vec());
        Ok(WriteOutcome::Sent)
    }
}
