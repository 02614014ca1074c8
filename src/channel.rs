use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use serialport::{ClearBuffer, SerialPort};

use crate::error::{KioskError, Result};

/// One trimmed line received from the kiosk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command(String);

impl Command {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decodes a raw line, replacing invalid UTF-8 and trimming terminators
    pub fn from_bytes(raw: &[u8]) -> Self {
        Self(String::from_utf8_lossy(raw).trim().to_string())
    }
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        Self(s.trim().to_string())
    }
}

/// Byte stream the channel reads from
pub trait Transport {
    fn name(&self) -> &str;

    fn bytes_available(&mut self) -> io::Result<bool>;

    /// Reads through the next `\n`, or whatever arrived before the read timeout
    fn read_line(&mut self) -> io::Result<Vec<u8>>;

    /// Drops everything received but not yet read. Returns the byte count.
    fn discard_pending(&mut self) -> io::Result<usize>;

    fn close(&mut self);
}

/// Real serial port, opened once at startup
pub struct SerialTransport {
    name: String,
    port: Option<Box<dyn SerialPort>>,
    pending: Vec<u8>,
}

impl SerialTransport {
    pub fn open(name: &str, baud_rate: u32, read_timeout: Duration) -> Result<Self> {
        let port = serialport::new(name, baud_rate)
            .timeout(read_timeout)
            .open()
            .map_err(|source| KioskError::PortOpen {
                port: name.to_string(),
                source,
            })?;

        Ok(Self {
            name: name.to_string(),
            port: Some(port),
            pending: Vec::new(),
        })
    }

    fn port(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        self.port
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "port is closed"))
    }
}

impl Transport for SerialTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn bytes_available(&mut self) -> io::Result<bool> {
        if !self.pending.is_empty() {
            return Ok(true);
        }
        let waiting = self.port()?.bytes_to_read().map_err(io::Error::from)?;
        Ok(waiting > 0)
    }

    fn read_line(&mut self) -> io::Result<Vec<u8>> {
        loop {
            if let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
                let rest = self.pending.split_off(pos + 1);
                return Ok(std::mem::replace(&mut self.pending, rest));
            }

            let mut chunk = [0u8; 64];
            match self.port()?.read(&mut chunk) {
                Ok(0) => return Ok(std::mem::take(&mut self.pending)),
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                    return Ok(std::mem::take(&mut self.pending))
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn discard_pending(&mut self) -> io::Result<usize> {
        let buffered = self.pending.len();
        self.pending.clear();
        let port = self.port()?;
        let waiting = port.bytes_to_read().map_err(io::Error::from)? as usize;
        port.clear(ClearBuffer::Input).map_err(io::Error::from)?;
        Ok(buffered + waiting)
    }

    fn close(&mut self) {
        self.port = None;
    }
}

/// In-memory transport for tests and headless runs.
///
/// Each scripted line "arrives" on the next idle poll, so lines never pile up
/// while a session is running unless injected with [`ScriptedTransport::inject`].
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    arrivals: VecDeque<Vec<u8>>,
    buffer: VecDeque<u8>,
    fail_when_drained: bool,
    closed: Arc<AtomicBool>,
}

impl ScriptedTransport {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        Self {
            arrivals: lines.into_iter().map(|l| l.as_ref().to_vec()).collect(),
            ..Self::default()
        }
    }

    /// Bytes that are already waiting in the receive buffer
    pub fn inject(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Reports a broken link once the script is used up
    pub fn failing_when_drained(mut self) -> Self {
        self.fail_when_drained = true;
        self
    }

    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }
}

impl Transport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    fn bytes_available(&mut self) -> io::Result<bool> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "port is closed"));
        }
        if self.buffer.is_empty() {
            match self.arrivals.pop_front() {
                Some(line) => self.buffer.extend(line),
                None if self.fail_when_drained => {
                    return Err(io::Error::new(io::ErrorKind::BrokenPipe, "link lost"))
                }
                None => {}
            }
        }
        Ok(!self.buffer.is_empty())
    }

    fn read_line(&mut self) -> io::Result<Vec<u8>> {
        let mut line = Vec::new();
        while let Some(b) = self.buffer.pop_front() {
            line.push(b);
            if b == b'\n' {
                break;
            }
        }
        Ok(line)
    }

    fn discard_pending(&mut self) -> io::Result<usize> {
        let n = self.buffer.len();
        self.buffer.clear();
        Ok(n)
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Owns the transport for its whole lifetime and closes it exactly once,
/// on `close` or on drop.
pub struct CommandChannel<T: Transport> {
    transport: T,
    open: bool,
}

impl<T: Transport> CommandChannel<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            open: true,
        }
    }

    pub fn port_name(&self) -> &str {
        self.transport.name()
    }

    /// Never waits for data: returns `Ok(None)` when nothing has arrived.
    /// A returned command may be empty (blank line).
    pub fn try_read_command(&mut self) -> Result<Option<Command>> {
        if !self.transport.bytes_available()? {
            return Ok(None);
        }
        let raw = self.transport.read_line()?;
        Ok(Some(Command::from_bytes(&raw)))
    }

    /// Drops commands that arrived while nobody was listening
    pub fn discard_backlog(&mut self) -> Result<usize> {
        let dropped = self.transport.discard_pending()?;
        if dropped > 0 {
            warn!(
                "Discarded {} byte(s) received on {} during the test",
                dropped,
                self.transport.name()
            );
        }
        Ok(dropped)
    }

    pub fn close(&mut self) {
        if self.open {
            self.transport.close();
            self.open = false;
            info!("Connection on {} closed.", self.transport.name());
        }
    }
}

impl<T: Transport> Drop for CommandChannel<T> {
    fn drop(&mut self) {
        self.close();
    }
}
