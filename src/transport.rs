//! Byte-stream transport the sensor session drives.

use std::io;
use std::time::Duration;

use serialport::SerialPort;
use tracing::debug;

use crate::error::Error;

/// Blocking byte-stream transport.
///
/// The session opens and closes the transport around every operation; a
/// transport stays usable across open/close cycles.
pub trait Transport {
    fn open(&mut self) -> Result<(), Error>;
    fn close(&mut self);
    fn is_open(&self) -> bool;
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error>;
    fn write_all(&mut self, buf: &[u8]) -> Result<(), Error>;
}

/// Transport over a serial port, 8N1.
pub struct SerialTransport {
    path: String,
    baud_rate: u32,
    timeout: Duration,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    pub fn new(path: impl Into<String>, baud_rate: u32, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            baud_rate,
            timeout,
            port: None,
        }
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>, Error> {
        self.port.as_mut().ok_or(Error::PortClosed)
    }
}

impl Transport for SerialTransport {
    fn open(&mut self) -> Result<(), Error> {
        if self.port.is_none() {
            debug!(path = %self.path, baud = self.baud_rate, "opening serial port");
            let port = serialport::new(&self.path, self.baud_rate)
                .data_bits(serialport::DataBits::Eight)
                .stop_bits(serialport::StopBits::One)
                .parity(serialport::Parity::None)
                .timeout(self.timeout)
                .open()?;
            self.port = Some(port);
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            debug!(path = %self.path, "closed serial port");
        }
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        self.port()?.read_exact(buf).map_err(|e| match e.kind() {
            io::ErrorKind::TimedOut => Error::Timeout,
            _ => Error::Io(e),
        })
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<(), Error> {
        let port = self.port()?;
        port.write_all(buf)?;
        port.flush()?;
        Ok(())
    }
}
