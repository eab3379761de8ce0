//! The sensor session: mode state and end-to-end operations.

use std::time::{Duration, Instant};

use bytes::BytesMut;
use tracing::{debug, info, trace, warn};

use crate::command::{ACK_SIZE, Command};
use crate::error::Error;
use crate::frame::{self, FRAME_SIZE, Measurement, START_MARKER};
use crate::transport::{SerialTransport, Transport};

/// Serial link speed mandated by the sensor.
pub const BAUD_RATE: u32 = 9600;

// Default deadline for synchronization and reads.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Reporting mode of the sensor.
///
/// In `Active` mode the sensor pushes frames continuously; in `Passive` mode
/// a frame is emitted only after an explicit read request. Sensors power up
/// active, and so does a fresh session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Active,
    Passive,
}

/// A PMS7003 sensor attached to a byte-stream transport.
///
/// The session owns the transport exclusively and assumes sequential access;
/// every public operation opens the transport, runs to completion, and closes
/// it again, so the port is never held across calls.
pub struct Pms7003<T = SerialTransport> {
    transport: T,
    mode: Mode,
    timeout: Duration,
}

impl Pms7003<SerialTransport> {
    /// Create a session for the sensor attached at `path`.
    ///
    /// The port itself is opened lazily, per operation.
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_timeout(path, DEFAULT_TIMEOUT)
    }

    /// Like [`Pms7003::new`], with an explicit deadline for synchronization
    /// and reads. A silent sensor fails the current operation with
    /// [`Error::Timeout`] instead of blocking forever.
    pub fn with_timeout(path: impl Into<String>, timeout: Duration) -> Self {
        let transport = SerialTransport::new(path, BAUD_RATE, timeout);
        Self {
            transport,
            mode: Mode::default(),
            timeout,
        }
    }
}

impl<T: Transport> Pms7003<T> {
    /// Drive the session over a custom transport.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            mode: Mode::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Current reporting mode as tracked by the session.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Access the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Read one validated measurement.
    ///
    /// In passive mode a read request is sent first. The stream is then
    /// scanned for the start marker, the rest of the frame is read, and the
    /// frame is checksum-validated and decoded. A checksum mismatch surfaces
    /// as [`Error::Checksum`]; no retry is performed here.
    pub fn read(&mut self) -> Result<Measurement, Error> {
        let buf = self.with_open_port(|dev| dev.read_frame())?;
        let measurement = frame::decode(&buf)?;
        debug!(%measurement, "decoded measurement");
        Ok(measurement)
    }

    /// Put the sensor into low-power sleep. Not acknowledged by the sensor.
    pub fn sleep(&mut self) -> Result<(), Error> {
        info!("putting sensor to sleep");
        self.with_open_port(|dev| dev.send_command(Command::Sleep))
    }

    /// Wake the sensor from sleep. Not acknowledged by the sensor.
    pub fn wake(&mut self) -> Result<(), Error> {
        info!("waking sensor");
        self.with_open_port(|dev| dev.send_command(Command::Wake))
    }

    /// Switch between active and passive reporting.
    ///
    /// Returns the raw 8-byte acknowledgment drained from the sensor. The
    /// ack content is not validated against an expected pattern; it is
    /// handed back to the caller and logged instead of being discarded.
    pub fn set_mode(&mut self, mode: Mode) -> Result<[u8; ACK_SIZE], Error> {
        let ack = self.with_open_port(|dev| {
            dev.mode = mode;
            dev.send_command(match mode {
                Mode::Active => Command::SetActive,
                Mode::Passive => Command::SetPassive,
            })?;
            // Drain the ack so it cannot poison the next synchronization.
            let mut ack = [0u8; ACK_SIZE];
            dev.transport.read_exact(&mut ack)?;
            Ok(ack)
        })?;
        debug!(?mode, ?ack, "reporting mode set");
        Ok(ack)
    }

    // Opens the transport, runs `op`, and closes again on every exit path.
    fn with_open_port<R>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<R, Error>,
    ) -> Result<R, Error> {
        self.transport.open()?;
        let result = op(self);
        self.transport.close();
        result
    }

    fn read_frame(&mut self) -> Result<[u8; FRAME_SIZE], Error> {
        if self.mode == Mode::Passive {
            self.send_command(Command::RequestRead)?;
        }
        self.synchronize()?;
        let mut buf = [0u8; FRAME_SIZE];
        buf[..START_MARKER.len()].copy_from_slice(&START_MARKER);
        self.transport.read_exact(&mut buf[START_MARKER.len()..])?;
        trace!(frame = ?buf, "received frame");
        Ok(buf)
    }

    // Scans the byte stream for the start marker, discarding everything
    // before it. Bounded by the session deadline; each call starts fresh.
    fn synchronize(&mut self) -> Result<(), Error> {
        let deadline = Instant::now() + self.timeout;
        let mut scanned = BytesMut::with_capacity(FRAME_SIZE);
        let mut byte = [0u8; 1];
        loop {
            if Instant::now() > deadline {
                warn!(scanned = scanned.len(), "no start marker before deadline");
                return Err(Error::Timeout);
            }
            self.transport.read_exact(&mut byte)?;
            scanned.extend_from_slice(&byte);
            if scanned.ends_with(&START_MARKER) {
                trace!(
                    discarded = scanned.len() - START_MARKER.len(),
                    "synchronized to start marker"
                );
                return Ok(());
            }
        }
    }

    fn send_command(&mut self, command: Command) -> Result<(), Error> {
        let frame = command.encode();
        trace!(?command, frame = ?frame, "sending command");
        self.transport.write_all(&frame)
    }
}
