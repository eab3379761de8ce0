//! Common test utilities and shared fixtures

use std::collections::VecDeque;

use pms7003_rs::error::Error;
use pms7003_rs::frame::{FRAME_SIZE, START_MARKER};
use pms7003_rs::transport::Transport;

/// Decode hex string to bytes for testing
#[allow(dead_code)]
pub fn hex_to_bytes(hex_data: &str) -> Vec<u8> {
    hex::decode(hex_data).expect("Failed to decode hex")
}

/// Build a valid 32-byte data frame carrying the given channel values.
///
/// The length field is fixed at 28 (payload plus checksum, as the sensor
/// reports it), the reserved field is zero, and the checksum is stored as a
/// full big-endian 16-bit sum, the way the device itself emits it.
#[allow(dead_code)]
pub fn build_frame(channels: [u16; 12]) -> [u8; FRAME_SIZE] {
    let mut frame = [0u8; FRAME_SIZE];
    frame[..2].copy_from_slice(&START_MARKER);
    frame[2..4].copy_from_slice(&28u16.to_be_bytes());
    for (i, value) in channels.iter().enumerate() {
        frame[4 + 2 * i..6 + 2 * i].copy_from_slice(&value.to_be_bytes());
    }
    let sum: u16 = frame[..30].iter().map(|&b| u16::from(b)).sum();
    frame[30..].copy_from_slice(&sum.to_be_bytes());
    frame
}

/// Install a fmt subscriber so `RUST_LOG` works in tests.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// In-memory transport double: reads pop from `rx`, writes land in `written`.
///
/// An exhausted `rx` behaves like a read that hit its timeout, which is what
/// a silent sensor looks like through the serial transport.
#[allow(dead_code)]
#[derive(Default)]
pub struct MockTransport {
    pub rx: VecDeque<u8>,
    pub written: Vec<u8>,
    pub open: bool,
    pub opens: usize,
}

impl MockTransport {
    #[allow(dead_code)]
    pub fn with_rx(bytes: &[u8]) -> Self {
        Self {
            rx: bytes.iter().copied().collect(),
            ..Default::default()
        }
    }

    #[allow(dead_code)]
    pub fn feed(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }
}

impl Transport for MockTransport {
    fn open(&mut self) -> Result<(), Error> {
        self.open = true;
        self.opens += 1;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        if !self.open {
            return Err(Error::PortClosed);
        }
        for slot in buf.iter_mut() {
            *slot = self.rx.pop_front().ok_or(Error::Timeout)?;
        }
        Ok(())
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<(), Error> {
        if !self.open {
            return Err(Error::PortClosed);
        }
        self.written.extend_from_slice(buf);
        Ok(())
    }
}
