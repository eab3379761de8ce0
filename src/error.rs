use std::io;
use thiserror::Error;

/// The primary error type for the `pms7003-rs` library.
#[derive(Error, Debug)]
pub enum Error {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("timed out waiting for data from the sensor")]
    Timeout,

    #[error("serial port is not open")]
    PortClosed,

    #[error("checksum mismatch: computed {computed:#04x}, frame carried {received:#04x}")]
    Checksum { computed: u8, received: u8 },

    #[error("invalid frame: {0}")]
    Frame(String),
}
