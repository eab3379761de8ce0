//! PMS7003 data frame layout and decoding.
//!
//! The sensor emits fixed-length 32-byte frames at 9600 baud:
//!
//! | Offset | Size | Field                                         |
//! |--------|------|-----------------------------------------------|
//! | 0      | 2    | Start marker `0x42 0x4D`                      |
//! | 2      | 2    | Frame length (big-endian, not validated)      |
//! | 4      | 24   | Twelve big-endian u16 measurement channels    |
//! | 28     | 2    | Reserved                                      |
//! | 30     | 2    | Checksum (big-endian sum of bytes 0..=29)     |
//!
//! The checksum field is nominally 16 bits wide, but validation compares the
//! low byte only (offset 31); the high byte at offset 30 is ignored. Real
//! payloads may rely on this, so the behavior is kept rather than fixed.

use std::fmt;

use strum_macros::Display;
use zerocopy::byteorder::big_endian::U16;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Two-byte marker that begins every data frame and command.
pub const START_MARKER: [u8; 2] = [0x42, 0x4D];

/// Size of a complete data frame, marker and checksum included.
pub const FRAME_SIZE: usize = 32;

/// Number of measurement channels carried by one frame.
pub const CHANNEL_COUNT: usize = 12;

// The checksum covers everything before the checksum field itself.
const CHECKSUM_COVERAGE: usize = 30;

/// Raw wire view of one 32-byte data frame.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct RawFrame {
    pub start: [u8; 2],
    pub frame_length: U16,
    pub channels: [U16; CHANNEL_COUNT],
    pub reserved: U16,
    pub checksum: U16,
}

/// Sum of the covered bytes, truncated to the low 8 bits.
pub fn checksum(buf: &[u8; FRAME_SIZE]) -> u8 {
    buf[..CHECKSUM_COVERAGE]
        .iter()
        .fold(0u16, |sum, &b| sum.wrapping_add(u16::from(b))) as u8
}

/// Validate and decode a synchronized 32-byte frame.
///
/// The frame is rejected in its entirety on a checksum mismatch; no partial
/// record is ever produced.
pub fn decode(buf: &[u8; FRAME_SIZE]) -> Result<Measurement, Error> {
    let computed = checksum(buf);
    let received = buf[FRAME_SIZE - 1];
    if computed != received {
        return Err(Error::Checksum { computed, received });
    }

    let raw = RawFrame::ref_from_bytes(buf)
        .map_err(|_| Error::Frame("buffer does not fit the frame layout".to_string()))?;
    Ok(Measurement::from(raw))
}

/// One measurement channel, identified by its fixed position in the frame.
///
/// The first six channels report particle mass, in two calibration bases:
/// CF=1 (factory) and atmospheric environment. The last six report particle
/// counts per size bin. Two display labels legitimately repeat across the
/// calibration bases; the variants stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Channel {
    #[strum(to_string = "PM1 CF1")]
    Pm1Cf1,
    #[strum(to_string = "PM2.5 CF1")]
    Pm2_5Cf1,
    #[strum(to_string = "PM10 CF1")]
    Pm10Cf1,
    #[strum(to_string = "PM1")]
    Pm1,
    #[strum(to_string = "PM2.5")]
    Pm2_5,
    #[strum(to_string = "PM10")]
    Pm10,
    /// Particles larger than 0.3 µm.
    #[strum(to_string = "PM0.3")]
    Particles0_3,
    #[strum(to_string = "PM0.5")]
    Particles0_5,
    #[strum(to_string = "PM1.0")]
    Particles1_0,
    #[strum(to_string = "PM2.5")]
    Particles2_5,
    #[strum(to_string = "PM5.0")]
    Particles5_0,
    #[strum(to_string = "PM10")]
    Particles10,
}

impl Channel {
    /// Channels in wire order. Positional, not inferred from the payload.
    pub const ALL: [Channel; CHANNEL_COUNT] = [
        Channel::Pm1Cf1,
        Channel::Pm2_5Cf1,
        Channel::Pm10Cf1,
        Channel::Pm1,
        Channel::Pm2_5,
        Channel::Pm10,
        Channel::Particles0_3,
        Channel::Particles0_5,
        Channel::Particles1_0,
        Channel::Particles2_5,
        Channel::Particles5_0,
        Channel::Particles10,
    ];

    pub fn unit(&self) -> Unit {
        use Channel::*;
        match self {
            Pm1Cf1 | Pm2_5Cf1 | Pm10Cf1 | Pm1 | Pm2_5 | Pm10 => Unit::MicrogramsPerCubicMeter,
            _ => Unit::ParticlesPerDeciliter,
        }
    }
}

/// Unit of a channel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Unit {
    #[strum(to_string = "µg/m³")]
    MicrogramsPerCubicMeter,
    #[strum(to_string = "particles per 0.1 L")]
    ParticlesPerDeciliter,
}

/// A single labeled reading out of a decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    pub channel: Channel,
    pub value: u16,
}

impl Reading {
    pub fn unit(&self) -> Unit {
        self.channel.unit()
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.channel, self.value, self.unit())
    }
}

/// One validated sensor measurement: twelve readings in fixed wire order.
///
/// The reserved and checksum fields are dropped during decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Measurement {
    readings: [Reading; CHANNEL_COUNT],
}

impl Measurement {
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    /// Value reported for `channel`.
    ///
    /// Every channel appears exactly once, at its wire position.
    pub fn value(&self, channel: Channel) -> u16 {
        self.readings
            .iter()
            .find(|r| r.channel == channel)
            .map_or(0, |r| r.value)
    }
}

impl From<&RawFrame> for Measurement {
    fn from(raw: &RawFrame) -> Self {
        let readings = core::array::from_fn(|i| Reading {
            channel: Channel::ALL[i],
            value: raw.channels[i].get(),
        });
        Measurement { readings }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, reading) in self.readings.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", reading)?;
        }
        Ok(())
    }
}
