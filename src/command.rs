//! Outgoing command frames.
//!
//! Every command is 7 bytes on the wire: the start marker, a one-byte opcode,
//! two payload bytes, and a big-endian 16-bit checksum over the preceding
//! five bytes. Unlike the data frame, the command checksum is carried and
//! summed in full, not truncated.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::frame::START_MARKER;

/// Size of an encoded command frame.
pub const COMMAND_SIZE: usize = 7;

/// Size of the acknowledgment frame the sensor sends after a mode change.
pub const ACK_SIZE: usize = 8;

/// Command opcodes understood by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Opcode {
    /// Switch between active reporting and passive polling.
    ChangeMode = 0xE1,
    /// Request a single data frame while in passive mode.
    RequestRead = 0xE2,
    /// Enter or leave low-power sleep.
    Power = 0xE4,
}

/// The five commands the sensor accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Sleep,
    Wake,
    SetPassive,
    SetActive,
    RequestRead,
}

impl Command {
    fn opcode(&self) -> Opcode {
        use Command::*;
        match *self {
            Sleep | Wake => Opcode::Power,
            SetPassive | SetActive => Opcode::ChangeMode,
            RequestRead => Opcode::RequestRead,
        }
    }

    // Second payload byte; the first is always zero.
    fn data(&self) -> u8 {
        use Command::*;
        match *self {
            Sleep | SetPassive | RequestRead => 0x00,
            Wake | SetActive => 0x01,
        }
    }

    /// Encode the command into its wire frame. Deterministic and infallible.
    pub fn encode(&self) -> [u8; COMMAND_SIZE] {
        let mut frame = [0u8; COMMAND_SIZE];
        frame[..2].copy_from_slice(&START_MARKER);
        frame[2] = self.opcode().into();
        frame[3] = 0x00;
        frame[4] = self.data();
        let checksum = frame[..5]
            .iter()
            .fold(0u16, |sum, &b| sum.wrapping_add(u16::from(b)));
        frame[5..].copy_from_slice(&checksum.to_be_bytes());
        frame
    }
}
