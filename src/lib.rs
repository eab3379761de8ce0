//! Driver for the Plantower PMS7003 laser particle counter.
//!
//! The sensor speaks a fixed-length, checksummed binary frame protocol over
//! a 9600-baud serial link. [`Pms7003`] drives one sensor end to end:
//! synchronizing to frame boundaries, validating and decoding measurement
//! frames, and issuing the small command set (sleep, wake, active/passive
//! mode, request-read).

pub mod command;
pub mod device;
pub mod error;
pub mod frame;
pub mod transport;

// Re-export the session type for easy access
pub use device::{Mode, Pms7003};
pub use error::Error;
pub use frame::Measurement;
