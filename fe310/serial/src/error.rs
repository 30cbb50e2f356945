//! Serial driver errors.

use thiserror::Error;

/// Configuration rejected by [`SerialDriver::start`](crate::SerialDriver::start).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialError {
    #[error("baud rate must be non-zero")]
    InvalidBaudRate,
    #[error("baud rate {baud} unreachable from a {clock_hz} Hz core clock")]
    DivisorOutOfRange { baud: u32, clock_hz: u32 },
}
