//! Protocol errors

use thiserror::Error;

/// Errors that can occur during board communication
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("serial port unavailable: {0}")]
    PortUnavailable(String),

    #[error("session already open")]
    AlreadyConnected,

    #[error("not connected to a board")]
    NotConnected,

    #[error("no response from board")]
    Timeout,

    #[error("value {value} outside allowed range {min}..={max}")]
    OutOfRange { value: f64, min: f64, max: f64 },

    #[error("field '{0}' is read-only")]
    ReadOnlyField(&'static str),

    #[error("{failed} of {attempted} fields failed to refresh")]
    PartialRefresh { failed: usize, attempted: usize },

    #[error("serial port error: {0}")]
    Serial(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// True when the board gave no reply within the exchange timeout.
    ///
    /// A timed-out exchange is a distinct outcome, never to be confused with
    /// a legitimate zero-valued reading.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProtocolError::Timeout)
    }
}
