//! Board UART protocol
//!
//! Implements the single-byte command/response protocol spoken by the
//! PIC16F877A home automation boards.
//!
//! Every request is exactly one byte. GET commands (`0x01..=0x08`) elicit
//! exactly one reply byte; SET commands (`10xxxxxx` / `11xxxxxx`) elicit no
//! reply. The top two bits of each byte discriminate the command kind on the
//! wire.

pub mod codec;
pub mod commands;
mod error;
pub mod serial;
mod session;
mod stream;

pub use commands::{AirCommand, CurtainCommand};
pub use error::ProtocolError;
pub use session::{Session, SessionConfig, SessionState};
pub use stream::{Channel, SerialChannel};

use std::time::Duration;

/// Default baud rate for board communication
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Upper bound on the wait for a reply byte after a command is written
pub const EXCHANGE_TIMEOUT: Duration = Duration::from_millis(100);

/// Mandatory pause between the two writes of one logical set-operation.
/// The board firmware needs this spacing to latch the integral byte before
/// the fractional byte arrives.
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);
