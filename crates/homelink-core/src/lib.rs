//! # HomeLink Core Library
//!
//! Core functionality for the HomeLink home automation host software.
//!
//! This library provides:
//! - Binary command encoding/decoding for the board UART protocol
//! - Serial session management with single-in-flight exchange discipline
//! - Board state models for the air-conditioner and curtain boards
//! - Background polling with snapshot notifications
//!
//! ## Supported boards
//!
//! - Air conditioner controller (PIC16F877A, board 1)
//! - Automatic curtain controller (PIC16F877A, board 2)
//!
//! ## Example
//!
//! ```rust,ignore
//! use homelink_core::prelude::*;
//! use std::sync::Arc;
//!
//! let session = Arc::new(Session::new(SessionConfig::new("/dev/ttyUSB0", 9600)));
//! session.open()?;
//!
//! let ac = AirConditioner::new(Arc::clone(&session));
//! let mut updates = ac.subscribe();
//! let poller = ac.spawn_poller(std::time::Duration::from_secs(1));
//!
//! updates.changed().await?;
//! println!("ambient: {:.1} C", updates.borrow().ambient_temperature);
//! ```

#![warn(missing_docs)]

pub mod boards;
pub mod poller;
pub mod protocol;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::boards::air::{AirConditioner, AirReading};
    pub use crate::boards::curtain::{Curtain, CurtainReading};
    pub use crate::boards::{BoardProfile, DeviceState, FieldSpec};
    pub use crate::poller::Poller;
    pub use crate::protocol::{ProtocolError, Session, SessionConfig, SessionState};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
