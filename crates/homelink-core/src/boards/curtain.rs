//! Curtain-control board (board 2)
//!
//! Four fields: the curtain position (writable, 0–100 %), outdoor
//! temperature, outdoor pressure, and light intensity.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use super::{BoardProfile, DeviceState, FieldSpec};
use crate::poller::Poller;
use crate::protocol::{codec, CurtainCommand, ProtocolError, Session};

/// Accepted curtain position domain in percent
pub const CURTAIN_STATUS_RANGE: std::ops::RangeInclusive<f64> = 0.0..=100.0;

/// Offset added to the pressure integral byte.
///
/// The board stores pressure in a 16-bit register but the protocol only
/// exposes its low byte; the true high byte is never available to the host.
/// Adding 768 recenters readings into the ~1000 hPa band typical at sea
/// level. An approximation, kept deliberately.
pub const PRESSURE_LOW_BYTE_OFFSET: f64 = 768.0;

const CURTAIN: usize = 0;
const TEMPERATURE: usize = 1;
const PRESSURE: usize = 2;
const LIGHT: usize = 3;

fn decode_pressure(integral: u8, fractional: u8) -> f64 {
    (integral as f64 + PRESSURE_LOW_BYTE_OFFSET) + fractional as f64 / 10.0
}

static CURTAIN_FIELDS: [FieldSpec; 4] = [
    FieldSpec {
        name: "curtain_status",
        integral_cmd: CurtainCommand::GetCurtainIntegral.request_byte(),
        fractional_cmd: Some(CurtainCommand::GetCurtainFractional.request_byte()),
        decode: codec::decode_fixed_point,
        domain: Some(CURTAIN_STATUS_RANGE),
    },
    FieldSpec {
        name: "outdoor_temperature",
        integral_cmd: CurtainCommand::GetTemperatureIntegral.request_byte(),
        fractional_cmd: Some(CurtainCommand::GetTemperatureFractional.request_byte()),
        decode: codec::decode_fixed_point,
        domain: None,
    },
    FieldSpec {
        name: "outdoor_pressure",
        integral_cmd: CurtainCommand::GetPressureIntegral.request_byte(),
        fractional_cmd: Some(CurtainCommand::GetPressureFractional.request_byte()),
        decode: decode_pressure,
        domain: None,
    },
    FieldSpec {
        name: "light_intensity",
        integral_cmd: CurtainCommand::GetLightIntegral.request_byte(),
        fractional_cmd: Some(CurtainCommand::GetLightFractional.request_byte()),
        decode: codec::decode_fixed_point,
        domain: None,
    },
];

/// Snapshot of the curtain board after one refresh cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CurtainReading {
    /// Curtain position in percent (0 = closed, 100 = open)
    pub curtain_status: f64,
    /// Outdoor temperature in °C
    pub outdoor_temperature: f64,
    /// Outdoor pressure in hPa (approximate; see
    /// [`PRESSURE_LOW_BYTE_OFFSET`])
    pub outdoor_pressure: f64,
    /// Light intensity in lux
    pub light_intensity: f64,
}

/// Descriptor table for the curtain board
#[derive(Debug)]
pub struct CurtainBoard;

impl BoardProfile for CurtainBoard {
    type Snapshot = CurtainReading;

    fn fields() -> &'static [FieldSpec] {
        &CURTAIN_FIELDS
    }

    fn assemble(slots: &[f64]) -> CurtainReading {
        CurtainReading {
            curtain_status: slots[CURTAIN],
            outdoor_temperature: slots[TEMPERATURE],
            outdoor_pressure: slots[PRESSURE],
            light_intensity: slots[LIGHT],
        }
    }
}

/// Host-side handle for the curtain board
#[derive(Clone)]
pub struct Curtain {
    state: Arc<DeviceState<CurtainBoard>>,
}

impl Curtain {
    /// Create the handle over an existing session
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            state: Arc::new(DeviceState::new(session)),
        }
    }

    /// The session this board talks through
    pub fn session(&self) -> &Arc<Session> {
        self.state.session()
    }

    /// Run one refresh cycle; see [`DeviceState::refresh`]
    pub fn refresh(&self) -> Result<(), ProtocolError> {
        self.state.refresh()
    }

    /// Receiver for per-cycle snapshot notifications
    pub fn subscribe(&self) -> watch::Receiver<CurtainReading> {
        self.state.subscribe()
    }

    /// Start a background poller refreshing this board at `interval`
    pub fn spawn_poller(&self, interval: Duration) -> Poller {
        Poller::spawn(Arc::clone(&self.state), interval)
    }

    /// Latest cached snapshot
    pub fn reading(&self) -> CurtainReading {
        self.state.snapshot()
    }

    /// Latest cached curtain position in percent
    pub fn curtain_status(&self) -> f64 {
        self.reading().curtain_status
    }

    /// Latest cached outdoor temperature in °C
    pub fn outdoor_temperature(&self) -> f64 {
        self.reading().outdoor_temperature
    }

    /// Latest cached outdoor pressure in hPa (approximate)
    pub fn outdoor_pressure(&self) -> f64 {
        self.reading().outdoor_pressure
    }

    /// Latest cached light intensity in lux
    pub fn light_intensity(&self) -> f64 {
        self.reading().light_intensity
    }

    /// Command a new curtain position.
    ///
    /// Values outside 0–100 % fail with [`ProtocolError::OutOfRange`] before
    /// anything is written. The cached reading is confirmed by the next
    /// refresh cycle rather than updated optimistically.
    pub fn set_curtain_status(&self, percent: f64) -> Result<(), ProtocolError> {
        self.state.set_field(CURTAIN, percent)
    }
}

impl std::fmt::Debug for Curtain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Curtain").finish()
    }
}
