//! Air-conditioner board (board 1)
//!
//! Three fields: the desired temperature setpoint (writable, 10–50 °C), the
//! ambient room temperature, and the raw fan tachometer count.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use super::{BoardProfile, DeviceState, FieldSpec};
use crate::poller::Poller;
use crate::protocol::{codec, AirCommand, ProtocolError, Session};

/// Accepted setpoint domain in degrees Celsius
pub const DESIRED_TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 10.0..=50.0;

/// Default tachometer counts per revolution/s. A deployment-specific
/// calibration constant, not part of the wire protocol.
pub const DEFAULT_FAN_CALIBRATION: f64 = 13.2;

const DESIRED: usize = 0;
const AMBIENT: usize = 1;
const FAN: usize = 2;

static AIR_FIELDS: [FieldSpec; 3] = [
    FieldSpec {
        name: "desired_temperature",
        integral_cmd: AirCommand::GetDesiredIntegral.request_byte(),
        fractional_cmd: Some(AirCommand::GetDesiredFractional.request_byte()),
        decode: codec::decode_fixed_point,
        domain: Some(DESIRED_TEMPERATURE_RANGE),
    },
    FieldSpec {
        name: "ambient_temperature",
        integral_cmd: AirCommand::GetAmbientIntegral.request_byte(),
        fractional_cmd: Some(AirCommand::GetAmbientFractional.request_byte()),
        decode: codec::decode_fixed_point,
        domain: None,
    },
    FieldSpec {
        name: "fan_speed",
        integral_cmd: AirCommand::GetFanSpeed.request_byte(),
        fractional_cmd: None,
        decode: codec::decode_raw,
        domain: None,
    },
];

/// Snapshot of the air-conditioner board after one refresh cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AirReading {
    /// Temperature setpoint in °C
    pub desired_temperature: f64,
    /// Room temperature in °C
    pub ambient_temperature: f64,
    /// Raw fan tachometer count
    pub fan_speed: u8,
}

/// Descriptor table for the air-conditioner board
#[derive(Debug)]
pub struct AirBoard;

impl BoardProfile for AirBoard {
    type Snapshot = AirReading;

    fn fields() -> &'static [FieldSpec] {
        &AIR_FIELDS
    }

    fn assemble(slots: &[f64]) -> AirReading {
        AirReading {
            desired_temperature: slots[DESIRED],
            ambient_temperature: slots[AMBIENT],
            fan_speed: slots[FAN] as u8,
        }
    }
}

/// Host-side handle for the air-conditioner board
#[derive(Clone)]
pub struct AirConditioner {
    state: Arc<DeviceState<AirBoard>>,
    fan_calibration: f64,
}

impl AirConditioner {
    /// Create the handle over an existing session
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            state: Arc::new(DeviceState::new(session)),
            fan_calibration: DEFAULT_FAN_CALIBRATION,
        }
    }

    /// Override the fan tachometer calibration divisor for this deployment
    pub fn with_fan_calibration(mut self, counts_per_rps: f64) -> Self {
        self.fan_calibration = counts_per_rps;
        self
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
    pub fn subscribe(&self) -> watch::Receiver<AirReading> {
        self.state.subscribe()
    }

    /// Start a background poller refreshing this board at `interval`
    pub fn spawn_poller(&self, interval: Duration) -> Poller {
        Poller::spawn(Arc::clone(&self.state), interval)
    }

    /// Latest cached snapshot
    pub fn reading(&self) -> AirReading {
        self.state.snapshot()
    }

    /// Latest cached setpoint in °C
    pub fn desired_temperature(&self) -> f64 {
        self.reading().desired_temperature
    }

    /// Latest cached room temperature in °C
    pub fn ambient_temperature(&self) -> f64 {
        self.reading().ambient_temperature
    }

    /// Latest cached raw fan count
    pub fn fan_speed(&self) -> u8 {
        self.reading().fan_speed
    }

    /// Fan speed in revolutions per second, via the deployment calibration
    pub fn fan_speed_rps(&self) -> f64 {
        self.reading().fan_speed as f64 / self.fan_calibration
    }

    /// Command a new temperature setpoint.
    ///
    /// Values outside 10–50 °C fail with [`ProtocolError::OutOfRange`]
    /// before anything is written. The cached reading is confirmed by the
    /// next refresh cycle rather than updated optimistically.
    pub fn set_desired_temperature(&self, celsius: f64) -> Result<(), ProtocolError> {
        self.state.set_field(DESIRED, celsius)
    }
}

impl std::fmt::Debug for AirConditioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirConditioner")
            .field("fan_calibration", &self.fan_calibration)
            .finish()
    }
}
