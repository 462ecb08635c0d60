//! GET command tables
//!
//! Each board answers a fixed set of single-purpose GET commands in the
//! `0x01..=0x08` range. The assignments differ per board; both boards share
//! the SET encoding from [`super::codec`].

use serde::{Deserialize, Serialize};

/// GET commands understood by the air-conditioner board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AirCommand {
    /// Desired temperature, fractional digit
    GetDesiredFractional,
    /// Desired temperature, integral part
    GetDesiredIntegral,
    /// Ambient temperature, fractional digit
    GetAmbientFractional,
    /// Ambient temperature, integral part
    GetAmbientIntegral,
    /// Fan speed, raw tachometer count
    GetFanSpeed,
}

impl AirCommand {
    /// Wire byte for this command
    pub const fn request_byte(self) -> u8 {
        match self {
            AirCommand::GetDesiredFractional => 0x01,
            AirCommand::GetDesiredIntegral => 0x02,
            AirCommand::GetAmbientFractional => 0x03,
            AirCommand::GetAmbientIntegral => 0x04,
            AirCommand::GetFanSpeed => 0x05,
        }
    }
}

/// GET commands understood by the curtain-control board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurtainCommand {
    /// Curtain status, fractional digit
    GetCurtainFractional,
    /// Curtain status, integral part
    GetCurtainIntegral,
    /// Outdoor temperature, fractional digit
    GetTemperatureFractional,
    /// Outdoor temperature, integral part
    GetTemperatureIntegral,
    /// Outdoor pressure, fractional digit
    GetPressureFractional,
    /// Outdoor pressure, low byte of the integral register
    GetPressureIntegral,
    /// Light intensity, fractional digit
    GetLightFractional,
    /// Light intensity, integral part
    GetLightIntegral,
}

impl CurtainCommand {
    /// Wire byte for this command
    pub const fn request_byte(self) -> u8 {
        match self {
            CurtainCommand::GetCurtainFractional => 0x01,
            CurtainCommand::GetCurtainIntegral => 0x02,
            CurtainCommand::GetTemperatureFractional => 0x03,
            CurtainCommand::GetTemperatureIntegral => 0x04,
            CurtainCommand::GetPressureFractional => 0x05,
            CurtainCommand::GetPressureIntegral => 0x06,
            CurtainCommand::GetLightFractional => 0x07,
            CurtainCommand::GetLightIntegral => 0x08,
        }
    }
}
