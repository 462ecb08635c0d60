//! Serial port handling
//!
//! Provides low-level serial port access for board communication.

use serialport::SerialPort;
use std::time::Duration;

use super::ProtocolError;

/// Open a serial port for board communication.
///
/// The read timeout only bounds individual `read` calls; reply deadlines are
/// enforced by the session's own polling loop.
pub fn open_port(
    name: &str,
    baud_rate: u32,
    read_timeout: Duration,
) -> Result<Box<dyn SerialPort>, ProtocolError> {
    serialport::new(name, baud_rate)
        .timeout(read_timeout)
        .open()
        .map_err(|e| ProtocolError::PortUnavailable(e.to_string()))
}

/// Configure a serial port for board communication
pub fn configure_port(port: &mut dyn SerialPort) -> Result<(), ProtocolError> {
    // Standard 8N1 configuration, no flow control
    port.set_data_bits(serialport::DataBits::Eight)
        .map_err(|e| ProtocolError::Serial(e.to_string()))?;
    port.set_parity(serialport::Parity::None)
        .map_err(|e| ProtocolError::Serial(e.to_string()))?;
    port.set_stop_bits(serialport::StopBits::One)
        .map_err(|e| ProtocolError::Serial(e.to_string()))?;
    port.set_flow_control(serialport::FlowControl::None)
        .map_err(|e| ProtocolError::Serial(e.to_string()))?;
    Ok(())
}

/// Clear the serial port buffers
pub fn clear_buffers(port: &mut dyn SerialPort) -> Result<(), ProtocolError> {
    port.clear(serialport::ClearBuffer::All)
        .map_err(|e| ProtocolError::Serial(e.to_string()))
}
