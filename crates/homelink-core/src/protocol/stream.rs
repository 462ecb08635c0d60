use serialport::SerialPort;
use std::io::{self, Read, Write};

/// Abstraction over the byte channel a session talks through.
///
/// The production implementation wraps a serial port; tests substitute a
/// scripted in-memory channel.
pub trait Channel: Read + Write + Send {
    /// Discard any buffered inbound bytes
    fn clear_input_buffer(&mut self) -> io::Result<()>;

    /// Discard any buffered outbound bytes
    fn clear_output_buffer(&mut self) -> io::Result<()>;

    /// Get number of bytes available to read
    fn bytes_to_read(&mut self) -> io::Result<u32>;
}

/// Serial port wrapper implementing [`Channel`]
pub struct SerialChannel {
    port: Box<dyn SerialPort>,
}

impl SerialChannel {
    /// Wrap an already-opened serial port
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }
}

impl Read for SerialChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl Channel for SerialChannel {
    fn clear_input_buffer(&mut self) -> io::Result<()> {
        self.port
            .clear(serialport::ClearBuffer::Input)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }

    fn clear_output_buffer(&mut self) -> io::Result<()> {
        self.port
            .clear(serialport::ClearBuffer::Output)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }

    fn bytes_to_read(&mut self) -> io::Result<u32> {
        self.port
            .bytes_to_read()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }
}
