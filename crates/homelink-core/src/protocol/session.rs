//! Session management
//!
//! Owns the single physical half-duplex channel to a board and serializes
//! all access to it. The wire protocol has no addressing or multiplexing, so
//! interleaving the bytes of two commands corrupts both; every wire touch
//! goes through the session mutex.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

use super::serial::{clear_buffers, configure_port, open_port};
use super::stream::{Channel, SerialChannel};
use super::{ProtocolError, DEFAULT_BAUD_RATE, EXCHANGE_TIMEOUT, SETTLE_DELAY};

/// Interval between reply-availability checks while an exchange is pending
const READ_POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Not connected
    Disconnected,
    /// Connected and ready
    Connected,
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Serial port name
    pub port_name: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Upper bound on the wait for a reply byte
    pub exchange_timeout: Duration,
    /// Pause between the two writes of one set-operation
    pub settle_delay: Duration,
}

impl SessionConfig {
    /// Configuration for a named port at the given baud rate, with default
    /// exchange timing.
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
            ..Self::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            port_name: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            exchange_timeout: EXCHANGE_TIMEOUT,
            settle_delay: SETTLE_DELAY,
        }
    }
}

/// A connection to one board over one serial endpoint.
///
/// The channel mutex lives for the whole session lifetime, so access is
/// guarded even before the first `open`. Only one exchange can be in flight
/// at a time; a caller arriving mid-exchange blocks until the write+read in
/// progress completes, then proceeds in its own turn.
pub struct Session {
    config: SessionConfig,
    channel: Mutex<Option<Box<dyn Channel>>>,
    running: AtomicBool,
}

impl Session {
    /// Create a session (not yet connected)
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            channel: Mutex::new(None),
            running: AtomicBool::new(false),
        }
    }

    /// Session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn lock_channel(&self) -> MutexGuard<'_, Option<Box<dyn Channel>>> {
        // A poisoned lock only means another thread panicked mid-exchange;
        // the Option state itself stays coherent.
        self.channel.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Open the configured serial port and transition to Connected.
    ///
    /// Fails with [`ProtocolError::PortUnavailable`] when no port is
    /// configured or the OS open fails, and [`ProtocolError::AlreadyConnected`]
    /// when the session is already open. Stale buffered bytes are discarded
    /// on success.
    pub fn open(&self) -> Result<(), ProtocolError> {
        if self.config.port_name.is_empty() {
            return Err(ProtocolError::PortUnavailable(
                "no port configured".to_string(),
            ));
        }

        let mut guard = self.lock_channel();
        if guard.is_some() {
            return Err(ProtocolError::AlreadyConnected);
        }

        let mut port = open_port(
            &self.config.port_name,
            self.config.baud_rate,
            self.config.exchange_timeout,
        )?;
        configure_port(port.as_mut())?;
        clear_buffers(port.as_mut())?;

        *guard = Some(Box::new(SerialChannel::new(port)));
        self.running.store(true, Ordering::SeqCst);
        info!(
            port = %self.config.port_name,
            baud = self.config.baud_rate,
            "session opened"
        );
        Ok(())
    }

    /// Attach a pre-opened channel instead of opening the configured port.
    ///
    /// Used for alternate transports and for tests driving the session
    /// through a scripted channel.
    pub fn attach(&self, channel: Box<dyn Channel>) -> Result<(), ProtocolError> {
        let mut guard = self.lock_channel();
        if guard.is_some() {
            return Err(ProtocolError::AlreadyConnected);
        }
        *guard = Some(channel);
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Close the session. Idempotent.
    ///
    /// The running flag drops before the channel handle is released, so
    /// loops watching [`Session::is_running`] observe the stop request no
    /// later than their next cycle boundary.
    pub fn close(&self) -> Result<(), ProtocolError> {
        self.running.store(false, Ordering::SeqCst);
        let mut guard = self.lock_channel();
        if guard.take().is_some() {
            info!(port = %self.config.port_name, "session closed");
        }
        Ok(())
    }

    /// Whether a channel is currently held
    pub fn is_connected(&self) -> bool {
        self.lock_channel().is_some()
    }

    /// Whether the session has been opened and not yet asked to stop.
    ///
    /// Lock-free, so a polling loop can check it at cycle boundaries without
    /// contending with an in-flight exchange.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        if self.is_connected() {
            SessionState::Connected
        } else {
            SessionState::Disconnected
        }
    }

    /// Write one command byte and wait for its one reply byte.
    ///
    /// Holds the channel for the full write+read round trip. Times out with
    /// [`ProtocolError::Timeout`] after the configured bound; a timeout is a
    /// distinct outcome, never reported as a zero reading. Exchanges are
    /// never retried automatically.
    pub fn exchange(&self, command: u8) -> Result<u8, ProtocolError> {
        let mut guard = self.lock_channel();
        let channel = guard.as_mut().ok_or(ProtocolError::NotConnected)?;

        channel.clear_input_buffer()?;
        channel.write_all(&[command])?;
        channel.flush()?;
        trace!("command sent: {command:#04x}");

        let reply = Self::read_reply(channel.as_mut(), self.config.exchange_timeout);
        match &reply {
            Ok(byte) => trace!("reply received: {byte:#04x}"),
            Err(_) => debug!(
                "no reply to {command:#04x} within {}ms",
                self.config.exchange_timeout.as_millis()
            ),
        }
        reply
    }

    /// Write the two bytes of one logical set-operation.
    ///
    /// The channel is held across both writes and the settle delay between
    /// them, so no other command can land between the halves of the value.
    /// SET commands elicit no reply.
    pub fn send_set_pair(&self, integral: u8, fractional: u8) -> Result<(), ProtocolError> {
        let mut guard = self.lock_channel();
        let channel = guard.as_mut().ok_or(ProtocolError::NotConnected)?;

        channel.write_all(&[integral])?;
        channel.flush()?;
        trace!("set integral sent: {integral:#04x}");

        std::thread::sleep(self.config.settle_delay);

        channel.write_all(&[fractional])?;
        channel.flush()?;
        trace!("set fractional sent: {fractional:#04x}");
        Ok(())
    }

    /// Poll for exactly one reply byte, bounded by `timeout`.
    fn read_reply(channel: &mut dyn Channel, timeout: Duration) -> Result<u8, ProtocolError> {
        let start = Instant::now();
        loop {
            let available = channel.bytes_to_read()?;
            if available > 0 {
                let mut buf = [0u8; 1];
                match channel.read(&mut buf) {
                    Ok(0) => {}
                    Ok(_) => return Ok(buf[0]),
                    Err(ref e)
                        if e.kind() == std::io::ErrorKind::TimedOut
                            || e.kind() == std::io::ErrorKind::WouldBlock => {}
                    Err(e) => return Err(e.into()),
                }
            }
            if start.elapsed() >= timeout {
                return Err(ProtocolError::Timeout);
            }
            std::thread::sleep(READ_POLL_INTERVAL);
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish()
    }
}
