//! Board state models
//!
//! Each board variant is described by an ordered table of field descriptors
//! rather than a subclass hierarchy: one generic [`DeviceState`] drives the
//! refresh cycle and the set path for any board, and thin typed wrappers
//! ([`air::AirConditioner`], [`curtain::Curtain`]) expose named accessors
//! over the resulting snapshot.

pub mod air;
pub mod curtain;

use std::marker::PhantomData;
use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::warn;

use crate::protocol::{codec, ProtocolError, Session};

/// One readable field of a board: which GET commands fetch it, how to decode
/// the reply bytes, and (for writable fields) the accepted value domain.
#[derive(Debug)]
pub struct FieldSpec {
    /// Field name, used in logs
    pub name: &'static str,
    /// GET command for the integral byte (or the whole raw scalar)
    pub integral_cmd: u8,
    /// GET command for the fractional byte; `None` for raw one-byte fields
    pub fractional_cmd: Option<u8>,
    /// Decode the fetched bytes into the field value
    pub decode: fn(u8, u8) -> f64,
    /// Accepted domain for set-operations; `None` marks a read-only field
    pub domain: Option<RangeInclusive<f64>>,
}

/// Static description of one board variant
pub trait BoardProfile: Send + Sync + 'static {
    /// Typed snapshot assembled from the decoded field slots
    type Snapshot: Clone + Default + Send + Sync + 'static;

    /// Ordered field descriptors, polled in table order each refresh cycle
    fn fields() -> &'static [FieldSpec];

    /// Build a snapshot from the slot values, one slot per field in table
    /// order
    fn assemble(slots: &[f64]) -> Self::Snapshot;
}

/// Cached state of one board, refreshed over a shared [`Session`].
///
/// Fields refresh sequentially, not atomically: a reader inspecting
/// individual slots mid-cycle can observe a mix of old and new values. That
/// weak consistency is an accepted trade-off of the one-byte protocol.
pub struct DeviceState<B: BoardProfile> {
    session: Arc<Session>,
    slots: Mutex<Vec<f64>>,
    updates: watch::Sender<B::Snapshot>,
    _board: PhantomData<B>,
}

impl<B: BoardProfile> DeviceState<B> {
    /// Create the state for one board, with all fields zeroed
    pub fn new(session: Arc<Session>) -> Self {
        let (updates, _) = watch::channel(B::Snapshot::default());
        Self {
            session,
            slots: Mutex::new(vec![0.0; B::fields().len()]),
            updates,
            _board: PhantomData,
        }
    }

    /// The session this board talks through
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Receiver for per-cycle snapshot notifications.
    ///
    /// One value is published per completed refresh cycle, never per field,
    /// from whatever context ran the cycle. The receiving side drains it on
    /// its own schedule.
    pub fn subscribe(&self) -> watch::Receiver<B::Snapshot> {
        self.updates.subscribe()
    }

    /// Assemble a snapshot from the current slot values
    pub fn snapshot(&self) -> B::Snapshot {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        B::assemble(&slots)
    }

    /// Run one full refresh cycle: fetch and decode every field, then
    /// publish a snapshot.
    ///
    /// A no-op while the session is disconnected (no notification). A
    /// timeout on one field does not abort the others; whichever fields
    /// succeed are applied, and the cycle still ends in exactly one
    /// notification. Returns [`ProtocolError::PartialRefresh`] when any
    /// field failed.
    pub fn refresh(&self) -> Result<(), ProtocolError> {
        if !self.session.is_connected() {
            return Ok(());
        }

        let fields = B::fields();
        let mut failed = 0usize;
        for (idx, field) in fields.iter().enumerate() {
            match self.read_field(field) {
                Ok(value) => {
                    let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
                    slots[idx] = value;
                }
                Err(e) => {
                    failed += 1;
                    warn!(field = field.name, error = %e, "field refresh failed");
                }
            }
        }

        self.updates.send_replace(self.snapshot());

        if failed > 0 {
            Err(ProtocolError::PartialRefresh {
                failed,
                attempted: fields.len(),
            })
        } else {
            Ok(())
        }
    }

    fn read_field(&self, field: &FieldSpec) -> Result<f64, ProtocolError> {
        let integral = self.session.exchange(field.integral_cmd)?;
        let fractional = match field.fractional_cmd {
            Some(cmd) => self.session.exchange(cmd)?,
            None => 0,
        };
        Ok((field.decode)(integral, fractional))
    }

    /// Write a new value for the field at `index` in the descriptor table.
    ///
    /// Validates against the field's declared domain before anything touches
    /// the wire; an out-of-range value fails without any traffic. The cached
    /// slot is not updated optimistically; the next refresh cycle is the
    /// authoritative confirmation of what the board accepted.
    pub fn set_field(&self, index: usize, value: f64) -> Result<(), ProtocolError> {
        let field = &B::fields()[index];
        let domain = field
            .domain
            .as_ref()
            .ok_or(ProtocolError::ReadOnlyField(field.name))?;
        if !domain.contains(&value) {
            return Err(ProtocolError::OutOfRange {
                value,
                min: *domain.start(),
                max: *domain.end(),
            });
        }

        let (integral, fractional) = codec::split_fixed(value);
        self.session.send_set_pair(
            codec::encode_set_integral(integral),
            codec::encode_set_fractional(fractional),
        )
    }
}

impl<B: BoardProfile> std::fmt::Debug for DeviceState<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceState")
            .field("fields", &B::fields().len())
            .finish()
    }
}
