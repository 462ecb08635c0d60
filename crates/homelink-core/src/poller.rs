//! Background polling
//!
//! Drives periodic refresh cycles against a board while its session stays
//! open. Runs on the tokio runtime, independent of whichever context issues
//! manual set-commands; the blocking wire work of each cycle happens on the
//! blocking pool.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::boards::{BoardProfile, DeviceState};

/// Default pause between refresh cycles
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to a background refresh task.
///
/// The task stops when its token is cancelled or when the session is asked
/// to stop, checked once per cycle boundary. After a stop request the task
/// may still sit inside an in-flight exchange for up to the exchange
/// timeout; callers tolerate that bounded grace period rather than assuming
/// immediate cessation.
pub struct Poller {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Poller {
    /// Spawn a poller refreshing `device` every `interval`.
    ///
    /// The session should already be open; a poller spawned against a
    /// stopped session exits at its first cycle boundary.
    pub fn spawn<B: BoardProfile>(device: Arc<DeviceState<B>>, interval: Duration) -> Poller {
        let token = CancellationToken::new();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                if !device.session().is_running() {
                    break;
                }

                let cycle_device = Arc::clone(&device);
                match tokio::task::spawn_blocking(move || cycle_device.refresh()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(error = %e, "poll cycle incomplete"),
                    Err(e) => {
                        warn!(error = %e, "poll cycle panicked");
                        break;
                    }
                }
            }
            debug!("poller stopped");
        });

        Poller { token, handle }
    }

    /// Request a stop at the next cycle boundary without waiting for it
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Whether the background task has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel and wait for the task to exit.
    ///
    /// Bounded by one exchange timeout plus one settle delay in the worst
    /// case (a cycle caught mid-exchange).
    pub async fn shutdown(self) {
        self.token.cancel();
        let _ = self.handle.await;
    }
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("finished", &self.handle.is_finished())
            .finish()
    }
}
