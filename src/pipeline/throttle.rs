//! Inter-call pacing for quota-bound backends.
//!
//! Hosted APIs with hard requests-per-minute quotas need their calls spaced
//! out; self-hosted endpoints do not. [`Throttle`] turns the profile's
//! configured interval into exactly one cooperative suspension before every
//! call except the first. The suspension is a `tokio::time::sleep` — it
//! blocks forward progress of its own run while yielding the executor to
//! unrelated concurrent runs.
//!
//! The decision ("should call N wait, and for how long?") is a pure function
//! of the interval and the call index, so the pacing contract is testable
//! without clocks; only the actual sleep touches time.

use std::time::Duration;
use tracing::debug;

/// Pacing policy: a fixed minimum interval between backend calls.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// How long call `call_index` (0-based within a batch) must wait before
    /// firing. `None` for the first call and for unconstrained backends.
    pub fn pause_before(&self, call_index: usize) -> Option<Duration> {
        if call_index == 0 || self.interval.is_zero() {
            None
        } else {
            Some(self.interval)
        }
    }

    /// Suspend for the required pause, if any.
    pub async fn pace(&self, call_index: usize) {
        if let Some(pause) = self.pause_before(call_index) {
            debug!(call_index, pause_ms = pause.as_millis() as u64, "pacing backend call");
            tokio::time::sleep(pause).await;
        }
    }
}
