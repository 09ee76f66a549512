//! Monotonic clock sources.
//!
//! Every elapsed-time computation in the crate is derived from differences
//! between `Instant`s handed out by a [`Clock`]. Calendar time is never used
//! for timing because it can jump.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of monotonic instants.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Monotonic clock backed by the tokio time driver.
///
/// Outside a runtime this is `Instant::now()`. Inside a runtime with a
/// paused test clock it follows the virtual time, which keeps engine tests
/// deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

/// Hand-driven clock for tests and simulations.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Turns successive clock readings into deltas.
///
/// The first sample after [`DeltaTracker::reset`] yields zero so a freshly
/// started consumer never sees a spurious jump.
#[derive(Debug, Clone, Default)]
pub struct DeltaTracker {
    last: Option<Instant>,
}

impl DeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta since the previous sample, zero on the first one.
    pub fn sample(&mut self, now: Instant) -> Duration {
        let delta = match self.last {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        delta
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn last_sample(&self) -> Option<Instant> {
        self.last
    }
}
