//! Demand-driven periodic tick source.
//!
//! The scheduler wraps a `tokio::time::Interval` and reports, for every
//! tick, the monotonic time that actually passed since the previous one.
//! It is meant to live inside the single task that owns the engines, so
//! ticks are delivered strictly one after the other:
//!
//! ```ignore
//! let mut scheduler = TickScheduler::new(Duration::from_millis(100), SystemClock);
//! loop {
//!     tokio::select! {
//!         Some(cmd) = commands.recv() => { /* mutate */ }
//!         dt = scheduler.next_tick() => { /* advance by dt */ }
//!     }
//!     scheduler.set_demand(session.needs_ticks());
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior};

use super::clock::{Clock, DeltaTracker};

/// Nominal period used by the lane session.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);
/// Nominal period used by stopwatches and program mode.
pub const FAST_TICK_INTERVAL: Duration = Duration::from_millis(20);

pub struct TickScheduler {
    period: Duration,
    clock: Arc<dyn Clock>,
    interval: Option<Interval>,
    deltas: DeltaTracker,
}

impl TickScheduler {
    /// Create a stopped scheduler. A zero period is bumped to 1 ms.
    pub fn new(period: Duration, clock: impl Clock + 'static) -> Self {
        Self::with_shared_clock(period, Arc::new(clock))
    }

    pub fn with_shared_clock(period: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            clock,
            interval: None,
            deltas: DeltaTracker::new(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }


    /// Begin delivering ticks. No-op when already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.interval.is_some() {
            return;
        }
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
        self.deltas.reset();
        tracing::debug!(period_ms = self.period.as_millis() as u64, "tick scheduler started");
    }

    /// Stop delivering ticks and release the interval.
    pub fn stop(&mut self) {
        if self.interval.take().is_some() {
            self.deltas.reset();
            tracing::debug!("tick scheduler stopped");
        }
    }

    /// Time since the last delivered tick, sampled now.
    ///
    /// `None` while stopped or before the first tick. The next tick then
    /// measures from this sample, so no time is counted twice.
    pub fn flush(&mut self) -> Option<Duration> {
        self.interval.as_ref()?;
        self.deltas.last_sample()?;
        Some(self.deltas.sample(self.clock.now()))
    }

    /// Start when something needs ticks, stop when nothing does.
    pub fn set_demand(&mut self, needed: bool) {
        if needed {
            self.start();
        } else {
            self.stop();
        }
    }

    /// Wait for the next tick and return the measured delta.
    ///
    /// The first tick after `start` reports zero. While stopped this future
    /// never resolves, which makes it safe to use as a `select!` branch.
    pub async fn next_tick(&mut self) -> Duration {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
                self.deltas.sample(self.clock.now())
            }
            None => std::future::pending().await,
        }
    }
}

impl std::fmt::Debug for TickScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickScheduler")
            .field("period", &self.period)
            .field("running", &self.is_running())
            .finish()
    }
}
