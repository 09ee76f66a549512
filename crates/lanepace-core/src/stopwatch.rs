//! Free-running per-athlete stopwatches with manual lap splits.
//!
//! Each stopwatch keeps its own last-sample instant, so entities started at
//! different moments never share a delta. Callers pass `now` explicitly;
//! the runtime feeds it from its [`crate::timer::Clock`].

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::SplitRecord;

/// Stable identifier for a timed entity such as an athlete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stopwatch {
    running: bool,
    elapsed: Duration,
    /// Present only while running.
    last_sample: Option<Instant>,
    lap_index: u32,
}

impl Stopwatch {
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Elapsed time as of the last sample.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Elapsed time including the unsampled stretch up to `now`.
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        match self.last_sample {
            Some(last) if self.running => self.elapsed + now.saturating_duration_since(last),
            _ => self.elapsed,
        }
    }

    pub fn lap_index(&self) -> u32 {
        self.lap_index
    }

    fn sample(&mut self, now: Instant) {
        if let (true, Some(last)) = (self.running, self.last_sample) {
            self.elapsed += now.saturating_duration_since(last);
            self.last_sample = Some(now);
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParallelStopwatchBank<K = EntityId> {
    stopwatches: HashMap<K, Stopwatch>,
}

impl<K> Default for ParallelStopwatchBank<K> {
    fn default() -> Self {
        Self {
            stopwatches: HashMap::new(),
        }
    }
}

impl<K> ParallelStopwatchBank<K>
where
    K: Eq + Hash + Clone + fmt::Display,
{
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn get(&self, id: &K) -> Option<&Stopwatch> {
        self.stopwatches.get(id)
    }

    pub fn elapsed(&self, id: &K) -> Duration {
        self.stopwatches.get(id).map(Stopwatch::elapsed).unwrap_or_default()
    }

    pub fn lap_index(&self, id: &K) -> u32 {
        self.stopwatches.get(id).map(Stopwatch::lap_index).unwrap_or(0)
    }

    pub fn any_running(&self) -> bool {
        self.stopwatches.values().any(Stopwatch::is_running)
    }

    pub fn running_count(&self) -> usize {
        self.stopwatches.values().filter(|s| s.is_running()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Stopwatch)> {
        self.stopwatches.iter()
    }

    pub fn len(&self) -> usize {
        self.stopwatches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stopwatches.is_empty()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Create an idle stopwatch for `id` if none exists.
    pub fn ensure(&mut self, id: K) -> &mut Stopwatch {
        self.stopwatches.entry(id).or_default()
    }

    /// Start a stopped stopwatch, or stop a running one and bank the time
    /// since its last sample. Returns whether it is now running.
    pub fn toggle(&mut self, id: K, now: Instant) -> bool {
        let sw = self.ensure(id);
        if sw.running {
            sw.sample(now);
            sw.running = false;
            sw.last_sample = None;
        } else {
            sw.running = true;
            sw.last_sample = Some(now);
        }
        sw.running
    }

    /// Bring every running stopwatch up to `now`.
    pub fn tick(&mut self, now: Instant) {
        for sw in self.stopwatches.values_mut() {
            sw.sample(now);
        }
    }

    /// Count a lap and return the split to record.
    ///
    /// A running stopwatch is sampled first so the split carries the
    /// elapsed time at the moment of the call.
    pub fn add_split(&mut self, id: K, now: Instant) -> SplitRecord {
        let entity = id.to_string();
        let sw = self.ensure(id);
        sw.sample(now);
        sw.lap_index += 1;
        SplitRecord {
            entity,
            lap_index: sw.lap_index,
            elapsed_ms: u64::try_from(sw.elapsed.as_millis()).unwrap_or(u64::MAX),
            recorded_at: Utc::now(),
        }
    }

    /// Zero time and laps and stop.
    pub fn reset(&mut self, id: K) {
        *self.ensure(id) = Stopwatch::default();
    }

    pub fn remove(&mut self, id: &K) -> Option<Stopwatch> {
        self.stopwatches.remove(id)
    }
}
