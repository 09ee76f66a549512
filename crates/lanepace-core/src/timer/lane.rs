use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default on-pace band around a lane's target time.
pub const DEFAULT_PACE_TOLERANCE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneState {
    Stopped,
    Running,
    Paused,
    /// Still running, but inside the pre-warning window of the phase.
    Warning,
    /// Countdown reached zero.
    Finished,
}

impl LaneState {
    /// Lanes in these states move on every tick.
    pub fn is_active(self) -> bool {
        matches!(self, LaneState::Running | LaneState::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaceStatus {
    Ahead,
    OnPace,
    Behind,
    Neutral,
}

impl PaceStatus {
    /// Compare `current` against `target` with a symmetric tolerance band.
    pub fn evaluate(current: Duration, target: Duration, tolerance: Duration) -> Self {
        if target.is_zero() {
            return PaceStatus::Neutral;
        }
        if current > target {
            if current - target <= tolerance {
                PaceStatus::OnPace
            } else {
                PaceStatus::Behind
            }
        } else if target - current <= tolerance {
            PaceStatus::OnPace
        } else {
            PaceStatus::Ahead
        }
    }
}

/// One independently tracked timer line.
///
/// Fields are only mutated by [`super::LaneTimerBank`]; callers read them
/// through the accessors or a published snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneTimer {
    name: String,
    lane_number: u32,
    /// Signed bias in seconds. Positive holds the lane back, negative gives
    /// it a head start.
    offset_secs: f64,
    current_time: Duration,
    /// Zero means "no target".
    target_time: Duration,
    state: LaneState,
    enabled: bool,
    volume: f32,
    /// Part of a positive offset not yet consumed since the last arm.
    hold: Duration,
    /// Warning already fired in the current phase.
    warned: bool,
    /// State to restore on resume.
    paused_from: Option<LaneState>,
}

impl LaneTimer {
    pub fn new(name: impl Into<String>, lane_number: u32) -> Self {
        Self {
            name: name.into(),
            lane_number,
            offset_secs: 0.0,
            current_time: Duration::ZERO,
            target_time: Duration::ZERO,
            state: LaneState::Stopped,
            enabled: true,
            volume: 1.0,
            hold: Duration::ZERO,
            warned: false,
            paused_from: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lane_number(&self) -> u32 {
        self.lane_number
    }

    pub fn offset_secs(&self) -> f64 {
        self.offset_secs
    }

    pub fn current_time(&self) -> Duration {
        self.current_time
    }

    pub fn target_time(&self) -> Duration {
        self.target_time
    }

    pub fn state(&self) -> LaneState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Time still held back by a positive offset.
    pub fn pending_hold(&self) -> Duration {
        self.hold
    }

    pub fn pace_status(&self, tolerance: Duration) -> PaceStatus {
        PaceStatus::evaluate(self.current_time, self.target_time, tolerance)
    }

    /// Lane moves on the next tick.
    pub fn is_ticking(&self) -> bool {
        self.enabled && self.state.is_active()
    }

    // ── Mutation (bank only) ─────────────────────────────────────────

    pub(crate) fn set_offset_secs(&mut self, secs: f64) {
        self.offset_secs = secs;
    }

    pub(crate) fn set_target_time(&mut self, target: Duration) {
        self.target_time = target;
    }

    pub(crate) fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub(crate) fn toggle_enabled(&mut self) {
        self.enabled = !self.enabled;
    }

    pub(crate) fn set_state(&mut self, state: LaneState) {
        self.state = state;
    }

    pub(crate) fn set_current_time(&mut self, time: Duration) {
        self.current_time = time;
    }

    pub(crate) fn warned(&self) -> bool {
        self.warned
    }

    pub(crate) fn mark_warned(&mut self) {
        self.warned = true;
    }

    /// Load the starting time for a new phase and re-arm the warning latch.
    ///
    /// `base` is zero for counting-up modes and the countdown length for
    /// countdown. With `apply_offset` the lane offset is consumed again.
    pub(crate) fn arm(&mut self, base: Duration, counts_down: bool, apply_offset: bool) {
        self.current_time = base;
        self.hold = Duration::ZERO;
        self.warned = false;
        if !apply_offset || self.offset_secs == 0.0 {
            return;
        }
        let Ok(magnitude) = Duration::try_from_secs_f64(self.offset_secs.abs()) else {
            return;
        };
        if self.offset_secs > 0.0 {
            self.hold = magnitude;
        } else if counts_down {
            self.current_time = base.saturating_sub(magnitude);
        } else {
            self.current_time = base + magnitude;
        }
    }

    /// Consume held offset time and return what is left of `dt`.
    pub(crate) fn consume_hold(&mut self, dt: Duration) -> Duration {
        let used = self.hold.min(dt);
        self.hold -= used;
        dt - used
    }

    pub(crate) fn pause(&mut self) {
        if self.state.is_active() {
            self.paused_from = Some(self.state);
            self.state = LaneState::Paused;
        }
    }

    pub(crate) fn resume(&mut self) {
        if self.state == LaneState::Paused {
            self.state = self.paused_from.take().unwrap_or(LaneState::Running);
        }
    }

    pub(crate) fn reset(&mut self) {
        self.current_time = Duration::ZERO;
        self.state = LaneState::Stopped;
        self.hold = Duration::ZERO;
        self.warned = false;
        self.paused_from = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn pace_neutral_without_target() {
        assert_eq!(
            PaceStatus::evaluate(secs(40.0), Duration::ZERO, DEFAULT_PACE_TOLERANCE),
            PaceStatus::Neutral
        );
    }

    #[test]
    fn pace_band_is_inclusive() {
        let target = secs(60.0);
        let tol = DEFAULT_PACE_TOLERANCE;
        assert_eq!(PaceStatus::evaluate(secs(62.0), target, tol), PaceStatus::OnPace);
        assert_eq!(PaceStatus::evaluate(secs(58.0), target, tol), PaceStatus::OnPace);
        assert_eq!(PaceStatus::evaluate(secs(62.5), target, tol), PaceStatus::Behind);
        assert_eq!(PaceStatus::evaluate(secs(57.5), target, tol), PaceStatus::Ahead);
    }

    #[test]
    fn volume_is_clamped() {
        let mut lane = LaneTimer::new("Lane 1", 1);
        lane.set_volume(1.7);
        assert_eq!(lane.volume(), 1.0);
        lane.set_volume(-0.2);
        assert_eq!(lane.volume(), 0.0);
    }

    #[test]
    fn positive_offset_holds_lane() {
        let mut lane = LaneTimer::new("Lane 1", 1);
        lane.set_offset_secs(5.0);
        lane.arm(Duration::ZERO, false, true);
        assert_eq!(lane.pending_hold(), secs(5.0));
        assert_eq!(lane.consume_hold(secs(3.0)), Duration::ZERO);
        assert_eq!(lane.consume_hold(secs(3.0)), secs(1.0));
        assert_eq!(lane.pending_hold(), Duration::ZERO);
    }

    #[test]
    fn negative_offset_gives_head_start() {
        let mut lane = LaneTimer::new("Lane 2", 2);
        lane.set_offset_secs(-2.0);
        lane.arm(Duration::ZERO, false, true);
        assert_eq!(lane.current_time(), secs(2.0));

        lane.arm(secs(30.0), true, true);
        assert_eq!(lane.current_time(), secs(28.0));
    }

    #[test]
    fn pause_resume_restores_warning() {
        let mut lane = LaneTimer::new("Lane 3", 3);
        lane.set_state(LaneState::Warning);
        lane.pause();
        assert_eq!(lane.state(), LaneState::Paused);
        lane.resume();
        assert_eq!(lane.state(), LaneState::Warning);
    }

    #[test]
    fn pause_ignores_stopped_lane() {
        let mut lane = LaneTimer::new("Lane 4", 4);
        lane.pause();
        assert_eq!(lane.state(), LaneState::Stopped);
    }
}
