//! Collection of independent lane timers.
//!
//! The bank is a pure state machine: every mutation is synchronous and the
//! tick entry point, [`LaneTimerBank::advance`], returns the effects it
//! produced instead of playing them. Out-of-range lane indices are ignored.
//!
//! ## Warning detection
//!
//! A lane warns on the tick where its remaining time first drops to or below
//! the pre-warning threshold while still above zero. The check compares the
//! remaining time before and after the tick, so a tick large enough to jump
//! over the threshold still registers. The latch is cleared on reset and on
//! every phase re-arm.

use std::time::Duration;

use super::lane::{LaneState, LaneTimer, DEFAULT_PACE_TOLERANCE};
use super::mode::{ModeStep, TimerMode};
use crate::events::{Effect, NotificationStyle, Signal, SignalKind};

/// Default pre-warning lookahead.
pub const DEFAULT_PRE_WARNING: Duration = Duration::from_secs(10);
/// Number of lanes a pool session starts with.
pub const DEFAULT_LANE_COUNT: usize = 8;

/// Result of one [`LaneTimerBank::advance`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BankTick {
    pub effects: Vec<Effect>,
    /// Some send-off lane reached the active phase length.
    pub boundary_crossed: bool,
    /// Lanes whose countdown finished on this tick.
    pub finished: Vec<usize>,
    /// Lanes that entered the warning window on this tick.
    pub warned: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct LaneTimerBank {
    lanes: Vec<LaneTimer>,
    mode: TimerMode,
    pre_warning: Duration,
    pace_tolerance: Duration,
    name_prefix: String,
    default_volume: f32,
}

impl LaneTimerBank {
    /// Create `count` lanes named `"<prefix> <n>"`, numbered from 1.
    pub fn new(count: usize, name_prefix: impl Into<String>) -> Self {
        let mut bank = Self {
            lanes: Vec::with_capacity(count),
            mode: TimerMode::default(),
            pre_warning: DEFAULT_PRE_WARNING,
            pace_tolerance: DEFAULT_PACE_TOLERANCE,
            name_prefix: name_prefix.into(),
            default_volume: 1.0,
        };
        for _ in 0..count {
            bank.add_lane();
        }
        bank
    }

    pub fn with_mode(mut self, mode: TimerMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_pre_warning(mut self, pre_warning: Duration) -> Self {
        self.pre_warning = pre_warning;
        self
    }

    pub fn with_pace_tolerance(mut self, tolerance: Duration) -> Self {
        self.pace_tolerance = tolerance;
        self
    }

    pub fn with_default_volume(mut self, volume: f32) -> Self {
        self.default_volume = volume.clamp(0.0, 1.0);
        for lane in &mut self.lanes {
            lane.set_volume(self.default_volume);
        }
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn lanes(&self) -> &[LaneTimer] {
        &self.lanes
    }

    pub fn lane(&self, index: usize) -> Option<&LaneTimer> {
        self.lanes.get(index)
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn pre_warning(&self) -> Duration {
        self.pre_warning
    }

    pub fn pace_tolerance(&self) -> Duration {
        self.pace_tolerance
    }

    /// Any lane that will move on the next tick.
    pub fn has_ticking_lanes(&self) -> bool {
        self.lanes.iter().any(LaneTimer::is_ticking)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Switch mode. Lanes are reset since times mean different things.
    pub fn set_mode(&mut self, mode: TimerMode) {
        if self.mode != mode {
            self.mode = mode;
            self.reset();
        }
    }

    /// Start every enabled lane that is stopped or finished.
    ///
    /// Countdown lanes load their own target, falling back to
    /// `phase_target`. Lanes already running or paused are left alone.
    pub fn start(&mut self, phase_target: Option<Duration>) {
        let mode = self.mode;
        for lane in &mut self.lanes {
            if !lane.is_enabled() {
                continue;
            }
            if matches!(lane.state(), LaneState::Stopped | LaneState::Finished) {
                let base = countdown_base(mode, lane, phase_target);
                lane.arm(base, mode.counts_down(), true);
                lane.set_state(LaneState::Running);
            }
        }
    }

    pub fn pause(&mut self) {
        for lane in &mut self.lanes {
            lane.pause();
        }
    }

    pub fn resume(&mut self) {
        for lane in &mut self.lanes {
            lane.resume();
        }
    }

    /// Stop all lanes but keep their times (series complete).
    pub fn halt(&mut self) {
        for lane in &mut self.lanes {
            if lane.state() != LaneState::Finished {
                lane.set_state(LaneState::Stopped);
            }
        }
    }

    /// Zero every lane and stop it, enabled or not.
    pub fn reset(&mut self) {
        for lane in &mut self.lanes {
            lane.reset();
        }
    }

    /// Reload lane times for a new phase and clear warning latches.
    ///
    /// Warning lanes fall back to running, and finished countdown lanes
    /// restart with the new length. With `apply_offset` lane offsets are
    /// consumed again (start of a repetition).
    pub fn rearm(&mut self, phase_target: Option<Duration>, apply_offset: bool) {
        let mode = self.mode;
        for lane in &mut self.lanes {
            let base = countdown_base(mode, lane, phase_target);
            lane.arm(base, mode.counts_down(), apply_offset);
            if lane.is_enabled()
                && matches!(lane.state(), LaneState::Warning | LaneState::Finished)
            {
                lane.set_state(LaneState::Running);
            }
        }
    }

    pub fn toggle_lane(&mut self, index: usize) {
        match self.lanes.get_mut(index) {
            Some(lane) => lane.toggle_enabled(),
            None => tracing::debug!(index, "toggle_lane: no such lane"),
        }
    }

    pub fn set_offset(&mut self, index: usize, secs: f64) {
        if !secs.is_finite() {
            tracing::debug!(index, secs, "set_offset: ignoring non-finite offset");
            return;
        }
        match self.lanes.get_mut(index) {
            Some(lane) => lane.set_offset_secs(secs),
            None => tracing::debug!(index, "set_offset: no such lane"),
        }
    }

    pub fn set_volume(&mut self, index: usize, volume: f32) {
        if volume.is_nan() {
            return;
        }
        if let Some(lane) = self.lanes.get_mut(index) {
            lane.set_volume(volume);
        }
    }

    pub fn set_target(&mut self, index: usize, target: Duration) {
        if let Some(lane) = self.lanes.get_mut(index) {
            lane.set_target_time(target);
        }
    }

    /// Append a lane numbered one above the highest existing number.
    /// Returns the new lane's index.
    pub fn add_lane(&mut self) -> usize {
        let number = self
            .lanes
            .iter()
            .map(LaneTimer::lane_number)
            .max()
            .unwrap_or(0)
            + 1;
        let mut lane = LaneTimer::new(format!("{} {}", self.name_prefix, number), number);
        lane.set_volume(self.default_volume);
        self.lanes.push(lane);
        self.lanes.len() - 1
    }

    pub fn remove_lane(&mut self, index: usize) -> Option<LaneTimer> {
        if index < self.lanes.len() {
            Some(self.lanes.remove(index))
        } else {
            tracing::debug!(index, "remove_lane: no such lane");
            None
        }
    }

    // ── Tick ─────────────────────────────────────────────────────────

    /// Move every enabled, active lane by `dt`.
    ///
    /// Paused, stopped, finished and disabled lanes are not touched.
    pub fn advance(&mut self, dt: Duration, phase_target: Option<Duration>) -> BankTick {
        let mut tick = BankTick::default();
        let mode = self.mode;
        let pre_warning = self.pre_warning;

        for (index, lane) in self.lanes.iter_mut().enumerate() {
            if !lane.is_ticking() {
                continue;
            }
            let dt = lane.consume_hold(dt);
            if dt.is_zero() && !(mode.counts_down() && lane.current_time().is_zero()) {
                continue;
            }

            let before = lane.current_time();
            let mut current = before;
            let step = mode.step(&mut current, dt, phase_target);
            lane.set_current_time(current);

            match step {
                ModeStep::Finished => {
                    lane.set_state(LaneState::Finished);
                    tick.finished.push(index);
                    tick.effects
                        .push(Effect::Signal(Signal::lane(SignalKind::Finish, index, lane.volume())));
                    continue;
                }
                ModeStep::Boundary => {
                    tick.boundary_crossed = true;
                    tick.effects
                        .push(Effect::Signal(Signal::lane(SignalKind::SendOff, index, lane.volume())));
                    continue;
                }
                ModeStep::Moved => {}
            }

            if lane.warned() {
                continue;
            }
            let Some((remaining_before, remaining_after)) =
                remaining_window(mode, lane, before, current, phase_target)
            else {
                continue;
            };
            if remaining_before > pre_warning
                && remaining_after <= pre_warning
                && !remaining_after.is_zero()
            {
                lane.mark_warned();
                lane.set_state(LaneState::Warning);
                tick.warned.push(index);
                tick.effects
                    .push(Effect::Signal(Signal::lane(SignalKind::Warning, index, lane.volume())));
                tick.effects.push(Effect::notify(NotificationStyle::Warning));
            }
        }

        tick
    }
}

impl Default for LaneTimerBank {
    fn default() -> Self {
        Self::new(DEFAULT_LANE_COUNT, "Lane")
    }
}

/// Starting time for a lane: the countdown length in countdown mode, zero
/// otherwise.
fn countdown_base(mode: TimerMode, lane: &LaneTimer, phase_target: Option<Duration>) -> Duration {
    if !mode.counts_down() {
        return Duration::ZERO;
    }
    if !lane.target_time().is_zero() {
        lane.target_time()
    } else {
        phase_target.unwrap_or(Duration::ZERO)
    }
}

/// Remaining time before and after a tick, if the lane has a known target.
fn remaining_window(
    mode: TimerMode,
    lane: &LaneTimer,
    before: Duration,
    after: Duration,
    phase_target: Option<Duration>,
) -> Option<(Duration, Duration)> {
    if mode.counts_down() {
        return Some((before, after));
    }
    let target = phase_target
        .filter(|t| !t.is_zero())
        .or_else(|| Some(lane.target_time()).filter(|t| !t.is_zero()))?;
    Some((target.saturating_sub(before), target.saturating_sub(after)))
}
