//! Single-timer program mode.
//!
//! A lighter sibling of the lane session: either a plain stopwatch or an
//! ordered list of work/rest steps repeated a number of times. Boundaries
//! carry any overshoot into the next step so the program as a whole does
//! not lose time to tick granularity.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::events::{Effect, NotificationStyle, Signal, SignalKind};

/// Steps closer than this to their end count as finished.
const BOUNDARY_TOLERANCE: Duration = Duration::from_micros(500);
/// `previous_step` restarts the step instead of going back once this much
/// of it has elapsed.
const RESTART_THRESHOLD: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramMode {
    #[default]
    Stopwatch,
    Intervals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Work,
    Rest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramStep {
    pub kind: SegmentKind,
    pub duration: Duration,
    pub label: String,
}

impl ProgramStep {
    pub fn work(duration: Duration) -> Self {
        Self {
            kind: SegmentKind::Work,
            duration,
            label: "Work".into(),
        }
    }

    pub fn rest(duration: Duration) -> Self {
        Self {
            kind: SegmentKind::Rest,
            duration,
            label: "Rest".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntervalProgram {
    mode: ProgramMode,
    steps: Vec<ProgramStep>,
    repeat_total: u32,
    repeat_index: u32,
    step_index: usize,
    step_elapsed: Duration,
    total_elapsed: Duration,
    stopwatch_elapsed: Duration,
    running: bool,
}

impl IntervalProgram {
    pub fn new(mode: ProgramMode, steps: Vec<ProgramStep>, repeat_total: u32) -> Self {
        Self {
            mode,
            steps,
            repeat_total: repeat_total.max(1),
            repeat_index: 0,
            step_index: 0,
            step_elapsed: Duration::ZERO,
            total_elapsed: Duration::ZERO,
            stopwatch_elapsed: Duration::ZERO,
            running: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> ProgramMode {
        self.mode
    }

    pub fn steps(&self) -> &[ProgramStep] {
        &self.steps
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn repeat_total(&self) -> u32 {
        self.repeat_total
    }

    /// 0-based.
    pub fn repeat_index(&self) -> u32 {
        self.repeat_index
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn current_step(&self) -> Option<&ProgramStep> {
        self.steps.get(self.step_index)
    }

    pub fn step_elapsed(&self) -> Duration {
        self.step_elapsed
    }

    pub fn step_remaining(&self) -> Duration {
        self.current_step()
            .map(|s| s.duration.saturating_sub(self.step_elapsed))
            .unwrap_or_default()
    }

    pub fn total_elapsed(&self) -> Duration {
        self.total_elapsed
    }

    pub fn stopwatch_elapsed(&self) -> Duration {
        self.stopwatch_elapsed
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn set_mode(&mut self, mode: ProgramMode) {
        self.mode = mode;
    }

    pub fn start(&mut self) -> Vec<Effect> {
        if self.running {
            return Vec::new();
        }
        self.running = true;
        vec![Effect::Signal(Signal::global(SignalKind::Start))]
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.stopwatch_elapsed = Duration::ZERO;
        self.step_elapsed = Duration::ZERO;
        self.total_elapsed = Duration::ZERO;
        self.step_index = 0;
        self.repeat_index = 0;
    }

    /// Jump to the next step (intervals mode only).
    pub fn next_step(&mut self) -> Vec<Effect> {
        if self.mode != ProgramMode::Intervals {
            return Vec::new();
        }
        self.advance_step()
    }

    /// Restart the current step if it is under way, otherwise go back one
    /// step, wrapping into the previous repeat.
    pub fn previous_step(&mut self) {
        if self.mode != ProgramMode::Intervals {
            return;
        }
        if self.step_elapsed > RESTART_THRESHOLD {
            self.step_elapsed = Duration::ZERO;
        } else if self.step_index > 0 {
            self.step_index -= 1;
            self.step_elapsed = Duration::ZERO;
        } else if self.repeat_index > 0 {
            self.repeat_index -= 1;
            self.step_index = self.steps.len().saturating_sub(1);
            self.step_elapsed = Duration::ZERO;
        }
    }

    // ── Tick ─────────────────────────────────────────────────────────

    pub fn advance(&mut self, dt: Duration) -> Vec<Effect> {
        if !self.running {
            return Vec::new();
        }
        match self.mode {
            ProgramMode::Stopwatch => {
                self.stopwatch_elapsed += dt;
                Vec::new()
            }
            ProgramMode::Intervals => {
                self.total_elapsed += dt;
                self.step_elapsed += dt;
                self.settle_boundaries()
            }
        }
    }

    /// Cross every step boundary the elapsed time has reached, carrying the
    /// overshoot forward.
    fn settle_boundaries(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        while self.running {
            let Some(step) = self.current_step() else {
                break;
            };
            let duration = step.duration;
            if self.step_elapsed + BOUNDARY_TOLERANCE < duration {
                break;
            }
            let overflow = self.step_elapsed.saturating_sub(duration);
            effects.extend(self.advance_step());
            self.step_elapsed += overflow;
        }
        effects
    }

    fn advance_step(&mut self) -> Vec<Effect> {
        self.step_elapsed = Duration::ZERO;
        if self.step_index + 1 < self.steps.len() {
            self.step_index += 1;
            return vec![Effect::Signal(Signal::global(SignalKind::SendOff))];
        }
        if self.repeat_index + 1 < self.repeat_total {
            self.repeat_index += 1;
            self.step_index = 0;
            return vec![Effect::Signal(Signal::global(SignalKind::SendOff))];
        }
        self.running = false;
        tracing::info!(repeats = self.repeat_total, "interval program complete");
        vec![
            Effect::Signal(Signal::global(SignalKind::SeriesComplete)),
            Effect::notify(NotificationStyle::Success),
        ]
    }
}

impl Default for IntervalProgram {
    /// 8 x (30 s work, 10 s rest).
    fn default() -> Self {
        Self::new(
            ProgramMode::Stopwatch,
            vec![
                ProgramStep::work(Duration::from_secs(30)),
                ProgramStep::rest(Duration::from_secs(10)),
            ],
            8,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intervals(work: u64, rest: u64, repeats: u32) -> IntervalProgram {
        IntervalProgram::new(
            ProgramMode::Intervals,
            vec![
                ProgramStep::work(Duration::from_secs(work)),
                ProgramStep::rest(Duration::from_secs(rest)),
            ],
            repeats,
        )
    }

    #[test]
    fn stopwatch_mode_accumulates() {
        let mut p = IntervalProgram::default();
        p.start();
        p.advance(Duration::from_millis(20));
        p.advance(Duration::from_millis(21));
        assert_eq!(p.stopwatch_elapsed(), Duration::from_millis(41));
    }

    #[test]
    fn paused_program_ignores_ticks() {
        let mut p = IntervalProgram::default();
        p.start();
        p.advance(Duration::from_secs(1));
        p.pause();
        p.advance(Duration::from_secs(5));
        assert_eq!(p.stopwatch_elapsed(), Duration::from_secs(1));
    }

    #[test]
    fn overflow_carries_into_next_step() {
        let mut p = intervals(30, 10, 2);
        p.start();
        p.advance(Duration::from_millis(29_900));
        p.advance(Duration::from_millis(300));
        assert_eq!(p.step_index(), 1);
        assert_eq!(p.step_elapsed(), Duration::from_millis(200));
        assert_eq!(p.total_elapsed(), Duration::from_millis(30_200));
    }

    #[test]
    fn large_tick_crosses_several_steps() {
        let mut p = intervals(30, 10, 3);
        p.start();
        p.advance(Duration::from_secs(45));
        assert_eq!(p.repeat_index(), 1);
        assert_eq!(p.step_index(), 0);
        assert_eq!(p.step_elapsed(), Duration::from_secs(5));
    }

    #[test]
    fn completes_after_last_repeat() {
        let mut p = intervals(30, 10, 2);
        p.start();
        let effects = p.advance(Duration::from_secs(80));
        assert!(!p.is_running());
        let completes = effects
            .iter()
            .filter(|e| e.signal_kind() == Some(SignalKind::SeriesComplete))
            .count();
        assert_eq!(completes, 1);
    }

    #[test]
    fn boundary_tolerance_absorbs_rounding() {
        let mut p = intervals(1, 1, 2);
        p.start();
        p.advance(Duration::from_micros(999_700));
        assert_eq!(p.step_index(), 1);
    }

    #[test]
    fn previous_step_restarts_then_steps_back() {
        let mut p = intervals(30, 10, 3);
        p.start();
        p.advance(Duration::from_secs(45));
        // Repeat 1, step 0, 5 s in: restart the step.
        p.previous_step();
        assert_eq!(p.step_elapsed(), Duration::ZERO);
        assert_eq!(p.step_index(), 0);
        // Now at the start: wrap back to the rest of repeat 0.
        p.previous_step();
        assert_eq!(p.repeat_index(), 0);
        assert_eq!(p.step_index(), 1);
    }

    #[test]
    fn step_controls_ignored_in_stopwatch_mode() {
        let mut p = IntervalProgram::default();
        assert!(p.next_step().is_empty());
        assert_eq!(p.step_index(), 0);
    }

    #[test]
    fn reset_returns_to_start() {
        let mut p = intervals(30, 10, 3);
        p.start();
        p.advance(Duration::from_secs(45));
        p.reset();
        assert!(!p.is_running());
        assert_eq!(p.repeat_index(), 0);
        assert_eq!(p.step_index(), 0);
        assert_eq!(p.total_elapsed(), Duration::ZERO);
    }
}
