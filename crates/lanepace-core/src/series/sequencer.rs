//! Interval-series state machine.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> RunningWork <-> RunningRest -> ... -> Complete
//!              \________ Paused ________/
//! ```
//!
//! The sequencer never touches lane times itself. Transitions return a
//! [`Transition`] naming the phase change so the owner can re-arm lanes,
//! plus the effects to play.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::interval::{self, IntervalSet};
use crate::error::ValidationError;
use crate::events::{Effect, ImpactStyle, NotificationStyle, Signal, SignalKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencerState {
    Idle,
    RunningWork,
    RunningRest,
    Paused,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Rest,
}

/// Position inside the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerCursor {
    pub set_index: usize,
    /// 0-based repetition within the current set.
    pub repetition: u32,
    pub in_work_phase: bool,
}

impl Default for SequencerCursor {
    fn default() -> Self {
        Self {
            set_index: 0,
            repetition: 0,
            in_work_phase: true,
        }
    }
}

/// What a transition did to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseChange {
    /// Nothing moved.
    None,
    /// Work phase ended, rest phase begins.
    ToRest,
    /// Next repetition of the same set.
    NextRepetition,
    /// First repetition of the next set.
    NextSet,
    /// Same repetition, back to its work phase.
    Restart,
    /// Past the last set.
    SeriesComplete,
}

impl PhaseChange {
    /// A new repetition starts, so lane offsets apply again.
    pub fn starts_repetition(self) -> bool {
        matches!(
            self,
            PhaseChange::NextRepetition | PhaseChange::NextSet | PhaseChange::Restart
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub change: PhaseChange,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn none() -> Self {
        Self {
            change: PhaseChange::None,
            effects: Vec::new(),
        }
    }

    fn of(change: PhaseChange) -> Self {
        Self {
            change,
            effects: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IntervalSequencer {
    sets: Vec<IntervalSet>,
    cursor: SequencerCursor,
    running: bool,
    paused: bool,
    complete: bool,
}

impl IntervalSequencer {
    pub fn new(sets: Vec<IntervalSet>) -> Self {
        Self {
            sets,
            ..Self::default()
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn sets(&self) -> &[IntervalSet] {
        &self.sets
    }

    pub fn cursor(&self) -> SequencerCursor {
        self.cursor
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn state(&self) -> SequencerState {
        if self.complete {
            SequencerState::Complete
        } else if !self.running {
            SequencerState::Idle
        } else if self.paused {
            SequencerState::Paused
        } else if self.cursor.in_work_phase {
            SequencerState::RunningWork
        } else {
            SequencerState::RunningRest
        }
    }

    pub fn phase(&self) -> Phase {
        if self.cursor.in_work_phase {
            Phase::Work
        } else {
            Phase::Rest
        }
    }

    pub fn current_set(&self) -> Option<&IntervalSet> {
        if self.complete {
            return None;
        }
        self.sets.get(self.cursor.set_index)
    }

    /// Length of the active phase; `None` without an active set.
    pub fn phase_target(&self) -> Option<Duration> {
        self.current_set().map(|set| {
            if self.cursor.in_work_phase {
                set.work_time()
            } else {
                set.rest_time()
            }
        })
    }

    /// Total repetitions across all sets.
    pub fn total_repetitions(&self) -> u32 {
        self.sets.iter().map(IntervalSet::repetitions).sum()
    }

    /// Repetitions fully behind the cursor.
    pub fn completed_repetitions(&self) -> u32 {
        if self.complete {
            return self.total_repetitions();
        }
        let before: u32 = self
            .sets
            .iter()
            .take(self.cursor.set_index)
            .map(IntervalSet::repetitions)
            .sum();
        before + self.cursor.repetition
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Begin the series from the first set. Returns whether it started.
    ///
    /// A paused series resumes instead; a running one is left alone; with
    /// no sets nothing happens.
    pub fn start(&mut self) -> bool {
        if self.sets.is_empty() {
            tracing::debug!("sequencer start ignored: no interval sets");
            return false;
        }
        if self.running {
            if self.paused {
                self.paused = false;
                return true;
            }
            return false;
        }
        self.cursor = SequencerCursor::default();
        self.running = true;
        self.paused = false;
        self.complete = false;
        tracing::info!(sets = self.sets.len(), "interval series started");
        true
    }

    pub fn pause(&mut self) {
        if self.running {
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Back to idle at the first set. The sets are kept.
    pub fn reset(&mut self) {
        self.cursor = SequencerCursor::default();
        self.running = false;
        self.paused = false;
        self.complete = false;
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Close the active phase: work goes to rest, rest goes to the next
    /// repetition. A zero-length rest is skipped.
    pub fn advance_phase(&mut self) -> Transition {
        if !self.can_advance() {
            return Transition::none();
        }
        if self.cursor.in_work_phase {
            let rest_is_empty = self
                .current_set()
                .map(|set| set.rest_time().is_zero())
                .unwrap_or(false);
            if !rest_is_empty {
                self.cursor.in_work_phase = false;
                return Transition::of(PhaseChange::ToRest);
            }
        }
        self.advance_repetition()
    }

    /// Move to the next repetition, rolling over into the next set and
    /// finally completing the series.
    ///
    /// Completion emits the series-complete signal once; calling this again
    /// afterwards is a no-op.
    pub fn advance_repetition(&mut self) -> Transition {
        if !self.can_advance() {
            return Transition::none();
        }
        self.cursor.repetition += 1;
        self.cursor.in_work_phase = true;

        let reps = self
            .sets
            .get(self.cursor.set_index)
            .map(IntervalSet::repetitions)
            .unwrap_or(0);
        if self.cursor.repetition < reps {
            return Transition::of(PhaseChange::NextRepetition);
        }

        self.cursor.set_index += 1;
        self.cursor.repetition = 0;
        if self.cursor.set_index < self.sets.len() {
            tracing::debug!(set_index = self.cursor.set_index, "advanced to next interval set");
            return Transition::of(PhaseChange::NextSet);
        }

        self.complete = true;
        self.running = false;
        self.paused = false;
        tracing::info!("interval series complete");
        Transition {
            change: PhaseChange::SeriesComplete,
            effects: vec![
                Effect::Signal(Signal::global(SignalKind::SeriesComplete)),
                Effect::notify(NotificationStyle::Success),
            ],
        }
    }

    /// Force the current phase to end without waiting for its boundary.
    pub fn skip_current_interval(&mut self) -> Transition {
        if !self.can_advance() {
            tracing::debug!("skip ignored: no active interval");
            return Transition::none();
        }
        let mut transition = if self.cursor.in_work_phase {
            self.cursor.in_work_phase = false;
            Transition::of(PhaseChange::ToRest)
        } else {
            self.advance_repetition()
        };
        transition.effects.push(Effect::impact(ImpactStyle::Medium));
        transition
    }

    /// Return to the work phase of the current repetition. Counters are
    /// unchanged; the owner zeroes lane times.
    pub fn restart_current_repetition(&mut self) -> Transition {
        if !self.can_advance() {
            tracing::debug!("restart ignored: no active interval");
            return Transition::none();
        }
        self.cursor.in_work_phase = true;
        Transition {
            change: PhaseChange::Restart,
            effects: vec![Effect::impact(ImpactStyle::Medium)],
        }
    }

    /// Bump the repetition counter by one while it stays inside the current
    /// set. Never changes set or phase.
    pub fn add_repetition(&mut self) -> Vec<Effect> {
        let Some(set) = self.current_set() else {
            return Vec::new();
        };
        if self.cursor.repetition + 1 < set.repetitions() {
            self.cursor.repetition += 1;
            vec![Effect::impact(ImpactStyle::Light)]
        } else {
            tracing::debug!(
                repetition = self.cursor.repetition,
                "add_repetition ignored: already at last repetition"
            );
            Vec::new()
        }
    }

    // ── Series generation ────────────────────────────────────────────

    /// Append one set to the end of the series.
    pub fn add_simple_interval(&mut self, set: IntervalSet) {
        self.sets.push(set);
    }

    /// Replace the whole series and move the cursor back to the start.
    pub fn replace_sets(&mut self, sets: Vec<IntervalSet>) {
        tracing::info!(sets = sets.len(), "interval series replaced");
        self.sets = sets;
        self.cursor = SequencerCursor::default();
        self.complete = false;
        if self.sets.is_empty() {
            self.running = false;
            self.paused = false;
        }
    }

    /// # Errors
    ///
    /// Rejected parameters leave the current series untouched.
    pub fn create_pyramid_series(&mut self, base_secs: f64, steps: u32) -> Result<(), ValidationError> {
        let sets = interval::pyramid(base_secs, steps)?;
        self.replace_sets(sets);
        Ok(())
    }

    /// # Errors
    ///
    /// Rejected parameters leave the current series untouched.
    pub fn create_ladder_series(
        &mut self,
        start_secs: f64,
        increment_secs: f64,
        steps: u32,
    ) -> Result<(), ValidationError> {
        let sets = interval::ladder(start_secs, increment_secs, steps)?;
        self.replace_sets(sets);
        Ok(())
    }

    fn can_advance(&self) -> bool {
        !self.complete && self.cursor.set_index < self.sets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(reps: u32, work: f64, rest: f64) -> IntervalSet {
        IntervalSet::new(reps, work, rest).unwrap()
    }

    fn count_signals(effects: &[Effect], kind: SignalKind) -> usize {
        effects.iter().filter(|e| e.signal_kind() == Some(kind)).count()
    }

    #[test]
    fn start_requires_sets() {
        let mut seq = IntervalSequencer::default();
        assert!(!seq.start());
        assert_eq!(seq.state(), SequencerState::Idle);
    }

    #[test]
    fn start_enters_work_phase() {
        let mut seq = IntervalSequencer::new(vec![set(2, 5.0, 2.0)]);
        assert!(seq.start());
        assert_eq!(seq.state(), SequencerState::RunningWork);
        assert_eq!(seq.phase_target(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn three_repetitions_complete_series_once() {
        let mut seq = IntervalSequencer::new(vec![set(3, 5.0, 2.0)]);
        seq.start();
        let mut effects = Vec::new();
        for _ in 0..3 {
            effects.extend(seq.advance_repetition().effects);
        }
        assert_eq!(seq.cursor().set_index, 1);
        assert!(seq.is_complete());
        assert!(!seq.is_running());

        let again = seq.advance_repetition();
        assert_eq!(again.change, PhaseChange::None);
        effects.extend(again.effects);
        assert_eq!(count_signals(&effects, SignalKind::SeriesComplete), 1);
        assert_eq!(seq.cursor().set_index, 1);
    }

    #[test]
    fn phase_walk_through_two_sets() {
        let mut seq = IntervalSequencer::new(vec![set(1, 10.0, 5.0), set(2, 20.0, 5.0)]);
        seq.start();
        assert_eq!(seq.advance_phase().change, PhaseChange::ToRest);
        assert_eq!(seq.state(), SequencerState::RunningRest);
        assert_eq!(seq.advance_phase().change, PhaseChange::NextSet);
        assert_eq!(seq.phase_target(), Some(Duration::from_secs(20)));
        assert_eq!(seq.advance_phase().change, PhaseChange::ToRest);
        assert_eq!(seq.advance_phase().change, PhaseChange::NextRepetition);
        assert_eq!(seq.cursor().repetition, 1);
        assert_eq!(seq.advance_phase().change, PhaseChange::ToRest);
        assert_eq!(seq.advance_phase().change, PhaseChange::SeriesComplete);
        assert_eq!(seq.state(), SequencerState::Complete);
        assert_eq!(seq.phase_target(), None);
    }

    #[test]
    fn zero_rest_goes_straight_to_next_repetition() {
        let mut seq = IntervalSequencer::new(vec![set(2, 10.0, 0.0)]);
        seq.start();
        assert_eq!(seq.advance_phase().change, PhaseChange::NextRepetition);
        assert!(seq.cursor().in_work_phase);
    }

    #[test]
    fn skip_moves_work_to_rest_then_next_rep() {
        let mut seq = IntervalSequencer::new(vec![set(2, 10.0, 5.0)]);
        seq.start();
        let t = seq.skip_current_interval();
        assert_eq!(t.change, PhaseChange::ToRest);
        assert!(t.effects.contains(&Effect::impact(ImpactStyle::Medium)));
        assert_eq!(seq.skip_current_interval().change, PhaseChange::NextRepetition);
        assert_eq!(seq.cursor().repetition, 1);
    }

    #[test]
    fn skip_without_sets_is_noop() {
        let mut seq = IntervalSequencer::default();
        let t = seq.skip_current_interval();
        assert_eq!(t.change, PhaseChange::None);
        assert!(t.effects.is_empty());
        assert_eq!(seq.cursor(), SequencerCursor::default());
    }

    #[test]
    fn restart_keeps_counters() {
        let mut seq = IntervalSequencer::new(vec![set(3, 10.0, 5.0)]);
        seq.start();
        seq.advance_repetition();
        seq.skip_current_interval();
        let t = seq.restart_current_repetition();
        assert_eq!(t.change, PhaseChange::Restart);
        assert_eq!(seq.cursor().repetition, 1);
        assert!(seq.cursor().in_work_phase);
    }

    #[test]
    fn restart_after_complete_is_noop() {
        let mut seq = IntervalSequencer::new(vec![set(1, 10.0, 5.0)]);
        seq.start();
        seq.advance_repetition();
        assert!(seq.is_complete());
        let t = seq.restart_current_repetition();
        assert_eq!(t.change, PhaseChange::None);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn add_repetition_stays_inside_set() {
        let mut seq = IntervalSequencer::new(vec![set(3, 10.0, 5.0)]);
        seq.start();
        for _ in 0..10 {
            seq.add_repetition();
            assert!(seq.cursor().repetition < 3);
        }
        assert_eq!(seq.cursor().repetition, 2);
        assert_eq!(seq.cursor().set_index, 0);
        assert!(seq.cursor().in_work_phase);
    }

    #[test]
    fn add_repetition_without_sets_is_noop() {
        let mut seq = IntervalSequencer::default();
        assert!(seq.add_repetition().is_empty());
        assert_eq!(seq.cursor().repetition, 0);
    }

    #[test]
    fn pause_and_resume_keep_cursor() {
        let mut seq = IntervalSequencer::new(vec![set(2, 10.0, 5.0)]);
        seq.start();
        seq.advance_phase();
        seq.pause();
        assert_eq!(seq.state(), SequencerState::Paused);
        seq.resume();
        assert_eq!(seq.state(), SequencerState::RunningRest);
    }

    #[test]
    fn start_after_complete_restarts_series() {
        let mut seq = IntervalSequencer::new(vec![set(1, 10.0, 0.0)]);
        seq.start();
        seq.advance_phase();
        assert!(seq.is_complete());
        assert!(seq.start());
        assert_eq!(seq.state(), SequencerState::RunningWork);
        assert_eq!(seq.cursor(), SequencerCursor::default());
    }

    #[test]
    fn generation_replaces_sets_and_resets_cursor() {
        let mut seq = IntervalSequencer::new(vec![set(3, 10.0, 5.0)]);
        seq.start();
        seq.advance_repetition();
        seq.create_pyramid_series(30.0, 3).unwrap();
        assert_eq!(seq.sets().len(), 5);
        assert_eq!(seq.cursor(), SequencerCursor::default());

        seq.create_ladder_series(60.0, 30.0, 4).unwrap();
        assert_eq!(seq.sets().len(), 4);
    }

    #[test]
    fn rejected_generation_keeps_sets() {
        let mut seq = IntervalSequencer::new(vec![set(3, 10.0, 5.0)]);
        assert!(seq.create_pyramid_series(30.0, 0).is_err());
        assert_eq!(seq.sets().len(), 1);
    }

    #[test]
    fn simple_interval_appends() {
        let mut seq = IntervalSequencer::new(vec![set(3, 10.0, 5.0)]);
        seq.add_simple_interval(set(2, 20.0, 10.0));
        assert_eq!(seq.sets().len(), 2);
        assert_eq!(seq.total_repetitions(), 5);
    }

    #[test]
    fn completed_repetitions_tracks_progress() {
        let mut seq = IntervalSequencer::new(vec![set(2, 10.0, 5.0), set(3, 10.0, 5.0)]);
        seq.start();
        seq.advance_repetition();
        seq.advance_repetition();
        seq.advance_repetition();
        assert_eq!(seq.completed_repetitions(), 3);
    }
}
