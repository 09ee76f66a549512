//! Lane session: the lane bank and the interval sequencer driven together.
//!
//! [`CoachSession`] is synchronous and owns all of its state. Commands and
//! ticks go in, a list of [`Effect`]s comes out, and [`CoachSession::snapshot`]
//! renders the read model. The async [`crate::runtime`] wraps it in a
//! single-writer task.
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = CoachSession::new(SessionSettings::default());
//! session.apply(Command::CreatePyramidSeries { base_secs: 30.0, steps: 3 });
//! let effects = session.apply(Command::Start);
//! // Every tick:
//! let effects = session.tick(dt);
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::{Effect, ImpactStyle, Signal, SignalKind};
use crate::format::format_lane_time;
use crate::series::{
    IntervalSequencer, IntervalSet, Phase, PhaseChange, SequencerState, Transition,
};
use crate::timer::{
    LaneState, LaneTimerBank, PaceStatus, TimerMode, DEFAULT_LANE_COUNT, DEFAULT_PACE_TOLERANCE,
    DEFAULT_PRE_WARNING,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Paused,
}

/// Knobs a session is built from. See [`crate::Config::session_settings`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub mode: TimerMode,
    pub lane_count: usize,
    pub lane_prefix: String,
    pub default_volume: f32,
    pub pre_warning: Duration,
    pub pace_tolerance: Duration,
    pub audio: bool,
    pub haptics: bool,
    pub sets: Vec<IntervalSet>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            mode: TimerMode::default(),
            lane_count: DEFAULT_LANE_COUNT,
            lane_prefix: "Lane".into(),
            default_volume: 1.0,
            pre_warning: DEFAULT_PRE_WARNING,
            pace_tolerance: DEFAULT_PACE_TOLERANCE,
            audio: true,
            haptics: true,
            sets: Vec::new(),
        }
    }
}

/// Verbs accepted from the UI collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Start,
    Pause,
    Resume,
    Reset,
    AddRepetition,
    SkipCurrentInterval,
    RestartCurrentRepetition,
    ToggleLane { index: usize },
    UpdateLaneOffset { index: usize, seconds: f64 },
    SetLaneVolume { index: usize, volume: f32 },
    SetLaneTarget { index: usize, seconds: f64 },
    AddLane,
    RemoveLane { index: usize },
    AddSimpleInterval { repetitions: u32, work_secs: f64, rest_secs: f64 },
    CreatePyramidSeries { base_secs: f64, steps: u32 },
    CreateLadderSeries { start_secs: f64, increment_secs: f64, steps: u32 },
    SetMode { mode: TimerMode },
}

#[derive(Debug, Clone)]
pub struct CoachSession {
    bank: LaneTimerBank,
    sequencer: IntervalSequencer,
    run: RunState,
    audio: bool,
    haptics: bool,
}

impl CoachSession {
    pub fn new(settings: SessionSettings) -> Self {
        let bank = LaneTimerBank::new(settings.lane_count, settings.lane_prefix)
            .with_mode(settings.mode)
            .with_pre_warning(settings.pre_warning)
            .with_pace_tolerance(settings.pace_tolerance)
            .with_default_volume(settings.default_volume);
        Self {
            bank,
            sequencer: IntervalSequencer::new(settings.sets),
            run: RunState::Idle,
            audio: settings.audio,
            haptics: settings.haptics,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn bank(&self) -> &LaneTimerBank {
        &self.bank
    }

    pub fn sequencer(&self) -> &IntervalSequencer {
        &self.sequencer
    }

    pub fn run_state(&self) -> RunState {
        self.run
    }

    /// The scheduler should be delivering ticks.
    pub fn needs_ticks(&self) -> bool {
        self.run == RunState::Running && self.bank.has_ticking_lanes()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn apply(&mut self, command: Command) -> Vec<Effect> {
        tracing::debug!(?command, "session command");
        let effects = match command {
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::Reset => {
                self.bank.reset();
                self.sequencer.reset();
                self.run = RunState::Idle;
                vec![Effect::impact(ImpactStyle::Heavy)]
            }
            Command::AddRepetition => self.sequencer.add_repetition(),
            Command::SkipCurrentInterval => {
                let transition = self.sequencer.skip_current_interval();
                self.apply_transition(transition)
            }
            Command::RestartCurrentRepetition if self.run == RunState::Idle => {
                tracing::debug!("restart ignored: session idle");
                Vec::new()
            }
            Command::RestartCurrentRepetition => {
                let transition = self.sequencer.restart_current_repetition();
                self.apply_transition(transition)
            }
            Command::ToggleLane { index } => {
                self.bank.toggle_lane(index);
                Vec::new()
            }
            Command::UpdateLaneOffset { index, seconds } => {
                self.bank.set_offset(index, seconds);
                Vec::new()
            }
            Command::SetLaneVolume { index, volume } => {
                self.bank.set_volume(index, volume);
                Vec::new()
            }
            Command::SetLaneTarget { index, seconds } => {
                match Duration::try_from_secs_f64(seconds) {
                    Ok(target) => self.bank.set_target(index, target),
                    Err(_) => tracing::debug!(index, seconds, "ignoring invalid lane target"),
                }
                Vec::new()
            }
            Command::AddLane => {
                self.bank.add_lane();
                Vec::new()
            }
            Command::RemoveLane { index } => {
                self.bank.remove_lane(index);
                Vec::new()
            }
            Command::AddSimpleInterval {
                repetitions,
                work_secs,
                rest_secs,
            } => {
                match IntervalSet::new(repetitions, work_secs, rest_secs) {
                    Ok(set) => {
                        self.sequencer.add_simple_interval(set);
                        self.join_running_series();
                    }
                    Err(e) => tracing::warn!("interval rejected: {e}"),
                }
                Vec::new()
            }
            Command::CreatePyramidSeries { base_secs, steps } => {
                match self.sequencer.create_pyramid_series(base_secs, steps) {
                    Ok(()) => self.series_replaced(),
                    Err(e) => tracing::warn!("pyramid series rejected: {e}"),
                }
                Vec::new()
            }
            Command::CreateLadderSeries {
                start_secs,
                increment_secs,
                steps,
            } => {
                match self
                    .sequencer
                    .create_ladder_series(start_secs, increment_secs, steps)
                {
                    Ok(()) => self.series_replaced(),
                    Err(e) => tracing::warn!("ladder series rejected: {e}"),
                }
                Vec::new()
            }
            Command::SetMode { mode } => {
                if mode != self.bank.mode() {
                    self.bank.set_mode(mode);
                    self.sequencer.reset();
                    self.run = RunState::Idle;
                }
                Vec::new()
            }
        };
        self.filter(effects)
    }

    fn start(&mut self) -> Vec<Effect> {
        match self.run {
            RunState::Running => Vec::new(),
            RunState::Paused => self.resume(),
            RunState::Idle => {
                self.sequencer.start();
                self.bank.start(self.sequencer.phase_target());
                self.run = RunState::Running;
                vec![
                    Effect::Signal(Signal::global(SignalKind::Start)),
                    Effect::impact(ImpactStyle::Medium),
                ]
            }
        }
    }

    fn pause(&mut self) -> Vec<Effect> {
        if self.run != RunState::Running {
            return Vec::new();
        }
        self.bank.pause();
        self.sequencer.pause();
        self.run = RunState::Paused;
        vec![Effect::impact(ImpactStyle::Light)]
    }

    fn resume(&mut self) -> Vec<Effect> {
        if self.run != RunState::Paused {
            return Vec::new();
        }
        self.bank.resume();
        self.sequencer.resume();
        self.run = RunState::Running;
        vec![Effect::impact(ImpactStyle::Light)]
    }

    /// A session already under way picks up sets added after it started.
    fn join_running_series(&mut self) {
        if self.run == RunState::Idle
            || self.sequencer.is_running()
            || self.sequencer.is_complete()
        {
            return;
        }
        if self.sequencer.start() {
            if self.run == RunState::Paused {
                self.sequencer.pause();
            }
            self.bank.rearm(self.sequencer.phase_target(), true);
        }
    }

    fn series_replaced(&mut self) {
        if self.run == RunState::Idle {
            return;
        }
        if self.sequencer.is_running() {
            self.bank.rearm(self.sequencer.phase_target(), true);
        } else {
            self.join_running_series();
        }
    }

    /// Re-arm lanes after a phase change and stop them when the series ends.
    fn apply_transition(&mut self, transition: Transition) -> Vec<Effect> {
        let target = self.sequencer.phase_target();
        match transition.change {
            PhaseChange::None => {}
            PhaseChange::ToRest => self.bank.rearm(target, false),
            PhaseChange::SeriesComplete => {
                self.bank.halt();
                self.run = RunState::Idle;
            }
            change if change.starts_repetition() => self.bank.rearm(target, true),
            _ => {}
        }
        transition.effects
    }

    // ── Tick ─────────────────────────────────────────────────────────

    /// Advance by the measured delta. Ignored unless running.
    pub fn tick(&mut self, dt: Duration) -> Vec<Effect> {
        if self.run != RunState::Running {
            return Vec::new();
        }
        let tick = self.bank.advance(dt, self.sequencer.phase_target());
        let mut effects = tick.effects;
        if tick.boundary_crossed && self.bank.mode() == TimerMode::SendOff {
            let transition = self.sequencer.advance_phase();
            tracing::debug!(change = ?transition.change, "send-off boundary");
            effects.extend(self.apply_transition(transition));
        }
        self.filter(effects)
    }

    /// Drop cues the user switched off.
    fn filter(&self, mut effects: Vec<Effect>) -> Vec<Effect> {
        effects.retain(|effect| match effect {
            Effect::Signal(signal) => self.audio && signal.volume > 0.0,
            Effect::Haptic(_) => self.haptics,
            Effect::Split(_) => true,
        });
        effects
    }

    // ── Read model ───────────────────────────────────────────────────

    pub fn snapshot(&self) -> SessionSnapshot {
        let phase_target = self.sequencer.phase_target();
        let tolerance = self.bank.pace_tolerance();
        let lanes = self
            .bank
            .lanes()
            .iter()
            .enumerate()
            .map(|(index, lane)| {
                let target = phase_target.or(Some(lane.target_time()).filter(|t| !t.is_zero()));
                let remaining_ms = match self.bank.mode() {
                    TimerMode::Countdown => Some(millis(lane.current_time())),
                    _ => target.map(|t| millis(t.saturating_sub(lane.current_time()))),
                };
                LaneView {
                    index,
                    name: lane.name().to_string(),
                    lane_number: lane.lane_number(),
                    state: lane.state(),
                    enabled: lane.is_enabled(),
                    volume: lane.volume(),
                    offset_secs: lane.offset_secs(),
                    current_ms: millis(lane.current_time()),
                    display: format_lane_time(lane.current_time()),
                    target_ms: millis(lane.target_time()),
                    remaining_ms,
                    pace: lane.pace_status(tolerance),
                }
            })
            .collect();

        let cursor = self.sequencer.cursor();
        SessionSnapshot {
            version: 0,
            run_state: self.run,
            mode: self.bank.mode(),
            sequencer: SequencerView {
                state: self.sequencer.state(),
                set_index: cursor.set_index,
                repetition: cursor.repetition,
                phase: self.sequencer.phase(),
                set_count: self.sequencer.sets().len(),
                total_repetitions: self.sequencer.total_repetitions(),
                completed_repetitions: self.sequencer.completed_repetitions(),
                phase_target_ms: phase_target.map(millis),
                current_set: self.sequencer.current_set().cloned(),
            },
            lanes,
            at: Utc::now(),
        }
    }
}

impl Default for CoachSession {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Published state of one lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneView {
    pub index: usize,
    pub name: String,
    pub lane_number: u32,
    pub state: LaneState,
    pub enabled: bool,
    pub volume: f32,
    pub offset_secs: f64,
    pub current_ms: u64,
    /// `m:ss.cc`
    pub display: String,
    pub target_ms: u64,
    pub remaining_ms: Option<u64>,
    pub pace: PaceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencerView {
    pub state: SequencerState,
    pub set_index: usize,
    pub repetition: u32,
    pub phase: Phase,
    pub set_count: usize,
    pub total_repetitions: u32,
    pub completed_repetitions: u32,
    pub phase_target_ms: Option<u64>,
    pub current_set: Option<IntervalSet>,
}

/// Consistent copy of the session for renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Bumped by the engine on every publish.
    pub version: u64,
    pub run_state: RunState,
    pub mode: TimerMode,
    pub sequencer: SequencerView,
    pub lanes: Vec<LaneView>,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Haptic, NotificationStyle};

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn session(mode: TimerMode, lanes: usize) -> CoachSession {
        CoachSession::new(SessionSettings {
            mode,
            lane_count: lanes,
            ..SessionSettings::default()
        })
    }

    fn kinds(effects: &[Effect]) -> Vec<SignalKind> {
        effects.iter().filter_map(Effect::signal_kind).collect()
    }

    #[test]
    fn start_emits_signal_and_medium_impact() {
        let mut s = session(TimerMode::CountUp, 2);
        let effects = s.apply(Command::Start);
        assert_eq!(kinds(&effects), vec![SignalKind::Start]);
        assert!(effects.contains(&Effect::impact(ImpactStyle::Medium)));
        assert_eq!(s.run_state(), RunState::Running);
        assert!(s.needs_ticks());
    }

    #[test]
    fn command_haptics() {
        let mut s = session(TimerMode::CountUp, 1);
        s.apply(Command::Start);
        assert_eq!(s.apply(Command::Pause), vec![Effect::impact(ImpactStyle::Light)]);
        assert!(!s.needs_ticks());
        assert_eq!(s.apply(Command::Resume), vec![Effect::impact(ImpactStyle::Light)]);
        assert_eq!(s.apply(Command::Reset), vec![Effect::impact(ImpactStyle::Heavy)]);
        assert_eq!(s.run_state(), RunState::Idle);
    }

    #[test]
    fn ticks_ignored_unless_running() {
        let mut s = session(TimerMode::CountUp, 1);
        s.tick(secs(5.0));
        assert_eq!(s.bank().lane(0).unwrap().current_time(), Duration::ZERO);
        s.apply(Command::Start);
        s.apply(Command::Pause);
        s.tick(secs(5.0));
        assert_eq!(s.bank().lane(0).unwrap().current_time(), Duration::ZERO);
    }

    #[test]
    fn send_off_walks_through_series() {
        let mut s = session(TimerMode::SendOff, 2);
        s.apply(Command::AddSimpleInterval {
            repetitions: 2,
            work_secs: 5.0,
            rest_secs: 2.0,
        });
        s.apply(Command::Start);

        let mut signals = Vec::new();
        for _ in 0..200 {
            signals.extend(kinds(&s.tick(Duration::from_millis(100))));
        }
        // Both lanes cross each boundary on the same tick: 4 phases x 2 lanes.
        let send_offs = signals.iter().filter(|k| **k == SignalKind::SendOff).count();
        assert_eq!(send_offs, 8);
        let completes = signals
            .iter()
            .filter(|k| **k == SignalKind::SeriesComplete)
            .count();
        assert_eq!(completes, 1);
        assert_eq!(s.run_state(), RunState::Idle);
        assert_eq!(s.sequencer().state(), SequencerState::Complete);
        assert!(!s.needs_ticks());
    }

    #[test]
    fn phase_change_zeroes_lane_times() {
        let mut s = session(TimerMode::SendOff, 1);
        s.apply(Command::AddSimpleInterval {
            repetitions: 1,
            work_secs: 5.0,
            rest_secs: 3.0,
        });
        s.apply(Command::Start);
        s.tick(secs(5.2));
        assert_eq!(s.sequencer().phase(), Phase::Rest);
        assert_eq!(s.bank().lane(0).unwrap().current_time(), Duration::ZERO);
    }

    #[test]
    fn skip_and_restart() {
        let mut s = session(TimerMode::SendOff, 1);
        s.apply(Command::AddSimpleInterval {
            repetitions: 3,
            work_secs: 30.0,
            rest_secs: 10.0,
        });
        s.apply(Command::Start);
        s.tick(secs(4.0));

        let effects = s.apply(Command::SkipCurrentInterval);
        assert!(effects.contains(&Effect::impact(ImpactStyle::Medium)));
        assert_eq!(s.sequencer().phase(), Phase::Rest);
        assert_eq!(s.bank().lane(0).unwrap().current_time(), Duration::ZERO);

        s.tick(secs(2.0));
        s.apply(Command::RestartCurrentRepetition);
        assert_eq!(s.sequencer().phase(), Phase::Work);
        assert_eq!(s.sequencer().cursor().repetition, 0);
        assert_eq!(s.bank().lane(0).unwrap().current_time(), Duration::ZERO);
    }

    #[test]
    fn restart_after_series_end_leaves_next_start_clean() {
        let mut s = session(TimerMode::Countdown, 1);
        s.apply(Command::AddSimpleInterval {
            repetitions: 1,
            work_secs: 5.0,
            rest_secs: 2.0,
        });
        s.apply(Command::Start);
        s.tick(secs(5.0));
        s.apply(Command::SkipCurrentInterval);
        s.apply(Command::SkipCurrentInterval);
        assert_eq!(s.run_state(), RunState::Idle);

        assert!(s.apply(Command::RestartCurrentRepetition).is_empty());
        assert_ne!(s.bank().lane(0).unwrap().state(), LaneState::Running);

        s.apply(Command::Start);
        let effects = s.tick(secs(0.1));
        assert!(!effects
            .iter()
            .any(|e| e.signal_kind() == Some(SignalKind::Finish)));
        assert_eq!(s.bank().lane(0).unwrap().current_time(), secs(4.9));
    }

    #[test]
    fn warning_fires_once_per_phase_with_haptic() {
        let mut s = session(TimerMode::SendOff, 1);
        s.apply(Command::AddSimpleInterval {
            repetitions: 1,
            work_secs: 31.0,
            rest_secs: 20.0,
        });
        s.apply(Command::Start);

        let mut effects = Vec::new();
        for _ in 0..20 {
            effects.extend(s.tick(secs(3.0)));
        }
        let warnings = kinds(&effects)
            .into_iter()
            .filter(|k| *k == SignalKind::Warning)
            .count();
        // One in the work phase (31 s) and one in the rest phase (20 s).
        assert_eq!(warnings, 2);
        assert!(effects.contains(&Effect::Haptic(Haptic::Notification(NotificationStyle::Warning))));
    }

    #[test]
    fn muted_lane_and_disabled_feedback_are_filtered() {
        let mut s = CoachSession::new(SessionSettings {
            mode: TimerMode::SendOff,
            lane_count: 1,
            haptics: false,
            ..SessionSettings::default()
        });
        s.apply(Command::SetLaneVolume { index: 0, volume: 0.0 });
        s.apply(Command::AddSimpleInterval {
            repetitions: 1,
            work_secs: 1.0,
            rest_secs: 0.0,
        });
        let effects = s.apply(Command::Start);
        assert_eq!(kinds(&effects), vec![SignalKind::Start]);
        let effects = s.tick(secs(1.5));
        // Lane send-off muted; global completion still plays.
        assert_eq!(kinds(&effects), vec![SignalKind::SeriesComplete]);
        assert!(effects.iter().all(|e| !matches!(e, Effect::Haptic(_))));
    }

    #[test]
    fn add_repetition_is_counter_nudge_only() {
        let mut s = session(TimerMode::SendOff, 1);
        s.apply(Command::AddSimpleInterval {
            repetitions: 2,
            work_secs: 30.0,
            rest_secs: 10.0,
        });
        s.apply(Command::Start);
        s.tick(secs(4.0));
        assert_eq!(s.apply(Command::AddRepetition), vec![Effect::impact(ImpactStyle::Light)]);
        assert!(s.apply(Command::AddRepetition).is_empty());
        assert_eq!(s.sequencer().cursor().repetition, 1);
        assert_eq!(s.sequencer().phase(), Phase::Work);
        assert_eq!(s.bank().lane(0).unwrap().current_time(), secs(4.0));
    }

    #[test]
    fn pyramid_mid_session_restarts_series() {
        let mut s = session(TimerMode::SendOff, 1);
        s.apply(Command::Start);
        s.tick(secs(3.0));
        s.apply(Command::CreatePyramidSeries { base_secs: 30.0, steps: 3 });
        assert!(s.sequencer().is_running());
        assert_eq!(s.sequencer().phase_target(), Some(secs(30.0)));
        assert_eq!(s.bank().lane(0).unwrap().current_time(), Duration::ZERO);
    }

    #[test]
    fn invalid_series_commands_leave_state() {
        let mut s = session(TimerMode::SendOff, 1);
        s.apply(Command::AddSimpleInterval {
            repetitions: 0,
            work_secs: 30.0,
            rest_secs: 10.0,
        });
        s.apply(Command::CreateLadderSeries {
            start_secs: 60.0,
            increment_secs: 30.0,
            steps: 0,
        });
        assert!(s.sequencer().sets().is_empty());
        assert!(s.apply(Command::SkipCurrentInterval).is_empty());
    }

    #[test]
    fn set_mode_resets_session() {
        let mut s = session(TimerMode::CountUp, 1);
        s.apply(Command::Start);
        s.tick(secs(2.0));
        s.apply(Command::SetMode { mode: TimerMode::Countdown });
        assert_eq!(s.run_state(), RunState::Idle);
        assert_eq!(s.bank().mode(), TimerMode::Countdown);
        assert_eq!(s.bank().lane(0).unwrap().current_time(), Duration::ZERO);
    }

    #[test]
    fn countdown_lanes_use_phase_length() {
        let mut s = session(TimerMode::Countdown, 1);
        s.apply(Command::AddSimpleInterval {
            repetitions: 1,
            work_secs: 5.0,
            rest_secs: 0.0,
        });
        s.apply(Command::Start);
        let mut finishes = 0;
        for _ in 0..60 {
            finishes += kinds(&s.tick(Duration::from_millis(100)))
                .into_iter()
                .filter(|k| *k == SignalKind::Finish)
                .count();
        }
        assert_eq!(finishes, 1);
        assert_eq!(s.bank().lane(0).unwrap().state(), LaneState::Finished);
        assert!(!s.needs_ticks());
    }

    #[test]
    fn snapshot_reports_lanes_and_cursor() {
        let mut s = session(TimerMode::SendOff, 3);
        s.apply(Command::CreateLadderSeries {
            start_secs: 60.0,
            increment_secs: 30.0,
            steps: 4,
        });
        s.apply(Command::Start);
        s.tick(Duration::from_millis(12_345));

        let snap = s.snapshot();
        assert_eq!(snap.run_state, RunState::Running);
        assert_eq!(snap.lanes.len(), 3);
        assert_eq!(snap.lanes[0].display, "0:12.34");
        assert_eq!(snap.lanes[0].remaining_ms, Some(47_655));
        assert_eq!(snap.sequencer.state, SequencerState::RunningWork);
        assert_eq!(snap.sequencer.set_count, 4);
        assert_eq!(snap.sequencer.phase_target_ms, Some(60_000));

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["lanes"][1]["name"], "Lane 2");
        assert_eq!(json["sequencer"]["current_set"]["work_secs"], 60.0);
    }

    #[test]
    fn command_json_shape() {
        let cmd: Command =
            serde_json::from_str(r#"{"command":"update_lane_offset","index":2,"seconds":-1.5}"#)
                .unwrap();
        assert_eq!(
            cmd,
            Command::UpdateLaneOffset {
                index: 2,
                seconds: -1.5
            }
        );
    }
}
