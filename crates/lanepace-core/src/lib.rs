//! # LanePace Core Library
//!
//! This library provides the timing engine for LanePace, a multi-lane
//! interval timer for swim coaching. The CLI binary is a thin layer over
//! the same core library.
//!
//! ## Architecture
//!
//! - **Timer**: Lane timers that advance by measured monotonic deltas, with
//!   a demand-driven tick scheduler that only runs while something moves
//! - **Series**: Interval sets and the sequencer that walks work/rest phases
//! - **Stopwatch**: Free-running per-athlete stopwatches with lap splits
//! - **Session / Runtime**: Pure command handling, wrapped in a single
//!   writer tokio task that publishes snapshots and effects
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`LaneTimerBank`]: Lane timers and warning detection
//! - [`IntervalSequencer`]: Series state machine
//! - [`CoachSession`]: Bank and sequencer driven together
//! - [`CoachEngine`]: Async owner of a session
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod format;
pub mod program;
pub mod runtime;
pub mod series;
pub mod session;
pub mod stopwatch;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, EngineError, ValidationError};
pub use events::{Effect, Haptic, ImpactStyle, NotificationStyle, Signal, SignalKind, SplitRecord};
pub use program::{IntervalProgram, ProgramMode, ProgramStep, SegmentKind};
pub use runtime::{
    CoachEngine, CoachHandle, EngineOptions, EngineSnapshot, FeedbackSink, NullSink,
    StopwatchView, TracingSink,
};
pub use series::{IntervalSequencer, IntervalSet, Phase, SequencerState};
pub use session::{CoachSession, Command, LaneView, RunState, SessionSettings, SessionSnapshot};
pub use stopwatch::{EntityId, ParallelStopwatchBank};
pub use storage::Config;
pub use timer::{
    Clock, LaneState, LaneTimer, LaneTimerBank, ManualClock, PaceStatus, SystemClock,
    TickScheduler, TimerMode,
};
