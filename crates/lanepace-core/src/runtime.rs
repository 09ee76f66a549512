//! Async engine: one task owns the session and the stopwatches.
//!
//! All mutation happens inside the engine task. Commands arrive on an
//! `mpsc` channel, ticks come from two demand-driven [`TickScheduler`]s
//! (lane ticks and fast stopwatch ticks), and after every step the task
//! publishes a versioned [`EngineSnapshot`] on a `watch` channel. Effects
//! go to the [`FeedbackSink`] and are fanned out on a `broadcast` channel.
//!
//! ```ignore
//! let handle = CoachEngine::spawn(CoachSession::default(), EngineOptions::default(), TracingSink);
//! handle.send(Command::Start).await?;
//! let snapshot = handle.snapshot();
//! let session = handle.shutdown().await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::error::EngineError;
use crate::events::{Effect, SplitRecord};
use crate::format::format_clock;
use crate::session::{CoachSession, Command, SessionSnapshot};
use crate::stopwatch::{EntityId, ParallelStopwatchBank};
use crate::storage::Config;
use crate::timer::{
    Clock, SystemClock, TickScheduler, DEFAULT_TICK_INTERVAL, FAST_TICK_INTERVAL,
};

const COMMAND_BUFFER: usize = 64;
const EFFECT_BUFFER: usize = 256;

/// Receiver of effects produced by the engine.
///
/// Called from the engine task, in order. Implementations must not block.
pub trait FeedbackSink: Send + 'static {
    fn play(&mut self, effect: &Effect);
}

/// Logs every effect at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl FeedbackSink for TracingSink {
    fn play(&mut self, effect: &Effect) {
        tracing::debug!(?effect, "feedback");
    }
}

/// Drops every effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl FeedbackSink for NullSink {
    fn play(&mut self, _effect: &Effect) {}
}

/// Published state of one stopwatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopwatchView {
    pub entity: EntityId,
    pub running: bool,
    pub elapsed_ms: u64,
    pub display: String,
    pub lap_index: u32,
}

/// Everything a renderer needs, copied out of the engine task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub version: u64,
    pub session: SessionSnapshot,
    pub stopwatches: Vec<StopwatchView>,
}

/// Tick rates and the clock the engine measures with.
#[derive(Clone)]
pub struct EngineOptions {
    pub tick_interval: Duration,
    pub stopwatch_tick: Duration,
    pub clock: Arc<dyn Clock>,
}

impl EngineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tick_interval: config.tick_interval(),
            stopwatch_tick: config.stopwatch_tick(),
            ..Self::default()
        }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            stopwatch_tick: FAST_TICK_INTERVAL,
            clock: Arc::new(SystemClock),
        }
    }
}

impl std::fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineOptions")
            .field("tick_interval", &self.tick_interval)
            .field("stopwatch_tick", &self.stopwatch_tick)
            .finish_non_exhaustive()
    }
}

enum Message {
    Session(Command),
    ToggleStopwatch(EntityId),
    ResetStopwatch(EntityId),
    RemoveStopwatch(EntityId),
    Split(EntityId, oneshot::Sender<SplitRecord>),
    Snapshot(oneshot::Sender<EngineSnapshot>),
    Shutdown,
}

enum Wake {
    Message(Option<Message>),
    LaneTick(Duration),
    StopwatchTick,
}

pub struct CoachEngine {
    session: CoachSession,
    stopwatches: ParallelStopwatchBank,
    lane_ticks: TickScheduler,
    stopwatch_ticks: TickScheduler,
    clock: Arc<dyn Clock>,
    sink: Box<dyn FeedbackSink>,
    commands: mpsc::Receiver<Message>,
    snapshots: watch::Sender<EngineSnapshot>,
    effects: broadcast::Sender<Effect>,
    version: u64,
}

impl CoachEngine {
    /// Move `session` into a new engine task and return its handle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        session: CoachSession,
        options: EngineOptions,
        sink: impl FeedbackSink,
    ) -> CoachHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (effect_tx, _) = broadcast::channel(EFFECT_BUFFER);
        let initial = EngineSnapshot {
            version: 0,
            session: session.snapshot(),
            stopwatches: Vec::new(),
        };
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);

        let engine = CoachEngine {
            session,
            stopwatches: ParallelStopwatchBank::new(),
            lane_ticks: TickScheduler::with_shared_clock(
                options.tick_interval,
                Arc::clone(&options.clock),
            ),
            stopwatch_ticks: TickScheduler::with_shared_clock(
                options.stopwatch_tick,
                Arc::clone(&options.clock),
            ),
            clock: options.clock,
            sink: Box::new(sink),
            commands: command_rx,
            snapshots: snapshot_tx,
            effects: effect_tx.clone(),
            version: 0,
        };
        let task = tokio::spawn(engine.run());

        CoachHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            effects: effect_tx,
            task,
        }
    }

    async fn run(mut self) -> CoachSession {
        tracing::debug!("coach engine started");
        loop {
            let wake = tokio::select! {
                msg = self.commands.recv() => Wake::Message(msg),
                dt = self.lane_ticks.next_tick() => Wake::LaneTick(dt),
                _ = self.stopwatch_ticks.next_tick() => Wake::StopwatchTick,
            };

            match wake {
                Wake::Message(None) | Wake::Message(Some(Message::Shutdown)) => break,
                Wake::Message(Some(msg)) => self.handle(msg),
                Wake::LaneTick(dt) => {
                    let effects = self.session.tick(dt);
                    self.dispatch(effects);
                }
                Wake::StopwatchTick => self.stopwatches.tick(self.clock.now()),
            }

            self.lane_ticks.set_demand(self.session.needs_ticks());
            self.stopwatch_ticks.set_demand(self.stopwatches.any_running());
            self.publish();
        }
        tracing::debug!("coach engine stopped");
        self.session
    }

    fn handle(&mut self, msg: Message) {
        match msg {
            Message::Session(command) => {
                // Credit running lanes up to now before the command lands.
                if let Some(dt) = self.lane_ticks.flush() {
                    let effects = self.session.tick(dt);
                    self.dispatch(effects);
                }
                let effects = self.session.apply(command);
                self.dispatch(effects);
            }
            Message::ToggleStopwatch(id) => {
                let running = self.stopwatches.toggle(id, self.clock.now());
                tracing::debug!(%id, running, "stopwatch toggled");
            }
            Message::ResetStopwatch(id) => self.stopwatches.reset(id),
            Message::RemoveStopwatch(id) => {
                self.stopwatches.remove(&id);
            }
            Message::Split(id, reply) => {
                let split = self.stopwatches.add_split(id, self.clock.now());
                self.dispatch(vec![Effect::Split(split.clone())]);
                // The caller may have stopped waiting.
                let _ = reply.send(split);
            }
            Message::Snapshot(reply) => {
                let _ = reply.send(self.build_snapshot());
            }
            Message::Shutdown => {}
        }
    }

    fn dispatch(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.sink.play(&effect);
            // No subscribers is fine.
            let _ = self.effects.send(effect);
        }
    }

    fn publish(&mut self) {
        self.version += 1;
        let snapshot = self.build_snapshot();
        self.snapshots.send_replace(snapshot);
    }

    fn build_snapshot(&self) -> EngineSnapshot {
        let now = self.clock.now();
        let mut stopwatches: Vec<StopwatchView> = self
            .stopwatches
            .iter()
            .map(|(id, sw)| {
                let elapsed = sw.elapsed_at(now);
                StopwatchView {
                    entity: *id,
                    running: sw.is_running(),
                    elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    display: format_clock(elapsed, true),
                    lap_index: sw.lap_index(),
                }
            })
            .collect();
        stopwatches.sort_by_key(|view| view.entity);

        let mut session = self.session.snapshot();
        session.version = self.version;
        EngineSnapshot {
            version: self.version,
            session,
            stopwatches,
        }
    }
}

/// Caller side of a running [`CoachEngine`].
#[derive(Debug)]
pub struct CoachHandle {
    commands: mpsc::Sender<Message>,
    snapshots: watch::Receiver<EngineSnapshot>,
    effects: broadcast::Sender<Effect>,
    task: JoinHandle<CoachSession>,
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::Session(cmd) => f.debug_tuple("Session").field(cmd).finish(),
            Message::ToggleStopwatch(id) => f.debug_tuple("ToggleStopwatch").field(id).finish(),
            Message::ResetStopwatch(id) => f.debug_tuple("ResetStopwatch").field(id).finish(),
            Message::RemoveStopwatch(id) => f.debug_tuple("RemoveStopwatch").field(id).finish(),
            Message::Split(id, _) => f.debug_tuple("Split").field(id).finish(),
            Message::Snapshot(_) => f.write_str("Snapshot"),
            Message::Shutdown => f.write_str("Shutdown"),
        }
    }
}

impl CoachHandle {
    async fn post(&self, msg: Message) -> Result<(), EngineError> {
        self.commands.send(msg).await.map_err(|_| EngineError::Closed)
    }

    /// Queue a session command.
    ///
    /// # Errors
    ///
    /// [`EngineError::Closed`] once the engine task has exited.
    pub async fn send(&self, command: Command) -> Result<(), EngineError> {
        self.post(Message::Session(command)).await
    }

    /// Start or stop the stopwatch for `id`, creating it on first use.
    ///
    /// # Errors
    ///
    /// [`EngineError::Closed`] once the engine task has exited.
    pub async fn toggle_stopwatch(&self, id: EntityId) -> Result<(), EngineError> {
        self.post(Message::ToggleStopwatch(id)).await
    }

    /// # Errors
    ///
    /// [`EngineError::Closed`] once the engine task has exited.
    pub async fn reset_stopwatch(&self, id: EntityId) -> Result<(), EngineError> {
        self.post(Message::ResetStopwatch(id)).await
    }

    /// # Errors
    ///
    /// [`EngineError::Closed`] once the engine task has exited.
    pub async fn remove_stopwatch(&self, id: EntityId) -> Result<(), EngineError> {
        self.post(Message::RemoveStopwatch(id)).await
    }

    /// Record a lap for `id` and return the split.
    ///
    /// # Errors
    ///
    /// [`EngineError::Closed`] once the engine task has exited.
    pub async fn add_split(&self, id: EntityId) -> Result<SplitRecord, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.post(Message::Split(id, tx)).await?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    /// Snapshot taken after every command sent before this call.
    ///
    /// # Errors
    ///
    /// [`EngineError::Closed`] once the engine task has exited.
    pub async fn fetch_snapshot(&self) -> Result<EngineSnapshot, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.post(Message::Snapshot(tx)).await?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> EngineSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that is notified on every publish.
    pub fn watch(&self) -> watch::Receiver<EngineSnapshot> {
        self.snapshots.clone()
    }

    /// Effects produced from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Effect> {
        self.effects.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    /// Stop the engine and take the session back.
    ///
    /// # Errors
    ///
    /// [`EngineError::Closed`] if the engine task died.
    pub async fn shutdown(self) -> Result<CoachSession, EngineError> {
        // A closed channel means the task is already gone; the join reports it.
        let _ = self.commands.send(Message::Shutdown).await;
        self.task.await.map_err(|e| {
            tracing::error!("coach engine task failed: {e}");
            EngineError::Closed
        })
    }
}
