use std::time::Duration;

use clap::{Args, Subcommand};
use lanepace_core::{
    CoachEngine, CoachSession, Command, Config, Effect, EngineOptions, FeedbackSink,
    SessionSettings, TimerMode,
};
use serde::Serialize;
use tokio::time::Instant;

use super::input::{parse_session_line, seconds, stdin_lines, SeriesArgs, SessionInput};
use super::render::{describe_effect, status_line};

/// Overrides applied on top of the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Timer mode (send_off, countdown, count_up, rest_based)
    #[arg(long)]
    pub mode: Option<TimerMode>,
    /// Number of lanes
    #[arg(long)]
    pub lanes: Option<usize>,
    /// Warning lookahead in seconds
    #[arg(long)]
    pub pre_warning: Option<f64>,
    /// Drop audible signals
    #[arg(long)]
    pub mute: bool,
    /// Drop haptic feedback
    #[arg(long)]
    pub no_haptics: bool,
}

impl SessionArgs {
    fn settings(&self, config: &Config) -> Result<SessionSettings, String> {
        let mut settings = config.session_settings();
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        if let Some(lanes) = self.lanes {
            settings.lane_count = lanes;
        }
        if let Some(pre_warning) = self.pre_warning {
            settings.pre_warning = seconds(pre_warning, "pre-warning")?;
        }
        if self.mute {
            settings.audio = false;
        }
        if self.no_haptics {
            settings.haptics = false;
        }
        Ok(settings)
    }
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run a live session; reads commands from stdin
    Run {
        #[command(flatten)]
        session: SessionArgs,
        #[command(flatten)]
        series: SeriesArgs,
        /// Stop after this many seconds (default: until "quit" or end of input)
        #[arg(long)]
        duration: Option<f64>,
        /// Seconds between status lines
        #[arg(long, default_value = "1")]
        every: f64,
        /// Load the series without starting
        #[arg(long)]
        no_start: bool,
        /// Emit JSON lines instead of text
        #[arg(long)]
        json: bool,
    },
    /// Run a session against simulated time and print the outcome
    Simulate {
        #[command(flatten)]
        session: SessionArgs,
        #[command(flatten)]
        series: SeriesArgs,
        /// Simulated seconds to run
        #[arg(long)]
        seconds: f64,
        /// Simulated tick length in milliseconds
        #[arg(long)]
        tick_ms: Option<u64>,
        /// Print one JSON document
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    match action {
        SessionAction::Run {
            session,
            series,
            duration,
            every,
            no_start,
            json,
        } => {
            let settings = session.settings(&config)?;
            let duration = duration.map(|d| seconds(d, "duration")).transpose()?;
            let every = seconds(every, "every")?.max(Duration::from_millis(100));
            let mut commands = series.commands()?;
            if !no_start {
                commands.push(Command::Start);
            }
            run_live(&config, settings, commands, duration, every, json).await
        }
        SessionAction::Simulate {
            session,
            series,
            seconds: total,
            tick_ms,
            json,
        } => {
            let settings = session.settings(&config)?;
            let total = seconds(total, "seconds")?;
            let tick = tick_ms
                .map(Duration::from_millis)
                .unwrap_or_else(|| config.tick_interval())
                .max(Duration::from_millis(1));
            simulate(settings, series.commands()?, total, tick, json)
        }
    }
}

/// Writes each effect to stdout as it happens.
struct PrintSink {
    json: bool,
}

impl FeedbackSink for PrintSink {
    fn play(&mut self, effect: &Effect) {
        if self.json {
            match serde_json::to_string(&serde_json::json!({ "effect": effect })) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!("could not encode effect: {e}"),
            }
        } else {
            println!("  {}", describe_effect(effect));
        }
    }
}

async fn run_live(
    config: &Config,
    settings: SessionSettings,
    commands: Vec<Command>,
    duration: Option<Duration>,
    every: Duration,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let handle = CoachEngine::spawn(
        CoachSession::new(settings),
        EngineOptions::from_config(config),
        PrintSink { json },
    );
    for command in commands {
        handle.send(command).await?;
    }

    let mut line_rx = stdin_lines();

    let deadline = duration.map(|d| Instant::now() + d);
    let mut status = tokio::time::interval(every);
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = until(deadline) => break,
            line = line_rx.recv(), if stdin_open => match line {
                None => {
                    stdin_open = false;
                    if deadline.is_none() {
                        break;
                    }
                }
                Some(line) => match parse_session_line(&line) {
                    Ok(Some(SessionInput::Command(command))) => handle.send(command).await?,
                    Ok(Some(SessionInput::Status)) => {
                        print_status(&handle.fetch_snapshot().await?.session, json)?
                    }
                    Ok(Some(SessionInput::Quit)) => break,
                    Ok(None) => {}
                    Err(e) => eprintln!("error: {e}"),
                },
            },
            _ = status.tick() => print_status(&handle.snapshot().session, json)?,
        }
    }

    let session = handle.shutdown().await?;
    let snapshot = session.snapshot();
    if json {
        println!("{}", serde_json::to_string(&serde_json::json!({ "final": snapshot }))?);
    } else {
        println!("{}", status_line(&snapshot));
    }
    Ok(())
}

async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn print_status(
    snapshot: &lanepace_core::SessionSnapshot,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(&serde_json::json!({ "status": snapshot }))?);
    } else {
        println!("{}", status_line(snapshot));
    }
    Ok(())
}

#[derive(Serialize)]
struct TimedEffect {
    at_ms: u64,
    effect: Effect,
}

#[derive(Serialize)]
struct SimulationReport {
    simulated_ms: u64,
    effects: Vec<TimedEffect>,
    snapshot: lanepace_core::SessionSnapshot,
}

/// Drive a session with fixed ticks, no waiting.
fn simulate(
    settings: SessionSettings,
    commands: Vec<Command>,
    total: Duration,
    tick: Duration,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    fn record(effects: &mut Vec<TimedEffect>, at: Duration, batch: Vec<Effect>) {
        let at_ms = u64::try_from(at.as_millis()).unwrap_or(u64::MAX);
        effects.extend(batch.into_iter().map(|effect| TimedEffect { at_ms, effect }));
    }

    let mut session = CoachSession::new(settings);
    let mut effects = Vec::new();
    for command in commands {
        record(&mut effects, Duration::ZERO, session.apply(command));
    }
    record(&mut effects, Duration::ZERO, session.apply(Command::Start));

    let mut elapsed = Duration::ZERO;
    while elapsed < total && session.needs_ticks() {
        let dt = tick.min(total - elapsed);
        elapsed += dt;
        record(&mut effects, elapsed, session.tick(dt));
    }

    let report = SimulationReport {
        simulated_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        effects,
        snapshot: session.snapshot(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for timed in &report.effects {
            let at = Duration::from_millis(timed.at_ms);
            println!(
                "{:>10}  {}",
                lanepace_core::format::format_clock(at, true),
                describe_effect(&timed.effect)
            );
        }
        println!("{}", status_line(&report.snapshot));
    }
    Ok(())
}
