use std::time::Duration;

use clap::Args;
use lanepace_core::format::format_clock;
use lanepace_core::timer::{SystemClock, TickScheduler};
use lanepace_core::{Config, Effect, IntervalProgram, ProgramMode, ProgramStep};
use serde::Serialize;

use super::input::seconds;
use super::render::describe_effect;

#[derive(Args)]
pub struct ProgramArgs {
    /// Work step in seconds
    #[arg(long, default_value = "30")]
    work: f64,
    /// Rest step in seconds (0 for none)
    #[arg(long, default_value = "10")]
    rest: f64,
    /// Number of work/rest rounds
    #[arg(long, default_value = "8")]
    repeats: u32,
    /// Run as a plain stopwatch for --duration seconds instead
    #[arg(long)]
    stopwatch: bool,
    /// Stopwatch length in seconds
    #[arg(long, default_value = "10")]
    duration: f64,
    /// Run against simulated time
    #[arg(long)]
    simulate: bool,
    /// Emit JSON lines instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct ProgramEvent<'a> {
    at_ms: u64,
    repeat: u32,
    step: usize,
    effect: &'a Effect,
}

pub async fn run(args: ProgramArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut steps = vec![ProgramStep::work(seconds(args.work, "work")?)];
    let rest = seconds(args.rest, "rest")?;
    if !rest.is_zero() {
        steps.push(ProgramStep::rest(rest));
    }
    if steps[0].duration.is_zero() {
        return Err("--work must be above zero".into());
    }
    let mode = if args.stopwatch {
        ProgramMode::Stopwatch
    } else {
        ProgramMode::Intervals
    };
    let limit = seconds(args.duration, "duration")?;
    let mut program = IntervalProgram::new(mode, steps, args.repeats);
    let tick = Config::load_or_default().stopwatch_tick();

    let started = program.start();
    report(&program, Duration::ZERO, started, args.json)?;

    if args.simulate {
        let mut elapsed = Duration::ZERO;
        while program.is_running() && !stopwatch_done(&program, limit) {
            elapsed += tick;
            let effects = program.advance(tick);
            report(&program, elapsed, effects, args.json)?;
        }
    } else {
        let mut scheduler = TickScheduler::new(tick, SystemClock);
        scheduler.start();
        let mut elapsed = Duration::ZERO;
        let mut last_second = 0;
        while program.is_running() && !stopwatch_done(&program, limit) {
            let dt = scheduler.next_tick().await;
            elapsed += dt;
            let effects = program.advance(dt);
            report(&program, elapsed, effects, args.json)?;
            if !args.json && elapsed.as_secs() > last_second {
                last_second = elapsed.as_secs();
                println!("{}", progress_line(&program));
            }
        }
        scheduler.stop();
    }

    if !args.json {
        println!("{}", progress_line(&program));
    }
    Ok(())
}

fn stopwatch_done(program: &IntervalProgram, limit: Duration) -> bool {
    program.mode() == ProgramMode::Stopwatch && program.stopwatch_elapsed() >= limit
}

fn report(
    program: &IntervalProgram,
    at: Duration,
    effects: Vec<Effect>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    for effect in &effects {
        if json {
            let event = ProgramEvent {
                at_ms: u64::try_from(at.as_millis()).unwrap_or(u64::MAX),
                repeat: program.repeat_index() + 1,
                step: program.step_index() + 1,
                effect,
            };
            println!("{}", serde_json::to_string(&event)?);
        } else {
            println!("{:>10}  {}", format_clock(at, true), describe_effect(effect));
        }
    }
    Ok(())
}

fn progress_line(program: &IntervalProgram) -> String {
    match program.mode() {
        ProgramMode::Stopwatch => format_clock(program.stopwatch_elapsed(), true),
        ProgramMode::Intervals => {
            let label = program
                .current_step()
                .map(|step| step.label.as_str())
                .unwrap_or("-");
            format!(
                "round {}/{} {label} {} left, total {}",
                program.repeat_index() + 1,
                program.repeat_total(),
                format_clock(program.step_remaining(), true),
                format_clock(program.total_elapsed(), true)
            )
        }
    }
}
