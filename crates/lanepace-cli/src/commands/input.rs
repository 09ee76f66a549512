//! Parsing of series flags and the stdin line protocol.

use std::io::BufRead;
use std::time::Duration;

use clap::Args;
use lanepace_core::Command;
use tokio::sync::mpsc;

/// Series to load before a session starts.
#[derive(Args, Debug, Clone, Default)]
pub struct SeriesArgs {
    /// Pyramid series, BASE:STEPS in seconds
    #[arg(long, value_name = "BASE:STEPS", conflicts_with = "ladder")]
    pub pyramid: Option<String>,
    /// Ladder series, START:INCREMENT:STEPS in seconds
    #[arg(long, value_name = "START:INCREMENT:STEPS")]
    pub ladder: Option<String>,
    /// Append a set, REPS:WORK:REST in seconds (repeatable)
    #[arg(long = "interval", value_name = "REPS:WORK:REST")]
    pub intervals: Vec<String>,
}

impl SeriesArgs {
    /// Commands that build the requested series, generators first.
    pub fn commands(&self) -> Result<Vec<Command>, String> {
        let mut commands = Vec::new();
        if let Some(raw) = &self.pyramid {
            let [base_secs, steps] = numbers::<2>(raw)?;
            commands.push(Command::CreatePyramidSeries {
                base_secs,
                steps: count(steps, raw)?,
            });
        }
        if let Some(raw) = &self.ladder {
            let [start_secs, increment_secs, steps] = numbers::<3>(raw)?;
            commands.push(Command::CreateLadderSeries {
                start_secs,
                increment_secs,
                steps: count(steps, raw)?,
            });
        }
        for raw in &self.intervals {
            let [reps, work_secs, rest_secs] = numbers::<3>(raw)?;
            commands.push(Command::AddSimpleInterval {
                repetitions: count(reps, raw)?,
                work_secs,
                rest_secs,
            });
        }
        Ok(commands)
    }
}

/// Split `a:b:c` into exactly `N` numbers.
pub fn numbers<const N: usize>(raw: &str) -> Result<[f64; N], String> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != N {
        return Err(format!("expected {N} ':'-separated numbers, got '{raw}'"));
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .trim()
            .parse()
            .map_err(|_| format!("'{part}' is not a number in '{raw}'"))?;
    }
    Ok(out)
}

fn count(value: f64, raw: &str) -> Result<u32, String> {
    if value.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&value) {
        return Err(format!("'{value}' is not a whole count in '{raw}'"));
    }
    Ok(value as u32)
}

/// Seconds from a flag, rejecting negative and non-finite values.
pub fn seconds(value: f64, flag: &str) -> Result<Duration, String> {
    Duration::try_from_secs_f64(value).map_err(|_| format!("--{flag} must be a non-negative number of seconds"))
}

/// Forward stdin lines from a blocking reader thread. The channel closes
/// at end of input.
pub fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// One line typed into a running session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionInput {
    Command(Command),
    Status,
    Quit,
}

/// Accepts short verbs (`pause`, `skip`, `lane 2`) or a JSON command such
/// as `{"command":"set_lane_volume","index":0,"volume":0.5}`.
pub fn parse_session_line(line: &str) -> Result<Option<SessionInput>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if line.starts_with('{') {
        return serde_json::from_str(line)
            .map(|cmd| Some(SessionInput::Command(cmd)))
            .map_err(|e| format!("bad command: {e}"));
    }

    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or_default().to_ascii_lowercase();
    let rest: Vec<&str> = words.collect();
    let index = |pos: usize| -> Result<usize, String> {
        let raw = rest.get(pos).ok_or_else(|| format!("'{verb}' needs a lane number"))?;
        let lane: usize = raw.parse().map_err(|_| format!("'{raw}' is not a lane number"))?;
        lane.checked_sub(1).ok_or_else(|| "lanes are numbered from 1".to_string())
    };
    let value = |pos: usize| -> Result<f64, String> {
        let raw = rest.get(pos).ok_or_else(|| format!("'{verb}' needs a value"))?;
        raw.parse().map_err(|_| format!("'{raw}' is not a number"))
    };

    let command = match verb.as_str() {
        "q" | "quit" | "exit" => return Ok(Some(SessionInput::Quit)),
        "status" | "?" => return Ok(Some(SessionInput::Status)),
        "start" => Command::Start,
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "reset" => Command::Reset,
        "rep" | "add-rep" => Command::AddRepetition,
        "skip" => Command::SkipCurrentInterval,
        "restart" => Command::RestartCurrentRepetition,
        "lane" | "toggle" => Command::ToggleLane { index: index(0)? },
        "offset" => Command::UpdateLaneOffset {
            index: index(0)?,
            seconds: value(1)?,
        },
        "volume" => Command::SetLaneVolume {
            index: index(0)?,
            volume: value(1)? as f32,
        },
        "target" => Command::SetLaneTarget {
            index: index(0)?,
            seconds: value(1)?,
        },
        "add-lane" => Command::AddLane,
        "remove-lane" => Command::RemoveLane { index: index(0)? },
        "mode" => {
            let raw = rest.first().ok_or("'mode' needs a mode name")?;
            Command::SetMode { mode: raw.parse()? }
        }
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(Some(SessionInput::Command(command)))
}
