use clap::Args;
use lanepace_core::{
    CoachEngine, CoachSession, Config, EngineOptions, EntityId, NullSink, StopwatchView,
};
use serde::Serialize;

use lanepace_core::format::format_clock;

use super::input::stdin_lines;

#[derive(Args)]
pub struct StopwatchArgs {
    /// Number of athletes
    #[arg(long, default_value = "1")]
    athletes: usize,
    /// Emit JSON lines instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct AthleteTime<'a> {
    athlete: usize,
    #[serde(flatten)]
    view: &'a StopwatchView,
}

enum Line {
    Toggle(usize),
    Split(usize),
    Reset(usize),
    List,
    Quit,
}

fn parse_line(line: &str, athletes: usize) -> Result<Option<Line>, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let athlete = |raw: &str| -> Result<usize, String> {
        match raw.parse::<usize>() {
            Ok(n) if (1..=athletes).contains(&n) => Ok(n - 1),
            _ => Err(format!("athlete must be 1..={athletes}, got '{raw}'")),
        }
    };
    match words.as_slice() {
        [] => Ok(None),
        ["q" | "quit"] => Ok(Some(Line::Quit)),
        ["l" | "list"] => Ok(Some(Line::List)),
        ["s" | "split", n] => athlete(n).map(|i| Some(Line::Split(i))),
        ["r" | "reset", n] => athlete(n).map(|i| Some(Line::Reset(i))),
        ["t" | "toggle", n] | [n] => athlete(n).map(|i| Some(Line::Toggle(i))),
        _ => Err(format!("unknown input '{line}'")),
    }
}

/// Line protocol on stdin: `N` or `t N` toggles athlete N, `s N` records a
/// split, `r N` resets, `l` lists, `q` quits.
pub async fn run(args: StopwatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.athletes == 0 {
        return Err("need at least one athlete".into());
    }
    let config = Config::load_or_default();
    let handle = CoachEngine::spawn(
        CoachSession::new(config.session_settings()),
        EngineOptions::from_config(&config),
        NullSink,
    );
    let ids: Vec<EntityId> = (0..args.athletes).map(|_| EntityId::new()).collect();

    let mut line_rx = stdin_lines();

    while let Some(line) = line_rx.recv().await {
        match parse_line(&line, args.athletes) {
            Ok(Some(Line::Toggle(i))) => handle.toggle_stopwatch(ids[i]).await?,
            Ok(Some(Line::Reset(i))) => handle.reset_stopwatch(ids[i]).await?,
            Ok(Some(Line::Split(i))) => {
                let split = handle.add_split(ids[i]).await?;
                if args.json {
                    println!(
                        "{}",
                        serde_json::to_string(&serde_json::json!({ "athlete": i + 1, "split": split }))?
                    );
                } else {
                    println!(
                        "athlete {} lap {} {}",
                        i + 1,
                        split.lap_index,
                        format_clock(std::time::Duration::from_millis(split.elapsed_ms), true)
                    );
                }
            }
            Ok(Some(Line::List)) => {
                print_times(&handle.fetch_snapshot().await?.stopwatches, &ids, args.json)?
            }
            Ok(Some(Line::Quit)) => break,
            Ok(None) => {}
            Err(e) => eprintln!("error: {e}"),
        }
    }

    let snapshot = handle.fetch_snapshot().await?;
    handle.shutdown().await?;
    print_times(&snapshot.stopwatches, &ids, args.json)
}

fn print_times(
    views: &[StopwatchView],
    ids: &[EntityId],
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    for (i, id) in ids.iter().enumerate() {
        let Some(view) = views.iter().find(|v| v.entity == *id) else {
            continue;
        };
        if json {
            let row = AthleteTime {
                athlete: i + 1,
                view,
            };
            println!("{}", serde_json::to_string(&row)?);
        } else {
            let state = if view.running { "running" } else { "stopped" };
            println!(
                "athlete {}: {} ({} laps, {state})",
                i + 1,
                view.display,
                view.lap_index
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopwatch_lines() {
        assert!(matches!(parse_line("2", 3), Ok(Some(Line::Toggle(1)))));
        assert!(matches!(parse_line("s 3", 3), Ok(Some(Line::Split(2)))));
        assert!(matches!(parse_line("r 1", 3), Ok(Some(Line::Reset(0)))));
        assert!(matches!(parse_line("q", 3), Ok(Some(Line::Quit))));
        assert!(matches!(parse_line("", 3), Ok(None)));
        assert!(parse_line("4", 3).is_err());
        assert!(parse_line("x y z", 3).is_err());
    }
}
