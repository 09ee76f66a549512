use std::time::Duration;

use clap::Subcommand;
use lanepace_core::format::format_clock;
use lanepace_core::series::{ladder, pyramid};
use lanepace_core::{Config, IntervalSet};

#[derive(Subcommand)]
pub enum SeriesAction {
    /// Work times rising to base * steps and back down; rest is half the work
    Pyramid {
        /// Base work time in seconds
        base: f64,
        /// Number of rising steps
        steps: u32,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Work times growing by a fixed increment; rest is 30% of the work
    Ladder {
        /// First work time in seconds
        start: f64,
        /// Increment in seconds
        increment: f64,
        /// Number of steps
        steps: u32,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// A single set of equal repetitions
    Simple {
        /// Repetitions
        reps: u32,
        /// Work time in seconds
        work: f64,
        /// Rest time in seconds
        #[arg(default_value = "0")]
        rest: f64,
        /// Distance label, e.g. "100m"
        #[arg(long)]
        distance: Option<String>,
        /// Target pace label, e.g. "1:05"
        #[arg(long)]
        pace: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show the series saved in the config
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove the saved series
    Clear,
}

#[derive(clap::Args)]
pub struct OutputArgs {
    /// Print as JSON
    #[arg(long)]
    json: bool,
    /// Store as the saved series (replaces, or appends with --append)
    #[arg(long)]
    save: bool,
    /// With --save, append instead of replacing
    #[arg(long, requires = "save")]
    append: bool,
}

pub fn run(action: SeriesAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SeriesAction::Pyramid {
            base,
            steps,
            output,
        } => emit(pyramid(base, steps)?, &output),
        SeriesAction::Ladder {
            start,
            increment,
            steps,
            output,
        } => emit(ladder(start, increment, steps)?, &output),
        SeriesAction::Simple {
            reps,
            work,
            rest,
            distance,
            pace,
            output,
        } => {
            let mut set = IntervalSet::new(reps, work, rest)?;
            if let Some(distance) = distance {
                set = set.with_distance(distance);
            }
            if let Some(pace) = pace {
                if lanepace_core::format::parse_pace(&pace).is_none() {
                    return Err(format!("pace must look like m:ss, got '{pace}'").into());
                }
                set = set.with_target_pace(pace);
            }
            emit(vec![set], &output)
        }
        SeriesAction::Show { json } => {
            let config = Config::load()?;
            print_sets(&config.series, json)
        }
        SeriesAction::Clear => {
            let mut config = Config::load()?;
            config.series.clear();
            config.save()?;
            println!("saved series cleared");
            Ok(())
        }
    }
}

fn emit(sets: Vec<IntervalSet>, output: &OutputArgs) -> Result<(), Box<dyn std::error::Error>> {
    print_sets(&sets, output.json)?;
    if output.save {
        let mut config = Config::load()?;
        if !output.append {
            config.series.clear();
        }
        config.series.extend(sets);
        config.save()?;
        tracing::info!(sets = config.series.len(), "saved series updated");
    }
    Ok(())
}

fn print_sets(sets: &[IntervalSet], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(sets)?);
        return Ok(());
    }
    for (i, set) in sets.iter().enumerate() {
        let mut line = format!(
            "{:>2}. {} x {} work / {} rest",
            i + 1,
            set.repetitions(),
            format_clock(set.work_time(), false),
            format_clock(set.rest_time(), false)
        );
        if !set.distance().is_empty() {
            line.push_str(&format!("  {}", set.distance()));
        }
        if !set.target_pace().is_empty() {
            line.push_str(&format!(" @ {}", set.target_pace()));
        }
        println!("{line}");
    }
    let total: Duration = sets.iter().map(IntervalSet::total_duration).sum();
    println!("total {}", format_clock(total, false));
    Ok(())
}
