use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How lane times move on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    /// Unbounded count-up.
    CountUp,
    /// Count down from the lane target (or the phase length) to zero.
    Countdown,
    /// Count up against the active phase length; crossing it releases the
    /// next phase.
    #[default]
    SendOff,
    /// Count up, no boundary handling beyond the warning check.
    RestBased,
}

/// Outcome of moving a single lane for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ModeStep {
    Moved,
    /// Countdown reached zero on this tick.
    Finished,
    /// Send-off lane reached the phase length on this tick.
    Boundary,
}

impl TimerMode {
    pub const ALL: [TimerMode; 4] = [
        TimerMode::SendOff,
        TimerMode::Countdown,
        TimerMode::CountUp,
        TimerMode::RestBased,
    ];

    pub fn counts_down(self) -> bool {
        matches!(self, TimerMode::Countdown)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TimerMode::SendOff => "Send-off",
            TimerMode::Countdown => "Countdown",
            TimerMode::CountUp => "Count up",
            TimerMode::RestBased => "Rest-based",
        }
    }

    /// Apply `dt` to `current` and report any edge reached on this tick.
    ///
    /// `phase_target` is the active work/rest length, used by send-off.
    pub(crate) fn step(
        self,
        current: &mut Duration,
        dt: Duration,
        phase_target: Option<Duration>,
    ) -> ModeStep {
        match self {
            TimerMode::CountUp | TimerMode::RestBased => {
                *current += dt;
                ModeStep::Moved
            }
            TimerMode::Countdown => {
                *current = current.saturating_sub(dt);
                if current.is_zero() {
                    ModeStep::Finished
                } else {
                    ModeStep::Moved
                }
            }
            TimerMode::SendOff => {
                *current += dt;
                match phase_target {
                    Some(target) if !target.is_zero() && *current >= target => ModeStep::Boundary,
                    _ => ModeStep::Moved,
                }
            }
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimerMode::SendOff => "send_off",
            TimerMode::Countdown => "countdown",
            TimerMode::CountUp => "count_up",
            TimerMode::RestBased => "rest_based",
        };
        f.write_str(s)
    }
}

impl FromStr for TimerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "send_off" | "sendoff" => Ok(TimerMode::SendOff),
            "countdown" => Ok(TimerMode::Countdown),
            "count_up" | "countup" => Ok(TimerMode::CountUp),
            "rest_based" | "restbased" => Ok(TimerMode::RestBased),
            other => Err(format!("unknown timer mode: {other}")),
        }
    }
}
