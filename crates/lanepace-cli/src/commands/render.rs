//! Human-readable output for effects and snapshots.

use lanepace_core::format::format_clock;
use lanepace_core::series::Phase;
use lanepace_core::{Effect, Haptic, LaneState, SessionSnapshot, SignalKind};
use std::time::Duration;

pub fn signal_name(kind: SignalKind) -> &'static str {
    match kind {
        SignalKind::Start => "start",
        SignalKind::Warning => "warning",
        SignalKind::Finish => "finish",
        SignalKind::SendOff => "send-off",
        SignalKind::SeriesComplete => "series complete",
    }
}

pub fn describe_effect(effect: &Effect) -> String {
    match effect {
        Effect::Signal(signal) => match signal.lane {
            Some(lane) => format!(
                "signal {} lane {} (volume {:.0}%)",
                signal_name(signal.kind),
                lane + 1,
                signal.volume * 100.0
            ),
            None => format!("signal {}", signal_name(signal.kind)),
        },
        Effect::Haptic(Haptic::Impact(style)) => format!("haptic impact {style:?}").to_lowercase(),
        Effect::Haptic(Haptic::Notification(style)) => {
            format!("haptic notification {style:?}").to_lowercase()
        }
        Effect::Split(split) => format!(
            "split {} lap {} at {}",
            split.entity,
            split.lap_index,
            format_clock(Duration::from_millis(split.elapsed_ms), true)
        ),
    }
}

fn lane_marker(state: LaneState) -> &'static str {
    match state {
        LaneState::Stopped => " ",
        LaneState::Running => ">",
        LaneState::Paused => "=",
        LaneState::Warning => "!",
        LaneState::Finished => "*",
    }
}

/// One status line: series position followed by every enabled lane.
pub fn status_line(snapshot: &SessionSnapshot) -> String {
    let seq = &snapshot.sequencer;
    let position = if seq.set_count == 0 {
        snapshot.mode.display_name().to_string()
    } else {
        let phase = match seq.phase {
            Phase::Work => "work",
            Phase::Rest => "rest",
        };
        format!(
            "set {}/{} rep {} {} ({}/{} done)",
            (seq.set_index + 1).min(seq.set_count),
            seq.set_count,
            seq.repetition + 1,
            phase,
            seq.completed_repetitions,
            seq.total_repetitions
        )
    };

    let lanes: Vec<String> = snapshot
        .lanes
        .iter()
        .filter(|lane| lane.enabled)
        .map(|lane| format!("{}{} {}", lane_marker(lane.state), lane.lane_number, lane.display))
        .collect();

    format!("[{position}] {}", lanes.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanepace_core::{ImpactStyle, Signal};

    #[test]
    fn effects_read_naturally() {
        assert_eq!(
            describe_effect(&Effect::Signal(Signal::lane(SignalKind::SendOff, 2, 0.5))),
            "signal send-off lane 3 (volume 50%)"
        );
        assert_eq!(describe_effect(&Effect::impact(ImpactStyle::Heavy)), "haptic impact heavy");
    }

    #[test]
    fn status_line_lists_enabled_lanes() {
        let mut session = lanepace_core::CoachSession::new(lanepace_core::SessionSettings {
            lane_count: 3,
            ..Default::default()
        });
        session.apply(lanepace_core::Command::ToggleLane { index: 1 });
        let line = status_line(&session.snapshot());
        assert!(line.contains("1 0:00.00"));
        assert!(!line.contains("2 0:00.00"));
        assert!(line.contains("3 0:00.00"));
    }
}
