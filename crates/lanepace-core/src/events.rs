use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audible cue kinds understood by the signal playback collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Start,
    Warning,
    Finish,
    SendOff,
    SeriesComplete,
}

/// A cue to play, optionally scoped to one lane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    /// Lane index the cue belongs to; `None` for global cues.
    pub lane: Option<usize>,
    /// Target volume in `0.0..=1.0`. Global cues play at full volume.
    pub volume: f32,
}

impl Signal {
    pub fn global(kind: SignalKind) -> Self {
        Self {
            kind,
            lane: None,
            volume: 1.0,
        }
    }

    pub fn lane(kind: SignalKind, lane: usize, volume: f32) -> Self {
        Self {
            kind,
            lane: Some(lane),
            volume,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactStyle {
    Light,
    Medium,
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStyle {
    Warning,
    Success,
}

/// Tactile feedback request for the haptics collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "category", content = "style", rename_all = "lowercase")]
pub enum Haptic {
    Impact(ImpactStyle),
    Notification(NotificationStyle),
}

/// A lap split taken on a free-running stopwatch.
///
/// The record store collaborator persists these; the core only emits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRecord {
    pub entity: String,
    pub lap_index: u32,
    pub elapsed_ms: u64,
    pub recorded_at: DateTime<Utc>,
}

/// Side effect produced by a state transition.
///
/// Transitions return a list of these instead of calling the playback,
/// haptics or record-store collaborators directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    Signal(Signal),
    Haptic(Haptic),
    Split(SplitRecord),
}

impl Effect {
    pub fn impact(style: ImpactStyle) -> Self {
        Effect::Haptic(Haptic::Impact(style))
    }

    pub fn notify(style: NotificationStyle) -> Self {
        Effect::Haptic(Haptic::Notification(style))
    }

    pub fn signal_kind(&self) -> Option<SignalKind> {
        match self {
            Effect::Signal(s) => Some(s.kind),
            _ => None,
        }
    }
}
