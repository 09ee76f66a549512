use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::format::parse_pace;

/// Rest share of the work time in a pyramid series.
pub const PYRAMID_REST_RATIO: f64 = 0.5;
/// Rest share of the work time in a ladder series.
pub const LADDER_REST_RATIO: f64 = 0.3;

/// A group of repeated work/rest segments with shared durations.
///
/// Serialized with durations as fractional seconds, e.g.
/// `{ repetitions = 4, work_secs = 60.0, rest_secs = 15.0 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawIntervalSet", into = "RawIntervalSet")]
pub struct IntervalSet {
    repetitions: u32,
    work_time: Duration,
    rest_time: Duration,
    distance: String,
    target_pace: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawIntervalSet {
    repetitions: u32,
    work_secs: f64,
    #[serde(default)]
    rest_secs: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    distance: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    target_pace: String,
}

impl TryFrom<RawIntervalSet> for IntervalSet {
    type Error = ValidationError;

    fn try_from(raw: RawIntervalSet) -> Result<Self, Self::Error> {
        Ok(IntervalSet::new(raw.repetitions, raw.work_secs, raw.rest_secs)?
            .with_distance(raw.distance)
            .with_target_pace(raw.target_pace))
    }
}

impl From<IntervalSet> for RawIntervalSet {
    fn from(set: IntervalSet) -> Self {
        RawIntervalSet {
            repetitions: set.repetitions,
            work_secs: set.work_time.as_secs_f64(),
            rest_secs: set.rest_time.as_secs_f64(),
            distance: set.distance,
            target_pace: set.target_pace,
        }
    }
}

impl IntervalSet {
    /// Validate and build a set from seconds.
    ///
    /// # Errors
    ///
    /// Fails when `repetitions` is zero, `work_secs` is not a positive
    /// finite number or `rest_secs` is negative or not finite.
    pub fn new(repetitions: u32, work_secs: f64, rest_secs: f64) -> Result<Self, ValidationError> {
        if repetitions == 0 {
            return Err(ValidationError::NoRepetitions(repetitions));
        }
        let work_time = match Duration::try_from_secs_f64(work_secs) {
            Ok(d) if !d.is_zero() => d,
            _ => return Err(ValidationError::InvalidWorkTime(work_secs)),
        };
        let rest_time = Duration::try_from_secs_f64(rest_secs)
            .map_err(|_| ValidationError::InvalidRestTime(rest_secs))?;
        Ok(Self {
            repetitions,
            work_time,
            rest_time,
            distance: String::new(),
            target_pace: String::new(),
        })
    }

    pub fn with_distance(mut self, distance: impl Into<String>) -> Self {
        self.distance = distance.into();
        self
    }

    pub fn with_target_pace(mut self, pace: impl Into<String>) -> Self {
        self.target_pace = pace.into();
        self
    }

    pub fn repetitions(&self) -> u32 {
        self.repetitions
    }

    pub fn work_time(&self) -> Duration {
        self.work_time
    }

    pub fn rest_time(&self) -> Duration {
        self.rest_time
    }

    pub fn distance(&self) -> &str {
        &self.distance
    }

    pub fn target_pace(&self) -> &str {
        &self.target_pace
    }

    /// Target pace label parsed as `m:ss`, if present and well formed.
    pub fn target_pace_duration(&self) -> Option<Duration> {
        parse_pace(&self.target_pace)
    }

    /// Total length of all repetitions, rests included.
    pub fn total_duration(&self) -> Duration {
        (self.work_time + self.rest_time) * self.repetitions
    }
}

/// Palindrome of single-repetition sets peaking at `base * steps`.
///
/// Work times are `base * i` for `i` in `1..=steps` and then back down to
/// `base`; each rest is half its work time.
///
/// # Errors
///
/// Fails for zero steps or a non-positive base.
pub fn pyramid(base_secs: f64, steps: u32) -> Result<Vec<IntervalSet>, ValidationError> {
    if steps == 0 {
        return Err(ValidationError::NoSteps);
    }
    (1..=steps)
        .chain((1..steps).rev())
        .map(|i| {
            let work = base_secs * f64::from(i);
            IntervalSet::new(1, work, work * PYRAMID_REST_RATIO)
        })
        .collect()
}

/// `steps` single-repetition sets growing by `increment` from `start`.
///
/// Each rest is 30% of its work time.
///
/// # Errors
///
/// Fails for zero steps or when any step ends up with a non-positive work
/// time (e.g. a negative increment running past zero).
pub fn ladder(
    start_secs: f64,
    increment_secs: f64,
    steps: u32,
) -> Result<Vec<IntervalSet>, ValidationError> {
    if steps == 0 {
        return Err(ValidationError::NoSteps);
    }
    (0..steps)
        .map(|i| {
            let work = start_secs + increment_secs * f64::from(i);
            IntervalSet::new(1, work, work * LADDER_REST_RATIO)
        })
        .collect()
}
