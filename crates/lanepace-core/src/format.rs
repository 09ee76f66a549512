//! Display helpers for elapsed times and pace labels.

use std::time::Duration;

/// `m:ss.cc`, or `h:mm:ss.cc` past one hour, from rounded milliseconds.
///
/// Without `centis` the fractional part is dropped.
pub fn format_clock(elapsed: Duration, centis: bool) -> String {
    let total_ms = (elapsed.as_secs_f64() * 1000.0).round() as u64;
    let cs = (total_ms % 1000) / 10;
    let total_secs = total_ms / 1000;
    let s = total_secs % 60;
    let m = (total_secs / 60) % 60;
    let h = total_secs / 3600;
    match (h > 0, centis) {
        (true, true) => format!("{h}:{m:02}:{s:02}.{cs:02}"),
        (true, false) => format!("{h}:{m:02}:{s:02}"),
        (false, true) => format!("{m}:{s:02}.{cs:02}"),
        (false, false) => format!("{m}:{s:02}"),
    }
}

/// `m:ss.cc` with unbounded minutes, truncating to centiseconds.
pub fn format_lane_time(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let cs = elapsed.subsec_millis() / 10;
    format!("{}:{:02}.{:02}", total_secs / 60, total_secs % 60, cs)
}

/// Parse a `m:ss` pace label such as `"1:05"`.
///
/// Seconds may carry a fraction (`"0:32.5"`). Anything else is `None`.
pub fn parse_pace(label: &str) -> Option<Duration> {
    let (minutes, seconds) = label.trim().split_once(':')?;
    let minutes: u64 = minutes.trim().parse().ok()?;
    let seconds: f64 = seconds.trim().parse().ok()?;
    if !(0.0..60.0).contains(&seconds) {
        return None;
    }
    let secs = Duration::try_from_secs_f64(seconds).ok()?;
    Some(Duration::from_secs(minutes.checked_mul(60)?) + secs)
}
