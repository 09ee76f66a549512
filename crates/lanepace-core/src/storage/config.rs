//! TOML-based application configuration.
//!
//! Stores session defaults:
//! - Timer mode and tick rates
//! - Lane count, naming and volume
//! - Audio and haptic feedback switches
//! - An optional saved interval series
//!
//! Configuration is stored at `<config dir>/lanepace/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;
use crate::series::IntervalSet;
use crate::session::SessionSettings;
use crate::timer::{TimerMode, DEFAULT_LANE_COUNT};

/// Timer behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default)]
    pub mode: TimerMode,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_stopwatch_tick_ms")]
    pub stopwatch_tick_ms: u64,
    #[serde(default = "default_pre_warning_secs")]
    pub pre_warning_secs: f64,
    #[serde(default = "default_pace_tolerance_secs")]
    pub pace_tolerance_secs: f64,
}

/// Lane layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanesConfig {
    #[serde(default = "default_lane_count")]
    pub count: usize,
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,
    #[serde(default = "default_volume")]
    pub default_volume: f32,
}

/// Feedback switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackConfig {
    #[serde(default = "default_true")]
    pub audio: bool,
    #[serde(default = "default_true")]
    pub haptics: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<config dir>/lanepace/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub lanes: LanesConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
    /// Saved series loaded into new sessions.
    #[serde(default)]
    pub series: Vec<IntervalSet>,
}

// Default functions
fn default_tick_interval_ms() -> u64 {
    100
}
fn default_stopwatch_tick_ms() -> u64 {
    20
}
fn default_pre_warning_secs() -> f64 {
    10.0
}
fn default_pace_tolerance_secs() -> f64 {
    2.0
}
fn default_lane_count() -> usize {
    DEFAULT_LANE_COUNT
}
fn default_name_prefix() -> String {
    "Lane".into()
}
fn default_volume() -> f32 {
    1.0
}
fn default_true() -> bool {
    true
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            mode: TimerMode::default(),
            tick_interval_ms: default_tick_interval_ms(),
            stopwatch_tick_ms: default_stopwatch_tick_ms(),
            pre_warning_secs: default_pre_warning_secs(),
            pace_tolerance_secs: default_pace_tolerance_secs(),
        }
    }
}

impl Default for LanesConfig {
    fn default() -> Self {
        Self {
            count: default_lane_count(),
            name_prefix: default_name_prefix(),
            default_volume: default_volume(),
        }
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            audio: true,
            haptics: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer: TimerConfig::default(),
            lanes: LanesConfig::default(),
            feedback: FeedbackConfig::default(),
            series: Vec::new(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Location of the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if no config directory can be resolved.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit file, writing defaults there if it is missing.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("using default configuration: {e}");
            Self::default()
        })
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit file, creating parent directories.
    ///
    /// # Errors
    ///
    /// See [`Config::save`].
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving. The existing value's type
    /// decides how `value` is parsed.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field. The config is left unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Every leaf key with its current value, in dot-path form.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let key = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&key, v, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }

    /// Reject values a session cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        if self.timer.tick_interval_ms == 0 {
            return Err(invalid("timer.tick_interval_ms", "must be at least 1"));
        }
        if self.timer.stopwatch_tick_ms == 0 {
            return Err(invalid("timer.stopwatch_tick_ms", "must be at least 1"));
        }
        if !self.timer.pre_warning_secs.is_finite() || self.timer.pre_warning_secs < 0.0 {
            return Err(invalid("timer.pre_warning_secs", "must be zero or more seconds"));
        }
        if !self.timer.pace_tolerance_secs.is_finite() || self.timer.pace_tolerance_secs < 0.0 {
            return Err(invalid("timer.pace_tolerance_secs", "must be zero or more seconds"));
        }
        if !(0.0..=1.0).contains(&self.lanes.default_volume) {
            return Err(invalid("lanes.default_volume", "must be between 0.0 and 1.0"));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.timer.tick_interval_ms.max(1))
    }

    pub fn stopwatch_tick(&self) -> Duration {
        Duration::from_millis(self.timer.stopwatch_tick_ms.max(1))
    }

    /// Session defaults derived from this config.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            mode: self.timer.mode,
            lane_count: self.lanes.count,
            lane_prefix: self.lanes.name_prefix.clone(),
            default_volume: self.lanes.default_volume.clamp(0.0, 1.0),
            pre_warning: secs_or_zero(self.timer.pre_warning_secs),
            pace_tolerance: secs_or_zero(self.timer.pace_tolerance_secs),
            audio: self.feedback.audio,
            haptics: self.feedback.haptics,
            sets: self.series.clone(),
        }
    }
}

fn secs_or_zero(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [timer]
            mode = "countdown"

            [[series]]
            repetitions = 4
            work_secs = 60.0
            rest_secs = 15.0
            "#,
        )
        .unwrap();
        assert_eq!(parsed.timer.mode, TimerMode::Countdown);
        assert_eq!(parsed.timer.tick_interval_ms, 100);
        assert_eq!(parsed.lanes.count, 8);
        assert_eq!(parsed.series.len(), 1);
        assert_eq!(parsed.series[0].repetitions(), 4);
    }

    #[test]
    fn invalid_series_in_file_is_rejected() {
        let result: Result<Config, _> = toml::from_str(
            r#"
            [[series]]
            repetitions = 0
            work_secs = 60.0
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("feedback.audio").as_deref(), Some("true"));
        assert_eq!(cfg.get("timer.tick_interval_ms").as_deref(), Some("100"));
        assert_eq!(cfg.get("timer.mode").as_deref(), Some("send_off"));
        assert!(cfg.get("timer.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_json_value_by_path_updates_nested_bool() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "feedback.haptics", "false").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "feedback.haptics").unwrap(),
            &serde_json::Value::Bool(false)
        );
    }

    #[test]
    fn set_json_value_by_path_rejects_unknown_key() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = Config::set_json_value_by_path(&mut json, "lanes.nonexistent_key", "value");
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_parses_by_existing_type() {
        let mut cfg = Config::default();
        cfg.set("lanes.count", "6").unwrap();
        cfg.set("timer.pre_warning_secs", "7.5").unwrap();
        cfg.set("timer.mode", "countdown").unwrap();
        cfg.set("lanes.name_prefix", "Bahn").unwrap();
        assert_eq!(cfg.lanes.count, 6);
        assert_eq!(cfg.timer.pre_warning_secs, 7.5);
        assert_eq!(cfg.timer.mode, TimerMode::Countdown);
        assert_eq!(cfg.lanes.name_prefix, "Bahn");
    }

    #[test]
    fn set_rejects_bad_values_and_keeps_config() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("feedback.audio", "loud"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(cfg.set("timer.mode", "sideways").is_err());
        assert!(cfg.set("timer.tick_interval_ms", "0").is_err());
        assert!(cfg.set("lanes.default_volume", "1.5").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn entries_lists_leaf_keys() {
        let entries = Config::default().entries();
        assert!(entries.contains(&("timer.mode".to_string(), "send_off".to_string())));
        assert!(entries.contains(&("lanes.count".to_string(), "8".to_string())));
    }

    #[test]
    fn session_settings_follow_config() {
        let mut cfg = Config::default();
        cfg.lanes.count = 3;
        cfg.feedback.audio = false;
        cfg.timer.pre_warning_secs = 5.0;
        let settings = cfg.session_settings();
        assert_eq!(settings.lane_count, 3);
        assert!(!settings.audio);
        assert_eq!(settings.pre_warning, Duration::from_secs(5));
        assert_eq!(cfg.tick_interval(), Duration::from_millis(100));
    }
}
