mod config;

pub use config::{Config, FeedbackConfig, LanesConfig, TimerConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `<config dir>/lanepace[-dev]/` based on LANEPACE_ENV.
///
/// LANEPACE_CONFIG_DIR overrides the whole path. Set LANEPACE_ENV=dev to
/// use the development directory. The directory is created on save, not
/// here.
///
/// # Errors
/// Returns an error if no config directory can be determined.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = std::env::var_os("LANEPACE_CONFIG_DIR").filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    let base_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

    let env = std::env::var("LANEPACE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("lanepace-dev")
    } else {
        base_dir.join("lanepace")
    };

    Ok(dir)
}
