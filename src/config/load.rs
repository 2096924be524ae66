use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then applies environment
/// overrides (prefix `SPINDECK__`) and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("SPINDECK")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        let fft = self.energy.fft_size;
        if fft < 16 || !fft.is_power_of_two() {
            return Err(format!(
                "energy.fft_size must be a power of two >= 16, got {fft}"
            ));
        }
        if !(self.energy.default_bpm.is_finite() && self.energy.default_bpm > 0.0) {
            return Err("energy.default_bpm must be a positive number".to_string());
        }
        if !(self.energy.bass_fraction > 0.0 && self.energy.bass_fraction <= 1.0) {
            return Err("energy.bass_fraction must be in (0, 1]".to_string());
        }
        if !(0.0..1.0).contains(&self.energy.smoothing) {
            return Err("energy.smoothing must be in [0, 1)".to_string());
        }
        if !(0.0..1.0).contains(&self.motion.max_speed_delta) {
            return Err("motion.max_speed_delta must be in [0, 1)".to_string());
        }
        if !(self.motion.reference_span.is_finite() && self.motion.reference_span > 0.0) {
            return Err("motion.reference_span must be a positive number".to_string());
        }
        if !(0.0..100.0).contains(&self.progress.step) {
            return Err("progress.step must be in [0, 100)".to_string());
        }
        if self.progress.tick_ms == 0 {
            return Err("progress.tick_ms must be >= 1".to_string());
        }
        if self.ui.frame_ms == 0 {
            return Err("ui.frame_ms must be >= 1".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `SPINDECK_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("SPINDECK_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/spindeck/config.toml`
/// or `~/.config/spindeck/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("spindeck").join("config.toml"))
}

/// Directory for log files: `$XDG_STATE_HOME/spindeck` or `~/.local/state/spindeck`.
pub fn default_log_dir() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", ".local/state").map(|d| d.join("spindeck"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}
