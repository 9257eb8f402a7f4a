//! Application configuration.
//!
//! Values come from three layers: built-in defaults, the JSON config file,
//! and `DISPLAYKIT_*` environment overrides applied last.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{DisplaykitError, DisplaykitResult};

/// Environment variable overriding the repaint delay (milliseconds).
pub const ENV_REPAINT_DELAY: &str = "DISPLAYKIT_REPAINT_DELAY";
/// Environment variable overriding the lower DPI bound.
pub const ENV_MIN_DPI: &str = "DISPLAYKIT_MIN_DPI";
/// Environment variable overriding the upper DPI bound.
pub const ENV_MAX_DPI: &str = "DISPLAYKIT_MAX_DPI";
/// Environment variable toggling per-monitor workarea lookups.
pub const ENV_MONITOR_WORKAREA: &str = "DISPLAYKIT_MONITOR_WORKAREA";
/// Environment variable overriding the backend option string.
pub const ENV_BACKENDS: &str = "DISPLAYKIT_OPENGL";
/// Environment variable forcing backends past their blocklists.
pub const ENV_FORCE_ENABLE: &str = "DISPLAYKIT_FORCE_ENABLE";

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Rendering backend selection and self-test parameters.
    pub render: RenderSettings,

    /// Screen geometry normalization parameters.
    pub geometry: GeometrySettings,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "displaykit=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

/// Rendering backend selection and self-test parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Backend option string, e.g. `"native"` or `"opengl:native,gtk"`.
    pub backends: String,

    /// Let backends skip their driver blocklists.
    pub force_enable: bool,

    /// Delay between repaints in interactive self-tests. `0` disables
    /// the timer-driven repeat.
    pub repaint_delay_ms: u64,

    /// Largest window the backend is asked to support.
    pub max_window_size: (u32, u32),

    /// Requested pixel depth, `0` for the backend default.
    pub pixel_depth: u32,

    /// Hard upper bound callers put on a single self-test run.
    pub self_test_timeout_secs: u64,
}

/// Screen geometry normalization parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometrySettings {
    /// Lowest DPI accepted as plausible.
    pub min_dpi: u32,

    /// Highest DPI accepted as plausible.
    pub max_dpi: u32,

    /// Prefer the workarea a monitor reports itself over the
    /// display-wide per-monitor workarea list.
    pub prefer_monitor_workarea: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            backends: "native".to_string(),
            force_enable: false,
            repaint_delay_ms: 0,
            max_window_size: (1024, 1024),
            pixel_depth: 24,
            self_test_timeout_secs: 10,
        }
    }
}

impl Default for GeometrySettings {
    fn default() -> Self {
        Self {
            min_dpi: 10,
            max_dpi: 500,
            prefer_monitor_workarea: true,
        }
    }
}

impl GeometrySettings {
    /// Replace the DPI bounds, rejecting non-positive or inverted pairs.
    pub fn set_dpi_bounds(&mut self, min_dpi: u32, max_dpi: u32) -> DisplaykitResult<()> {
        if min_dpi == 0 || max_dpi == 0 {
            return Err(DisplaykitError::config(format!(
                "DPI bounds must be positive, got {min_dpi}..{max_dpi}"
            )));
        }
        if min_dpi >= max_dpi {
            return Err(DisplaykitError::config(format!(
                "minimum DPI {min_dpi} must be lower than maximum DPI {max_dpi}"
            )));
        }
        self.min_dpi = min_dpi;
        self.max_dpi = max_dpi;
        Ok(())
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults,
    /// then apply environment overrides.
    pub fn load() -> Self {
        let mut config = Self::load_file();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    fn load_file() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Apply `DISPLAYKIT_*` overrides read through `lookup`.
    ///
    /// Invalid values are logged and ignored; the previous value stays.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_REPAINT_DELAY) {
            match raw.trim().parse::<u64>() {
                Ok(delay) => self.render.repaint_delay_ms = delay,
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "Ignoring invalid {ENV_REPAINT_DELAY}")
                }
            }
        }

        if let Some(raw) = lookup(ENV_BACKENDS) {
            if !raw.trim().is_empty() {
                self.render.backends = raw.trim().to_string();
            }
        }

        if let Some(raw) = lookup(ENV_FORCE_ENABLE) {
            match parse_bool(&raw) {
                Some(force) => self.render.force_enable = force,
                None => tracing::warn!(value = %raw, "Ignoring invalid {ENV_FORCE_ENABLE}"),
            }
        }

        if let Some(raw) = lookup(ENV_MONITOR_WORKAREA) {
            match parse_bool(&raw) {
                Some(prefer) => self.geometry.prefer_monitor_workarea = prefer,
                None => tracing::warn!(value = %raw, "Ignoring invalid {ENV_MONITOR_WORKAREA}"),
            }
        }

        let min = lookup(ENV_MIN_DPI);
        let max = lookup(ENV_MAX_DPI);
        if min.is_some() || max.is_some() {
            let parse = |raw: Option<String>, current: u32| -> Option<u32> {
                match raw {
                    Some(value) => value.trim().parse::<u32>().ok(),
                    None => Some(current),
                }
            };
            let bounds = (
                parse(min, self.geometry.min_dpi),
                parse(max, self.geometry.max_dpi),
            );
            match bounds {
                (Some(min_dpi), Some(max_dpi)) => {
                    if let Err(e) = self.geometry.set_dpi_bounds(min_dpi, max_dpi) {
                        tracing::warn!(error = %e, "Ignoring DPI bound overrides");
                    }
                }
                _ => tracing::warn!("Ignoring unparsable {ENV_MIN_DPI}/{ENV_MAX_DPI} overrides"),
            }
        }
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("displaykit").join("config.json")
}
