//! Configuration management for octodisplay.
//!
//! Loads configuration from ${OCTODISPLAY_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// How many queued events the render loop applies per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DrainPolicy {
    /// Apply at most one event per tick; bursts are smoothed across ticks.
    #[default]
    OnePerTick,
    /// Apply every pending event each tick.
    Full,
}

impl DrainPolicy {
    /// Returns the maximum number of events to apply in one tick.
    pub fn budget(self) -> Option<usize> {
        match self {
            DrainPolicy::OnePerTick => Some(1),
            DrainPolicy::Full => None,
        }
    }
}

/// Poller schedule configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub progress_interval_secs: u64,
    pub temperature_interval_secs: u64,
    pub cpu_interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            progress_interval_secs: 10,
            temperature_interval_secs: 10,
            cpu_interval_secs: 1,
        }
    }
}

impl PollingConfig {
    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.progress_interval_secs)
    }

    pub fn temperature_interval(&self) -> Duration {
        Duration::from_secs(self.temperature_interval_secs)
    }

    pub fn cpu_interval(&self) -> Duration {
        Duration::from_secs(self.cpu_interval_secs)
    }
}

/// Render loop configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Render tick period in milliseconds.
    pub tick_ms: u64,
    pub drain: DrainPolicy,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tick_ms: 500,
            drain: DrainPolicy::default(),
        }
    }
}

impl DisplayConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log filter directive (overridden by `OCTODISPLAY_LOG`).
    pub log_level: String,
    /// Log file destination. Defaults to `$OCTODISPLAY_HOME/octodisplay.log`.
    pub log_file: Option<PathBuf>,
    pub polling: PollingConfig,
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Self::DEFAULT_LOG_LEVEL.to_string(),
            log_file: None,
            polling: PollingConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

pub mod paths {
    //! Path resolution for octodisplay configuration and log files.
    //!
    //! OCTODISPLAY_HOME resolution order:
    //! 1. OCTODISPLAY_HOME environment variable (if set)
    //! 2. ~/.config/octodisplay (default)
    //! 3. ./.octodisplay when no home directory is known

    use std::path::PathBuf;

    /// Returns the octodisplay home directory.
    pub fn octodisplay_home() -> PathBuf {
        if let Ok(home) = std::env::var("OCTODISPLAY_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".octodisplay"),
            |h| h.join(".config").join("octodisplay"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        octodisplay_home().join("config.toml")
    }

    /// Returns the default log file path.
    pub fn log_path() -> PathBuf {
        octodisplay_home().join("octodisplay.log")
    }
}

impl Config {
    pub const DEFAULT_LOG_LEVEL: &'static str = "info";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read, parsed or validated.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read, parsed or validated.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Config = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?
        } else {
            Config::default()
        };
        config
            .validate()
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    /// Returns the effective log file path.
    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(paths::log_path)
    }

    fn validate(&self) -> Result<()> {
        let intervals = [
            ("polling.progress_interval_secs", self.polling.progress_interval_secs),
            (
                "polling.temperature_interval_secs",
                self.polling.temperature_interval_secs,
            ),
            ("polling.cpu_interval_secs", self.polling.cpu_interval_secs),
            ("display.tick_ms", self.display.tick_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                bail!("{name} must be greater than zero");
            }
        }
        Ok(())
    }
}
