//! Configuration management for uplink-dedupe.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::error::DedupeError;

/// Default dedupe window.
pub const DEFAULT_DEDUPE_WINDOW: Duration = Duration::from_millis(200);
/// Default collection window.
pub const DEFAULT_COLLECT_WINDOW: Duration = Duration::from_secs(5);

/// Window durations for a [`Deduplicator`](crate::Deduplicator).
///
/// Both windows are measured from the first message of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    /// Time after which the early snapshot is reported.
    pub dedupe: Duration,
    /// Time after which the full batch is reported and the session retired.
    pub collect: Duration,
}

impl WindowConfig {
    /// Create a validated window configuration.
    ///
    /// The dedupe window must end strictly before the collection window.
    pub fn new(dedupe: Duration, collect: Duration) -> crate::Result<Self> {
        if dedupe.is_zero() || collect.is_zero() {
            return Err(DedupeError::ZeroWindow);
        }
        if dedupe >= collect {
            return Err(DedupeError::InvalidWindows { dedupe, collect });
        }
        Ok(Self { dedupe, collect })
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            dedupe: DEFAULT_DEDUPE_WINDOW,
            collect: DEFAULT_COLLECT_WINDOW,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Window configuration.
    pub windows: WindowsSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Window configuration section, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowsSection {
    /// Dedupe window in milliseconds.
    pub dedupe_ms: u64,
    /// Collection window in milliseconds.
    pub collect_ms: u64,
}

impl Default for WindowsSection {
    fn default() -> Self {
        Self {
            dedupe_ms: DEFAULT_DEDUPE_WINDOW.as_millis() as u64,
            collect_ms: DEFAULT_COLLECT_WINDOW.as_millis() as u64,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(ms) = std::env::var("UPLINK_DEDUPE_WINDOW_MS") {
            if let Ok(ms) = ms.parse() {
                self.windows.dedupe_ms = ms;
            }
        }

        if let Ok(ms) = std::env::var("UPLINK_COLLECT_WINDOW_MS") {
            if let Ok(ms) = ms.parse() {
                self.windows.collect_ms = ms;
            }
        }

        if let Ok(level) = std::env::var("UPLINK_DEDUPE_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ms) = args.dedupe_ms {
            self.windows.dedupe_ms = ms;
        }

        if let Some(ms) = args.collect_ms {
            self.windows.collect_ms = ms;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// Convert to a validated [`WindowConfig`].
    pub fn to_window_config(&self) -> Result<WindowConfig, ConfigError> {
        WindowConfig::new(
            Duration::from_millis(self.windows.dedupe_ms),
            Duration::from_millis(self.windows.collect_ms),
        )
        .map_err(ConfigError::InvalidWindows)
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Window durations rejected.
    InvalidWindows(DedupeError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidWindows(e) => write!(f, "invalid window configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
