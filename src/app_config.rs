use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs;
use std::path::Path;

use crate::errors::AppError;

/// Application configuration, loaded from JSON and validated before use
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Matching heuristics and synthesized timing
    #[serde(default)]
    pub alignment: AlignmentConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Parameters of the greedy cue-to-scene matcher.
///
/// The defaults are the tuned values the matcher was calibrated with; changing
/// them changes which scenes fall back to synthesized timing.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AlignmentConfig {
    /// Minimum buffer/target length ratio for a prefix ("progress") match
    #[serde(default = "default_min_progress_ratio")]
    pub min_progress_ratio: f64,

    /// Buffer/target length ratio at which a scene is accepted on length alone
    #[serde(default = "default_overflow_ratio")]
    pub overflow_ratio: f64,

    /// Minimum buffered normalized characters for an overflow match
    #[serde(default = "default_overflow_min_chars")]
    pub overflow_min_chars: usize,

    /// Duration given to scenes whose timing is synthesized
    #[serde(default = "default_fallback_duration_secs")]
    pub fallback_duration_secs: f64,

    /// Distance of the screenshot point before a narrated scene's end
    #[serde(default = "default_screenshot_offset_secs")]
    pub screenshot_offset_secs: f64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            min_progress_ratio: default_min_progress_ratio(),
            overflow_ratio: default_overflow_ratio(),
            overflow_min_chars: default_overflow_min_chars(),
            fallback_duration_secs: default_fallback_duration_secs(),
            screenshot_offset_secs: default_screenshot_offset_secs(),
        }
    }
}

/// Output configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    #[serde(default = "default_true")]
    pub pretty: bool,

    /// Treat a document without scene groups as a failure
    #[serde(default = "default_true")]
    pub require_scenes: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_true(),
            require_scenes: default_true(),
        }
    }
}

/// Log level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_min_progress_ratio() -> f64 {
    0.85
}

fn default_overflow_ratio() -> f64 {
    1.35
}

fn default_overflow_min_chars() -> usize {
    40
}

fn default_fallback_duration_secs() -> f64 {
    2.0
}

fn default_screenshot_offset_secs() -> f64 {
    0.2
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Parse a configuration from JSON text; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AppError> {
        let alignment = &self.alignment;

        if !(alignment.min_progress_ratio > 0.0 && alignment.min_progress_ratio <= 1.0) {
            return Err(AppError::Config(format!(
                "min_progress_ratio must be in (0, 1], got {}",
                alignment.min_progress_ratio
            )));
        }

        if !(alignment.overflow_ratio > 0.0) {
            return Err(AppError::Config(format!(
                "overflow_ratio must be positive, got {}",
                alignment.overflow_ratio
            )));
        }

        if !(alignment.fallback_duration_secs > 0.0) {
            return Err(AppError::Config(format!(
                "fallback_duration_secs must be positive, got {}",
                alignment.fallback_duration_secs
            )));
        }

        if !(alignment.screenshot_offset_secs >= 0.0) {
            return Err(AppError::Config(format!(
                "screenshot_offset_secs must not be negative, got {}",
                alignment.screenshot_offset_secs
            )));
        }

        Ok(())
    }
}
