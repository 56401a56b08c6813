//! Engine, source and output configuration.
//!
//! Frame dimensions are fixed for the lifetime of a run. When no explicit
//! height is configured it is derived from the native stream's aspect
//! ratio, scaled to the configured width.

use super::Dimensions;
use crate::engine::Mode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Upper bound on the tick interval.
const MAX_TICK_INTERVAL_MS: u64 = 10_000;

/// Configuration for the differencing engine and its scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Processing width in pixels.
    pub width: u32,
    /// Processing height in pixels (0 = derive from the native aspect ratio).
    pub height: u32,
    /// Delay between ticks in milliseconds.
    pub tick_interval_ms: u64,
    /// Mode enabled at startup.
    pub mode: Mode,
    /// Magnitude above which a pixel counts as changed in statistics.
    pub activity_threshold: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 0,
            tick_interval_ms: 40, // ~25 Hz
            mode: Mode::Temporal,
            activity_threshold: 16,
        }
    }
}

impl EngineConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.tick_interval_ms == 0 || self.tick_interval_ms > MAX_TICK_INTERVAL_MS {
            return Err(ConfigError::InvalidTickInterval);
        }
        Ok(())
    }

    /// Resolves the processing dimensions against the native stream size.
    pub fn dimensions(&self, native: Dimensions) -> Dimensions {
        if self.height == 0 {
            Dimensions::fit_to_width(native, self.width)
        } else {
            Dimensions::new(self.width, self.height)
        }
    }

    #[inline]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Configuration for the bundled synthetic source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Native stream width, used to derive the processing aspect ratio.
    pub native_width: u32,
    /// Native stream height.
    pub native_height: u32,
    /// Seed for the background noise.
    pub seed: u64,
    /// Maximum noise added to each background pixel.
    pub noise: u8,
    /// Side of the moving square in pixels.
    pub square_size: u32,
    /// Horizontal pixels the square moves per frame.
    pub speed: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            native_width: 640,
            native_height: 480,
            seed: 0,
            noise: 12,
            square_size: 48,
            speed: 6,
        }
    }
}

impl SourceConfig {
    #[inline]
    pub fn native_dimensions(&self) -> Dimensions {
        Dimensions::new(self.native_width, self.native_height)
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Number of ticks to run (0 = until interrupted).
    pub ticks: u64,
    /// Log statistics every N presented images.
    pub log_every: u64,
    /// Metrics server port (0 to disable).
    pub metrics_port: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            ticks: 0,
            log_every: 25,
            metrics_port: 0,
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    #[error("invalid tick interval (must be 1-10000 ms)")]
    InvalidTickInterval,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.engine.validate()?;
        Ok(config)
    }
}
