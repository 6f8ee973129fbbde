//! Detector configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How a box's aggregate variability is computed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum BoxSumMode {
    /// Samples the box's anchor (top-left) cell once per footprint cell.
    /// Reproduces the historical detector output.
    #[default]
    #[strum(serialize = "anchor_sample")]
    AnchorSample,
    /// Sums every cell of the footprint.
    #[strum(serialize = "footprint")]
    Footprint,
}

/// Parameters of a detection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Time window duration in seconds.
    pub window_duration: f64,
    /// Minimum fraction of a window that must be good time for the window
    /// to be used.
    pub good_time_ratio: f64,
    /// Side of the scanning box in pixels.
    pub box_size: usize,
    /// Multiplier applied to the global threshold.
    pub detection_level: f64,
    /// Upper bound on sensors processed concurrently.
    pub max_workers: usize,
    pub box_sum: BoxSumMode,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_duration: 100.0,
            good_time_ratio: 0.9,
            box_size: 5,
            detection_level: 10.0,
            max_workers: 12,
            box_sum: BoxSumMode::AnchorSample,
        }
    }
}

pub(crate) fn check_window_duration(seconds: f64) -> Result<(), ConfigError> {
    if seconds.is_finite() && seconds > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::WindowDuration(seconds))
    }
}

pub(crate) fn check_good_time_ratio(ratio: f64) -> Result<(), ConfigError> {
    if ratio > 0.0 && ratio <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::GoodTimeRatio(ratio))
    }
}

impl DetectorConfig {
    /// Loads a YAML or JSON configuration and validates it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = common::config_file::load(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_window_duration(self.window_duration)?;
        check_good_time_ratio(self.good_time_ratio)?;
        if self.box_size == 0 {
            return Err(ConfigError::BoxSize);
        }
        if !(self.detection_level.is_finite() && self.detection_level > 0.0) {
            return Err(ConfigError::DetectionLevel(self.detection_level));
        }
        if self.max_workers == 0 {
            return Err(ConfigError::MaxWorkers);
        }
        Ok(())
    }

    pub fn with_window_duration(mut self, seconds: f64) -> Self {
        self.window_duration = seconds;
        self
    }

    pub fn with_good_time_ratio(mut self, ratio: f64) -> Self {
        self.good_time_ratio = ratio;
        self
    }

    pub fn with_box_size(mut self, box_size: usize) -> Self {
        self.box_size = box_size;
        self
    }

    pub fn with_detection_level(mut self, level: f64) -> Self {
        self.detection_level = level;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_box_sum(mut self, mode: BoxSumMode) -> Self {
        self.box_sum = mode;
        self
    }
}
