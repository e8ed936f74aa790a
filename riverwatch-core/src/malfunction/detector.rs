//! Heuristic sensor malfunction classification

use alloc::string::{String, ToString};
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    metric::{Bound, MetricKind},
    stats,
};
use crate::{
    constants::detector::*,
    errors::ConfigError,
    model::TimedValue,
};

/// Detector thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct DetectorConfig {
    /// Readings required before anything is flagged
    pub min_history: usize,
    /// Trailing readings examined by the stuck and erratic checks
    pub window: usize,
    /// Erratic when std dev exceeds this fraction of the mean
    pub erratic_ratio: f64,
    /// Erratic check skipped unless the mean exceeds this
    pub erratic_min_mean: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_history: DEFAULT_MIN_HISTORY,
            window: DEFAULT_TRAILING_WINDOW,
            erratic_ratio: DEFAULT_ERRATIC_RATIO,
            erratic_min_mean: DEFAULT_ERRATIC_MIN_MEAN,
        }
    }
}

impl DetectorConfig {
    /// Reject settings that would make a check meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_history == 0 {
            return Err(ConfigError::NotPositive("detector.min_history"));
        }
        if self.window == 0 {
            return Err(ConfigError::NotPositive("detector.window"));
        }
        if !(self.erratic_ratio.is_finite() && self.erratic_ratio > 0.0) {
            return Err(ConfigError::NotPositive("detector.erratic_ratio"));
        }
        if !self.erratic_min_mean.is_finite() {
            return Err(ConfigError::Inconsistent("detector.erratic_min_mean must be finite"));
        }
        Ok(())
    }
}

/// Why a sensor was flagged
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(tag = "kind", rename_all = "snake_case"))]
pub enum MalfunctionReason {
    /// Current value outside the metric's plausible range
    OutOfRange {
        metric: MetricKind,
        value: f64,
        bound: Bound,
    },
    /// Metric without a rule reported a negative value
    NegativeValue { value: f64 },
    /// Every value in the trailing window is identical
    Stuck { value: f64, samples: usize },
    /// Spread of the trailing window is large relative to its mean
    Erratic { mean: f64, std_dev: f64, ratio: f64 },
}

impl fmt::Display for MalfunctionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange {
                metric,
                value,
                bound: Bound::Upper(max),
            } => write!(f, "{metric} reading {value} is above the maximum of {max}"),
            Self::OutOfRange {
                metric,
                value,
                bound: Bound::Lower(min),
            } => write!(f, "{metric} reading {value} is below the minimum of {min}"),
            Self::NegativeValue { value } => write!(f, "negative value detected ({value})"),
            Self::Stuck { value, samples } => write!(
                f,
                "reporting constant value {value} over the last {samples} readings, may be stuck"
            ),
            Self::Erratic { mean, std_dev, ratio } => write!(
                f,
                "erratic readings: standard deviation {std_dev:.2} exceeds {:.0}% of mean {mean:.2}",
                ratio * 100.0
            ),
        }
    }
}

/// Classification of a sensor's current state
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(tag = "status", content = "reason", rename_all = "snake_case"))]
pub enum Diagnosis {
    Healthy,
    Malfunctioning(MalfunctionReason),
}

impl Diagnosis {
    /// Whether any check fired
    pub fn is_malfunctioning(&self) -> bool {
        matches!(self, Self::Malfunctioning(_))
    }

    /// Structured reason, if flagged
    pub fn reason(&self) -> Option<&MalfunctionReason> {
        match self {
            Self::Healthy => None,
            Self::Malfunctioning(reason) => Some(reason),
        }
    }

    /// Human-readable reason, if flagged
    pub fn reason_text(&self) -> Option<String> {
        self.reason().map(|reason| reason.to_string())
    }
}

/// Stateless classifier, re-evaluated from scratch on every call
///
/// Checks run in priority order and the first that fires wins:
///
/// 1. **Range**: current value against the metric's plausible range, or a
///    negative value for metrics without a rule
/// 2. **Stuck**: trailing window holds one repeated value
/// 3. **Erratic**: population std dev of the trailing window above
///    `erratic_ratio * mean`, only when the mean exceeds `erratic_min_mean`
///
/// The erratic test is scale-relative. For windows whose mean is near zero or
/// negative (ORP, sub-zero temperatures) it is skipped by the mean cut-off
/// rather than adapted, so noisy low-valued channels are not caught by it.
#[derive(Debug, Clone, Copy, Default)]
pub struct MalfunctionDetector {
    config: DetectorConfig,
}

impl MalfunctionDetector {
    /// Detector with the given thresholds
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Active thresholds
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Classify by free-text sensor name, see [`MetricKind::from_sensor_name`]
    pub fn detect(&self, sensor_name: &str, readings: &[TimedValue], current_value: f64) -> Diagnosis {
        self.detect_metric(MetricKind::from_sensor_name(sensor_name), readings, current_value)
    }

    /// Classify with an explicit metric kind
    ///
    /// `readings` are ordered oldest first. With fewer than `min_history`
    /// entries the sensor is always reported healthy, whatever the current
    /// value.
    pub fn detect_metric(&self, metric: MetricKind, readings: &[TimedValue], current_value: f64) -> Diagnosis {
        if readings.len() < self.config.min_history {
            return Diagnosis::Healthy;
        }

        if let Some(reason) = range_check(metric, current_value) {
            return Diagnosis::Malfunctioning(reason);
        }

        let window = stats::trailing(readings, self.config.window);

        if stats::all_identical(window) {
            return Diagnosis::Malfunctioning(MalfunctionReason::Stuck {
                value: window[0].value,
                samples: window.len(),
            });
        }

        if let Some(reason) = self.erratic_check(window) {
            return Diagnosis::Malfunctioning(reason);
        }

        Diagnosis::Healthy
    }

    fn erratic_check(&self, window: &[TimedValue]) -> Option<MalfunctionReason> {
        let mean = stats::mean(window)?;
        let std_dev = stats::population_std_dev(window, mean)?;

        if std_dev > self.config.erratic_ratio * mean && mean > self.config.erratic_min_mean {
            Some(MalfunctionReason::Erratic {
                mean,
                std_dev,
                ratio: self.config.erratic_ratio,
            })
        } else {
            None
        }
    }
}

fn range_check(metric: MetricKind, value: f64) -> Option<MalfunctionReason> {
    match metric.valid_range() {
        Some(range) => range
            .violation(value)
            .map(|bound| MalfunctionReason::OutOfRange { metric, value, bound }),
        None if value < 0.0 => Some(MalfunctionReason::NegativeValue { value }),
        None => None,
    }
}
