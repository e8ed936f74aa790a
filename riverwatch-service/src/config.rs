//! Service configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! freshness_threshold_minutes = 15
//! analysis_ttl_minutes = 60
//! insert_batch_size = 1000
//! calibration_password = "change-me"
//!
//! [detector]
//! min_history = 10
//! window = 20
//! erratic_ratio = 0.8
//! erratic_min_mean = 1.0
//! ```
//!
//! The calibration password is better kept out of files:
//! `RIVERWATCH_CALIBRATION_PASSWORD` overrides it (see
//! [`MonitorConfig::with_env_overrides`]).

use std::fmt;
use std::path::{Path, PathBuf};

use riverwatch_core::{
    constants::{DEFAULT_ANALYSIS_TTL_MINUTES, DEFAULT_FRESHNESS_THRESHOLD_MINUTES, DEFAULT_INSERT_BATCH_SIZE},
    AnalysisTtl, ConfigError, DetectorConfig, FreshnessConfig,
};
use serde::Deserialize;
use thiserror::Error;

/// Environment variable overriding [`MonitorConfig::calibration_password`]
pub const CALIBRATION_PASSWORD_ENV: &str = "RIVERWATCH_CALIBRATION_PASSWORD";

/// Configuration loading failures
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

/// Thresholds and secrets for one deployment
#[derive(Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub freshness_threshold_minutes: i64,
    pub analysis_ttl_minutes: i64,
    pub insert_batch_size: usize,
    /// Shared secret for calibration management; `None` locks it entirely
    pub calibration_password: Option<String>,
    pub detector: DetectorConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            freshness_threshold_minutes: DEFAULT_FRESHNESS_THRESHOLD_MINUTES,
            analysis_ttl_minutes: DEFAULT_ANALYSIS_TTL_MINUTES,
            insert_batch_size: DEFAULT_INSERT_BATCH_SIZE,
            calibration_password: None,
            detector: DetectorConfig::default(),
        }
    }
}

// Keeps the password out of logs
impl fmt::Debug for MonitorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorConfig")
            .field("freshness_threshold_minutes", &self.freshness_threshold_minutes)
            .field("analysis_ttl_minutes", &self.analysis_ttl_minutes)
            .field("insert_batch_size", &self.insert_batch_size)
            .field(
                "calibration_password",
                &self.calibration_password.as_ref().map(|_| "<redacted>"),
            )
            .field("detector", &self.detector)
            .finish()
    }
}

impl MonitorConfig {
    /// Defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the staleness threshold for fetched readings
    pub fn freshness_threshold_minutes(mut self, minutes: i64) -> Self {
        self.freshness_threshold_minutes = minutes;
        self
    }

    /// Set the lifetime of cached summaries
    pub fn analysis_ttl_minutes(mut self, minutes: i64) -> Self {
        self.analysis_ttl_minutes = minutes;
        self
    }

    /// Set the number of readings written per batch
    pub fn insert_batch_size(mut self, size: usize) -> Self {
        self.insert_batch_size = size;
        self
    }

    /// Set the calibration management secret
    pub fn calibration_password(mut self, password: impl Into<String>) -> Self {
        self.calibration_password = Some(password.into());
        self
    }

    /// Replace the detector thresholds
    pub fn detector(mut self, detector: DetectorConfig) -> Self {
        self.detector = detector;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigLoadError> {
        let config: Self = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup; empty values are ignored
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(password) = lookup(CALIBRATION_PASSWORD_ENV).filter(|p| !p.is_empty()) {
            self.calibration_password = Some(password);
        }
        self
    }

    /// Check every threshold
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.freshness().validate()?;
        self.analysis_ttl().validate()?;
        if self.insert_batch_size == 0 {
            return Err(ConfigError::NotPositive("insert_batch_size"));
        }
        self.detector.validate()
    }

    /// Slice for the freshness gate
    pub fn freshness(&self) -> FreshnessConfig {
        FreshnessConfig::new(self.freshness_threshold_minutes)
    }

    /// Slice for the analysis cache
    pub fn analysis_ttl(&self) -> AnalysisTtl {
        AnalysisTtl::new(self.analysis_ttl_minutes)
    }
}
