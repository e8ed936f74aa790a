//! Sensor Malfunction Heuristics
//!
//! ## Overview
//!
//! River probes fail in a handful of recognisable ways. This module flags
//! them from a channel's recent history without keeping any state between
//! calls:
//!
//! | check   | symptom                                   | typical cause              |
//! |---------|-------------------------------------------|----------------------------|
//! | range   | pH 15, water at 55 °C                     | broken probe, wiring fault |
//! | stuck   | 20 identical values in a row              | frozen logger, dead probe  |
//! | erratic | spread comparable to the mean             | loose contact, fouling     |
//!
//! ## Metric Lookup
//!
//! Range rules are keyed by [`MetricKind`]. Providers only report free-text
//! sensor names, so [`MetricKind::from_sensor_name`] maps names to kinds by
//! case-insensitive substring matching. Names that match nothing become
//! [`MetricKind::Unknown`], for which only negative values are flagged.
//!
//! ## Usage
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use riverwatch_core::{MalfunctionDetector, TimedValue};
//!
//! let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
//! let history: Vec<TimedValue> = (0..20)
//!     .map(|i| TimedValue { timestamp: start + Duration::minutes(10 * i), value: 7.0 })
//!     .collect();
//!
//! let diagnosis = MalfunctionDetector::default().detect("Dissolved Oxygen (mg/L)", &history, 7.0);
//! assert!(diagnosis.is_malfunctioning());
//! assert!(diagnosis.reason_text().unwrap().contains("stuck"));
//! ```

mod detector;
mod metric;
pub mod stats;

pub use detector::{Diagnosis, DetectorConfig, MalfunctionDetector, MalfunctionReason};
pub use metric::{Bound, MetricKind, ValidRange};
