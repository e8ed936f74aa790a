//! Metric kinds and their plausible ranges

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::metrics::*;

/// Closed plausibility range; a missing bound is unbounded on that side
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValidRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ValidRange {
    /// Range with both ends
    pub const fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Range with only a floor
    pub const fn at_least(min: f64) -> Self {
        Self { min: Some(min), max: None }
    }

    /// Which bound `value` violates, if any
    pub fn violation(&self, value: f64) -> Option<Bound> {
        if let Some(min) = self.min {
            if value < min {
                return Some(Bound::Lower(min));
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return Some(Bound::Upper(max));
            }
        }
        None
    }
}

/// The end of a [`ValidRange`] that was crossed
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum Bound {
    Lower(f64),
    Upper(f64),
}

/// Water-quality metrics with known plausibility rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum MetricKind {
    Ph,
    DissolvedOxygenPercent,
    Temperature,
    Conductivity,
    Orp,
    Salinity,
    CablePower,
    /// No specific rule; only negative values are flagged
    Unknown,
}

/// Lower-case needles per metric, all of which must appear in the name.
/// Checked in order; the first entry that matches wins.
const NAME_PATTERNS: &[(MetricKind, &[&str])] = &[
    (MetricKind::DissolvedOxygenPercent, &["oxygen", "%"]),
    (MetricKind::DissolvedOxygenPercent, &["oxygen", "sat"]),
    (MetricKind::DissolvedOxygenPercent, &["do", "%"]),
    (MetricKind::CablePower, &["cable", "power"]),
    (MetricKind::Conductivity, &["conductivity"]),
    (MetricKind::Salinity, &["salinity"]),
    (MetricKind::Temperature, &["temp"]),
    (MetricKind::Orp, &["orp"]),
    (MetricKind::Orp, &["redox"]),
    (MetricKind::Ph, &["ph"]),
];

impl MetricKind {
    /// Classify a free-text sensor name as reported by the provider
    ///
    /// Compatibility shim: provider names are free text ("Temperature (C)",
    /// "pH", "Dissolved Oxygen (%)"), so this is a case-insensitive substring
    /// match. More specific patterns come first; a name like "Temp. of
    /// Phosphate probe" would still classify as temperature. Anything
    /// unrecognised is [`MetricKind::Unknown`].
    pub fn from_sensor_name(name: &str) -> Self {
        NAME_PATTERNS
            .iter()
            .find(|(_, needles)| needles.iter().all(|needle| contains_ignore_case(name, needle)))
            .map(|(kind, _)| *kind)
            .unwrap_or(MetricKind::Unknown)
    }

    /// Plausibility range, `None` for [`MetricKind::Unknown`]
    pub fn valid_range(&self) -> Option<ValidRange> {
        match self {
            Self::Ph => Some(ValidRange::between(PH_MIN, PH_MAX)),
            Self::DissolvedOxygenPercent => Some(ValidRange::between(DO_PERCENT_MIN, DO_PERCENT_MAX)),
            Self::Temperature => Some(ValidRange::between(WATER_TEMP_MIN_C, WATER_TEMP_MAX_C)),
            Self::Conductivity => Some(ValidRange::at_least(CONDUCTIVITY_MIN)),
            Self::Orp => Some(ValidRange::between(ORP_MIN_MV, ORP_MAX_MV)),
            Self::Salinity => Some(ValidRange::between(SALINITY_MIN, SALINITY_MAX)),
            Self::CablePower => Some(ValidRange::between(CABLE_POWER_MIN_V, CABLE_POWER_MAX_V)),
            Self::Unknown => None,
        }
    }

    /// Short human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ph => "pH",
            Self::DissolvedOxygenPercent => "dissolved oxygen %",
            Self::Temperature => "temperature",
            Self::Conductivity => "conductivity",
            Self::Orp => "ORP",
            Self::Salinity => "salinity",
            Self::CablePower => "cable power",
            Self::Unknown => "unknown metric",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// ASCII case-insensitive substring test without allocating
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let haystack = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.is_empty() {
        return true;
    }
    haystack
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}
