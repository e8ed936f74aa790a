//! Shared fixtures for core integration tests
//!
//! - fixed reference instants
//! - series builders with realistic spacing
//! - offset builders

#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use riverwatch_core::{CalibrationOffset, OffsetId, Reading, TimedValue, Timestamp, ValidityWindow};

/// Provider sampling interval
pub const SAMPLE_INTERVAL_MINUTES: i64 = 10;

pub fn instant(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Timestamp {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

/// 2025-01-01T00:00:00Z
pub fn epoch() -> Timestamp {
    instant(2025, 1, 1, 0, 0)
}

pub fn timed_series(values: &[f64]) -> Vec<TimedValue> {
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| TimedValue {
            timestamp: epoch() + Duration::minutes(SAMPLE_INTERVAL_MINUTES * i as i64),
            value,
        })
        .collect()
}

pub fn reading_series(channel: &str, values: &[f64]) -> Vec<Reading> {
    timed_series(values)
        .into_iter()
        .map(|point| Reading::new(channel, point.timestamp, point.value))
        .collect()
}

pub fn offset(id: OffsetId, channel: &str, value: f64, window: ValidityWindow) -> CalibrationOffset {
    CalibrationOffset {
        id,
        channel_id: channel.into(),
        offset_value: value,
        window,
        reason: "field calibration".into(),
        created_at: epoch(),
    }
}
