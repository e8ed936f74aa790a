//! Shared fixtures for store integration tests

#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use riverwatch_core::{Channel, NewCalibrationOffset, Reading, Timestamp, ValidityWindow};

pub fn epoch() -> Timestamp {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

pub fn minutes(n: i64) -> Timestamp {
    epoch() + Duration::minutes(n)
}

pub fn channel(id: &str, station: &str, name: &str) -> Channel {
    Channel {
        id: id.into(),
        station_id: station.into(),
        name: name.into(),
        unit: None,
    }
}

/// `count` readings of `channel`, ten minutes apart
pub fn readings(channel: &str, count: usize, value: f64) -> Vec<Reading> {
    (0..count)
        .map(|i| Reading::new(channel, minutes(10 * i as i64), value))
        .collect()
}

pub fn draft(channel: &str, offset_value: f64, window: ValidityWindow) -> NewCalibrationOffset {
    NewCalibrationOffset {
        channel_id: channel.into(),
        offset_value,
        window,
        reason: "operator correction".into(),
    }
}
