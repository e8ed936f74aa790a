//! Persisted facts the core operates on
//!
//! Stores own these records; core functions only ever see read-only snapshots.

use alloc::string::String;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Identifier of one sensor metric stream
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct ChannelId(pub String);

/// Identifier of a monitoring station
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct StationId(pub String);

macro_rules! string_id {
    ($ty:ident) => {
        impl $ty {
            /// Borrow the raw identifier
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $ty {
            fn from(value: &str) -> Self {
                Self(String::from(value))
            }
        }

        impl From<String> for $ty {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(ChannelId);
string_id!(StationId);

/// One raw measurement, never mutated after ingestion
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    pub channel_id: ChannelId,
    pub measured_at: Timestamp,
    pub value: f64,
}

impl Reading {
    /// Convenience constructor
    pub fn new(channel_id: impl Into<ChannelId>, measured_at: Timestamp, value: f64) -> Self {
        Self {
            channel_id: channel_id.into(),
            measured_at,
            value,
        }
    }

    /// Drop the channel, keeping what the detector needs
    pub fn timed_value(&self) -> TimedValue {
        TimedValue {
            timestamp: self.measured_at,
            value: self.value,
        }
    }
}

/// Point in a single channel's history
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimedValue {
    pub timestamp: Timestamp,
    pub value: f64,
}

/// A metric stream at a station
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Channel {
    pub id: ChannelId,
    pub station_id: StationId,
    /// Free-text sensor name as reported upstream, e.g. "Temperature (C)"
    pub name: String,
    pub unit: Option<String>,
}

/// Outcome of an upstream fetch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum FetchStatus {
    InProgress,
    Success,
    Failed,
}

/// One row of the append-only fetch log
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FetchLogEntry {
    pub station_id: StationId,
    pub fetch_started_at: Timestamp,
    pub fetch_completed_at: Option<Timestamp>,
    pub status: FetchStatus,
    pub error_message: Option<String>,
    pub readings_count: usize,
}

impl FetchLogEntry {
    /// Row written when a fetch begins
    pub fn started(station_id: StationId, at: Timestamp) -> Self {
        Self {
            station_id,
            fetch_started_at: at,
            fetch_completed_at: None,
            status: FetchStatus::InProgress,
            error_message: None,
            readings_count: 0,
        }
    }

    /// Row written once every reading is durable
    pub fn succeeded(
        station_id: StationId,
        started_at: Timestamp,
        completed_at: Timestamp,
        readings_count: usize,
    ) -> Self {
        Self {
            station_id,
            fetch_started_at: started_at,
            fetch_completed_at: Some(completed_at),
            status: FetchStatus::Success,
            error_message: None,
            readings_count,
        }
    }

    /// Row written when the fetch or its persistence failed
    pub fn failed(
        station_id: StationId,
        started_at: Timestamp,
        completed_at: Timestamp,
        error_message: String,
        readings_count: usize,
    ) -> Self {
        Self {
            station_id,
            fetch_started_at: started_at,
            fetch_completed_at: Some(completed_at),
            status: FetchStatus::Failed,
            error_message: Some(error_message),
            readings_count,
        }
    }
}

/// Memoized natural-language summary, keyed by (station, language)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisCacheEntry {
    pub station_id: StationId,
    pub language: String,
    pub analysis_text: String,
    /// Newest reading the summary was computed from
    pub data_timestamp: Option<Timestamp>,
    pub created_at: Timestamp,
}
