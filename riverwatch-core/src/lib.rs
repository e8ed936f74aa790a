//! Core logic for RiverWatch
//!
//! Pure, deterministic building blocks of the river monitoring backend:
//!
//! - [`calibration`]: operator-entered offsets and the resolver that applies them
//! - [`freshness`]: cache-vs-upstream decisions derived from the fetch log
//! - [`malfunction`]: threshold and variance heuristics over recent readings
//! - [`assessment`]: the three above chained for a single channel
//!
//! Nothing here owns persistent state. Callers pass read-only snapshots and get
//! derived values back, so every function can be tested with plain data.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use riverwatch_core::{CalibrationOffset, OffsetResolver, ValidityWindow};
//!
//! let offsets = [CalibrationOffset {
//!     id: 1,
//!     channel_id: "pH-1".into(),
//!     offset_value: 0.25,
//!     window: ValidityWindow::ongoing(Utc.with_ymd_and_hms(2024, 12, 12, 22, 30, 0).unwrap()),
//!     reason: "drift after cleaning".into(),
//!     created_at: Utc.with_ymd_and_hms(2024, 12, 12, 22, 31, 0).unwrap(),
//! }];
//!
//! let resolver = OffsetResolver::new(&offsets);
//! let resolution = resolver.resolve(7.0, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
//! assert_eq!(resolution.corrected_value, 7.25);
//! assert_eq!(resolution.applied_offset.map(|o| o.id), Some(1));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

// Optional logging, compiled out without the `log` feature
#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {{ let _ = format_args!($($arg)*); }};
}

pub mod assessment;
pub mod calibration;
pub mod constants;
pub mod errors;
pub mod freshness;
pub mod malfunction;
pub mod model;
pub mod time;

// Public API
pub use assessment::{assess_channel, ChannelAssessment};
pub use calibration::{
    check_no_overlap, CalibrationOffset, CorrectedReading, NewCalibrationOffset, OffsetId,
    OffsetPatch, OffsetResolver, Resolution, ValidityWindow,
};
pub use errors::{CalibrationError, CalibrationResult, ConfigError};
pub use freshness::{
    is_analysis_fresh, is_fresh, last_successful_fetch, select_data_source, AnalysisTtl,
    DataSource, FreshnessConfig, FreshnessGate,
};
pub use malfunction::{Diagnosis, DetectorConfig, MalfunctionDetector, MalfunctionReason, MetricKind};
pub use model::{
    AnalysisCacheEntry, Channel, ChannelId, FetchLogEntry, FetchStatus, Reading, StationId,
    TimedValue,
};
pub use time::{FixedClock, TimeSource, Timestamp};

#[cfg(feature = "std")]
pub use time::SystemClock;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
