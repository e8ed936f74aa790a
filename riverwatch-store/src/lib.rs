//! Storage Contracts for RiverWatch
//!
//! ## Overview
//!
//! The core crate never touches storage; it works on snapshots. This crate
//! defines what the rest of the system expects from persistence and ships an
//! in-memory implementation used by tests and small deployments.
//!
//! | trait                  | owns                                   | key rule                                   |
//! |------------------------|----------------------------------------|--------------------------------------------|
//! | [`ReadingStore`]       | raw readings                           | `(channel, measured_at)` is unique         |
//! | [`ChannelRegistry`]    | channel metadata per station           | upsert by channel id                       |
//! | [`OffsetStore`]        | calibration offsets                    | no overlapping windows per channel         |
//! | [`FetchLogStore`]      | upstream fetch attempts                | append-only                                |
//! | [`AnalysisCacheStore`] | generated station summaries            | one entry per `(station, language)`        |
//!
//! ## Write Semantics
//!
//! - A single [`ReadingStore::insert_batch`] call is one unit of work: every row
//!   is written or none is. Duplicates, whether against stored rows or inside
//!   the batch, reject the whole call instead of overwriting.
//! - [`write_in_batches`] splits large writes into such units. When a later
//!   batch fails the earlier ones stay durable and the error reports how many
//!   rows made it ([`StoreError::PartialWrite`]).
//! - Offset creation and updates run the core overlap gate against the
//!   channel's current offsets before anything is written.
//!
//! ## Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use riverwatch_core::{NewCalibrationOffset, ValidityWindow};
//! use riverwatch_store::{MemoryStore, OffsetStore};
//!
//! let store = MemoryStore::new();
//! let now = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
//!
//! let draft = NewCalibrationOffset {
//!     channel_id: "pH-1".into(),
//!     offset_value: -0.12,
//!     window: ValidityWindow::ongoing(now),
//!     reason: "two-point calibration".into(),
//! };
//! let created = store.create_offset(draft.clone(), now)?;
//!
//! // Same window again conflicts with the offset just created
//! let err = store.create_offset(draft, now).unwrap_err();
//! assert!(err.is_conflict());
//! assert_eq!(store.offsets_for_channel(&"pH-1".into())?, vec![created]);
//! # Ok::<(), riverwatch_store::StoreError>(())
//! ```

#![deny(unsafe_code)]

pub mod batch;
pub mod memory;
pub mod snapshot;
pub mod traits;

pub use batch::{write_in_batches, BatchReport};
pub use memory::MemoryStore;
pub use snapshot::StoreSnapshot;
pub use traits::{
    AnalysisCacheStore, ChannelRegistry, FetchLogStore, MonitorStore, OffsetStore, ReadingStore,
};

use riverwatch_core::{CalibrationError, ChannelId, OffsetId, Timestamp};
use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique `(channel, measured_at)` constraint violated
    #[error("duplicate reading for channel {channel_id} at {measured_at}")]
    DuplicateReading {
        channel_id: ChannelId,
        measured_at: Timestamp,
    },

    /// Offset rejected by the validation gate
    #[error("calibration offset rejected: {0}")]
    Calibration(#[from] CalibrationError),

    #[error("calibration offset {0} not found")]
    OffsetNotFound(OffsetId),

    /// Deactivation requested before the offset starts
    #[error("calibration offset {id} only starts at {valid_from}; delete it instead of deactivating")]
    NotYetActive { id: OffsetId, valid_from: Timestamp },

    /// Two offsets in imported data claim the same id
    #[error("duplicate calibration offset id {0}")]
    DuplicateOffsetId(OffsetId),

    #[error("no reading for channel {channel_id} at {measured_at}")]
    ReadingNotFound {
        channel_id: ChannelId,
        measured_at: Timestamp,
    },

    /// A batched write failed after earlier batches were committed
    #[error("batch {failed_batch} failed after {written} rows were written: {source}")]
    PartialWrite {
        written: usize,
        failed_batch: usize,
        #[source]
        source: Box<StoreError>,
    },

    /// A lock was poisoned by a panicking writer
    #[error("store lock poisoned: {0}")]
    LockPoisoned(&'static str),

    #[error("snapshot (de)serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by a non-memory backend
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Overlapping calibration window
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Calibration(err) if err.is_conflict())
    }

    /// Input rejected before anything was written
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Calibration(_) | Self::DuplicateReading { .. } | Self::NotYetActive { .. }
        )
    }

    /// Rows that were durably written before the failure
    pub fn rows_written(&self) -> usize {
        match self {
            Self::PartialWrite { written, .. } => *written,
            _ => 0,
        }
    }
}
