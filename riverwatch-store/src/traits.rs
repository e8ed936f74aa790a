//! Storage traits
//!
//! Synchronous and `Send + Sync` so implementations can be shared behind an
//! `Arc` and called from background tasks.

use riverwatch_core::{
    AnalysisCacheEntry, CalibrationOffset, Channel, ChannelId, FetchLogEntry, NewCalibrationOffset,
    OffsetId, OffsetPatch, Reading, StationId, Timestamp,
};

use crate::StoreResult;

/// Raw readings, unique per `(channel, measured_at)`
pub trait ReadingStore: Send + Sync {
    /// Write all rows or none; duplicates reject the whole call
    ///
    /// Returns the number of rows written.
    fn insert_batch(&self, readings: &[Reading]) -> StoreResult<usize>;

    /// Readings of `channel` with `from <= measured_at <= to`, oldest first.
    /// Open ends are unbounded.
    fn readings_in_window(
        &self,
        channel: &ChannelId,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> StoreResult<Vec<Reading>>;

    /// Newest stored instant for `channel`
    fn latest_measured_at(&self, channel: &ChannelId) -> StoreResult<Option<Timestamp>>;

    /// Remove one reading permanently
    fn delete_reading(&self, channel: &ChannelId, measured_at: Timestamp) -> StoreResult<Reading>;
}

/// Channel metadata
pub trait ChannelRegistry: Send + Sync {
    /// Insert or replace by channel id
    fn upsert_channel(&self, channel: Channel) -> StoreResult<()>;

    fn channel(&self, id: &ChannelId) -> StoreResult<Option<Channel>>;

    /// Channels of a station, ordered by id
    fn channels_for_station(&self, station: &StationId) -> StoreResult<Vec<Channel>>;
}

/// Calibration offsets with the non-overlap gate
pub trait OffsetStore: Send + Sync {
    /// Offsets of `channel`, ordered by `valid_from`
    fn offsets_for_channel(&self, channel: &ChannelId) -> StoreResult<Vec<CalibrationOffset>>;

    fn offset(&self, id: OffsetId) -> StoreResult<Option<CalibrationOffset>>;

    /// Validate, check overlaps, assign an id and store
    fn create_offset(&self, draft: NewCalibrationOffset, now: Timestamp) -> StoreResult<CalibrationOffset>;

    /// Apply a patch; the result passes the same gate as a new offset, ignoring
    /// the offset's own previous window
    fn update_offset(&self, id: OffsetId, patch: &OffsetPatch) -> StoreResult<CalibrationOffset>;

    /// End the offset at `now`; it stays on record as historical
    ///
    /// An offset that already ended at or before `now` is returned unchanged.
    /// One that starts after `now` cannot be deactivated and must be deleted
    /// ([`StoreError::NotYetActive`](crate::StoreError::NotYetActive)).
    fn deactivate_offset(&self, id: OffsetId, now: Timestamp) -> StoreResult<CalibrationOffset>;

    /// Remove the offset; returns what was removed
    fn delete_offset(&self, id: OffsetId) -> StoreResult<CalibrationOffset>;
}

/// Append-only log of upstream fetch attempts
pub trait FetchLogStore: Send + Sync {
    fn append_fetch_log(&self, entry: FetchLogEntry) -> StoreResult<()>;

    /// Most recent `success` entry of `station` by completion time
    fn latest_success(&self, station: &StationId) -> StoreResult<Option<FetchLogEntry>>;

    /// All entries of `station` in append order
    fn fetch_log(&self, station: &StationId) -> StoreResult<Vec<FetchLogEntry>>;
}

/// Generated summaries keyed by `(station, language)`
pub trait AnalysisCacheStore: Send + Sync {
    fn cached_analysis(&self, station: &StationId, language: &str) -> StoreResult<Option<AnalysisCacheEntry>>;

    /// Insert or replace the entry for its `(station, language)`
    fn store_analysis(&self, entry: AnalysisCacheEntry) -> StoreResult<()>;
}

/// Everything the service layer needs from one backend
pub trait MonitorStore:
    ReadingStore + ChannelRegistry + OffsetStore + FetchLogStore + AnalysisCacheStore
{
}

impl<T> MonitorStore for T where
    T: ReadingStore + ChannelRegistry + OffsetStore + FetchLogStore + AnalysisCacheStore
{
}
