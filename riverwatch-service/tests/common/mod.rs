//! Shared fakes for service integration tests
//!
//! - scripted upstream provider
//! - counting summary generator
//! - store whose n-th reading batch fails
//! - fixture builders on a fixed clock

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use riverwatch_core::{
    AnalysisCacheEntry, CalibrationOffset, Channel, ChannelId, FetchLogEntry, FixedClock,
    NewCalibrationOffset, OffsetId, OffsetPatch, Reading, StationId, Timestamp,
};
use riverwatch_service::{
    AnalysisError, AnalysisGenerator, GeneratedAnalysis, MonitorConfig, StationSnapshot,
    UpstreamError, UpstreamProvider,
};
use riverwatch_store::{
    AnalysisCacheStore, ChannelRegistry, FetchLogStore, MemoryStore, OffsetStore, ReadingStore,
    StoreError, StoreResult,
};

pub const STATION: &str = "limmat-zurich";
pub const PASSWORD: &str = "correct horse";

pub fn epoch() -> Timestamp {
    Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

pub fn minutes(n: i64) -> Timestamp {
    epoch() + Duration::minutes(n)
}

pub fn station() -> StationId {
    STATION.into()
}

pub fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(epoch()))
}

pub fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

pub fn config() -> MonitorConfig {
    MonitorConfig::new().calibration_password(PASSWORD)
}

pub fn channels() -> Vec<Channel> {
    vec![
        Channel {
            id: "pH-1".into(),
            station_id: station(),
            name: "pH".into(),
            unit: None,
        },
        Channel {
            id: "Temp-1".into(),
            station_id: station(),
            name: "Water Temperature".into(),
            unit: Some("°C".into()),
        },
    ]
}

/// `count` readings per channel, ten minutes apart, ending at `end`
pub fn snapshot_until(end: Timestamp, count: i64) -> StationSnapshot {
    let mut readings = Vec::new();
    for i in 0..count {
        let at = end - Duration::minutes(10 * (count - 1 - i));
        readings.push(Reading::new("pH-1", at, 7.0 + 0.1 * (i % 3) as f64));
        readings.push(Reading::new("Temp-1", at, 11.0 + 0.4 * (i % 5) as f64));
    }
    StationSnapshot {
        channels: channels(),
        readings,
    }
}

/// Upstream provider answering from a queue of scripted results
#[derive(Default)]
pub struct ScriptedUpstream {
    responses: Mutex<VecDeque<Result<StationSnapshot, UpstreamError>>>,
    calls: AtomicUsize,
}

impl ScriptedUpstream {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, response: Result<StationSnapshot, UpstreamError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamProvider for ScriptedUpstream {
    async fn fetch_station(
        &self,
        station: &StationId,
        _since: Option<Timestamp>,
    ) -> Result<StationSnapshot, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(UpstreamError::NoData(station.clone())))
    }
}

/// Generator that numbers its summaries, optionally failing
#[derive(Default)]
pub struct CountingGenerator {
    calls: AtomicUsize,
    fail: std::sync::atomic::AtomicBool,
}

impl CountingGenerator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl AnalysisGenerator for CountingGenerator {
    async fn generate(&self, station: &StationId, language: &str) -> Result<GeneratedAnalysis, AnalysisError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail.load(Ordering::SeqCst) {
            return Err(AnalysisError::Generation("model unavailable".into()));
        }
        Ok(GeneratedAnalysis {
            text: format!("summary #{n} of {station} in {language}"),
            data_timestamp: Some(epoch()),
        })
    }
}

/// Memory store that rejects the `fail_on`-th `insert_batch` call (1-based)
pub struct FailingBatchStore {
    inner: MemoryStore,
    fail_on: usize,
    inserts: AtomicUsize,
}

impl FailingBatchStore {
    pub fn new(fail_on: usize) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::new(),
            fail_on,
            inserts: AtomicUsize::new(0),
        })
    }

    pub fn reading_count(&self) -> usize {
        self.inner.reading_count().unwrap()
    }
}

impl ReadingStore for FailingBatchStore {
    fn insert_batch(&self, readings: &[Reading]) -> StoreResult<usize> {
        let call = self.inserts.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(StoreError::Backend(format!("insert {call} rejected")));
        }
        self.inner.insert_batch(readings)
    }

    fn readings_in_window(
        &self,
        channel: &ChannelId,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> StoreResult<Vec<Reading>> {
        self.inner.readings_in_window(channel, from, to)
    }

    fn latest_measured_at(&self, channel: &ChannelId) -> StoreResult<Option<Timestamp>> {
        self.inner.latest_measured_at(channel)
    }

    fn delete_reading(&self, channel: &ChannelId, measured_at: Timestamp) -> StoreResult<Reading> {
        self.inner.delete_reading(channel, measured_at)
    }
}

impl ChannelRegistry for FailingBatchStore {
    fn upsert_channel(&self, channel: Channel) -> StoreResult<()> {
        self.inner.upsert_channel(channel)
    }

    fn channel(&self, id: &ChannelId) -> StoreResult<Option<Channel>> {
        self.inner.channel(id)
    }

    fn channels_for_station(&self, station: &StationId) -> StoreResult<Vec<Channel>> {
        self.inner.channels_for_station(station)
    }
}

impl OffsetStore for FailingBatchStore {
    fn offsets_for_channel(&self, channel: &ChannelId) -> StoreResult<Vec<CalibrationOffset>> {
        self.inner.offsets_for_channel(channel)
    }

    fn offset(&self, id: OffsetId) -> StoreResult<Option<CalibrationOffset>> {
        self.inner.offset(id)
    }

    fn create_offset(&self, draft: NewCalibrationOffset, now: Timestamp) -> StoreResult<CalibrationOffset> {
        self.inner.create_offset(draft, now)
    }

    fn update_offset(&self, id: OffsetId, patch: &OffsetPatch) -> StoreResult<CalibrationOffset> {
        self.inner.update_offset(id, patch)
    }

    fn deactivate_offset(&self, id: OffsetId, now: Timestamp) -> StoreResult<CalibrationOffset> {
        self.inner.deactivate_offset(id, now)
    }

    fn delete_offset(&self, id: OffsetId) -> StoreResult<CalibrationOffset> {
        self.inner.delete_offset(id)
    }
}

impl FetchLogStore for FailingBatchStore {
    fn append_fetch_log(&self, entry: FetchLogEntry) -> StoreResult<()> {
        self.inner.append_fetch_log(entry)
    }

    fn latest_success(&self, station: &StationId) -> StoreResult<Option<FetchLogEntry>> {
        self.inner.latest_success(station)
    }

    fn fetch_log(&self, station: &StationId) -> StoreResult<Vec<FetchLogEntry>> {
        self.inner.fetch_log(station)
    }
}

impl AnalysisCacheStore for FailingBatchStore {
    fn cached_analysis(&self, station: &StationId, language: &str) -> StoreResult<Option<AnalysisCacheEntry>> {
        self.inner.cached_analysis(station, language)
    }

    fn store_analysis(&self, entry: AnalysisCacheEntry) -> StoreResult<()> {
        self.inner.store_analysis(entry)
    }
}
