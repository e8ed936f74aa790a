//! Station read path and refresh pipeline
//!
//! ## Flow
//!
//! 1. [`StationService::station_data`] asks the freshness gate whether the
//!    stored data is recent enough. If so it answers from the store.
//! 2. Otherwise [`StationService::refresh`] logs an `in_progress` fetch, calls
//!    the upstream provider and answers with what it returned.
//! 3. New readings are written by a background task in batches. Only once the
//!    task finishes is a `success` entry appended, so a freshness check issued
//!    right after a refresh can still see the previous fetch.
//!
//! The persistence task's handle is part of the response. Dropping it keeps
//! the fire-and-forget behaviour; awaiting it waits for durability.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{debug, info, warn};
use riverwatch_core::{
    assess_channel, Channel, ChannelAssessment, ChannelId, CorrectedReading, DataSource,
    FetchLogEntry, FreshnessGate, MalfunctionDetector, OffsetResolver, Reading, StationId,
    SystemClock, TimeSource, Timestamp,
};
use riverwatch_store::{write_in_batches, BatchReport, MonitorStore, StoreError};
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::MonitorConfig;
use crate::upstream::{UpstreamError, UpstreamProvider};

/// Failures of the read path and refresh pipeline
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("upstream fetch failed: {0}")]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("unknown channel {0}")]
    UnknownChannel(ChannelId),

    /// The background writer panicked or was cancelled
    #[error("persistence task aborted: {0}")]
    TaskAborted(String),
}

/// Handle on the background write of one refresh
#[derive(Debug)]
pub struct PersistenceHandle {
    inner: JoinHandle<Result<BatchReport, StoreError>>,
}

impl PersistenceHandle {
    /// Whether the write has finished, successfully or not
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Wait until every batch is written or one fails
    pub async fn wait(self) -> Result<BatchReport, RefreshError> {
        match self.inner.await {
            Ok(result) => result.map_err(RefreshError::from),
            Err(join_error) => Err(RefreshError::TaskAborted(join_error.to_string())),
        }
    }
}

/// Response of [`StationService::station_data`]
#[derive(Debug)]
pub struct StationData {
    pub station_id: StationId,
    pub source: DataSource,
    pub channels: Vec<Channel>,
    /// Raw readings, oldest first per channel
    pub readings: Vec<Reading>,
    /// Present only when the data came from upstream
    pub persistence: Option<PersistenceHandle>,
}

/// Response of [`StationService::refresh`]
#[derive(Debug)]
pub struct RefreshOutcome {
    pub station_id: StationId,
    pub started_at: Timestamp,
    pub channels: Vec<Channel>,
    /// Everything the provider returned
    pub readings: Vec<Reading>,
    /// Readings handed to the background writer
    pub queued: usize,
    pub persistence: PersistenceHandle,
}

/// Orchestrates freshness decisions, upstream fetches and health reports
pub struct StationService {
    store: Arc<dyn MonitorStore>,
    upstream: Arc<dyn UpstreamProvider>,
    clock: Arc<dyn TimeSource>,
    gate: FreshnessGate,
    detector: MalfunctionDetector,
    batch_size: usize,
}

impl StationService {
    /// Service using the wall clock
    pub fn new(
        store: Arc<dyn MonitorStore>,
        upstream: Arc<dyn UpstreamProvider>,
        config: &MonitorConfig,
    ) -> Self {
        Self {
            store,
            upstream,
            clock: Arc::new(SystemClock),
            gate: FreshnessGate::new(config.freshness()),
            detector: MalfunctionDetector::new(config.detector),
            batch_size: config.insert_batch_size,
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Arc<dyn MonitorStore> {
        &self.store
    }

    /// Cache-or-upstream decision for `station` at the current instant
    pub fn data_source(&self, station: &StationId, force_refresh: bool) -> Result<DataSource, RefreshError> {
        let log = self.store.fetch_log(station)?;
        Ok(self.gate.decide(&log, self.clock.now(), force_refresh))
    }

    /// Answer a station request from the store or from upstream
    pub async fn station_data(
        &self,
        station: &StationId,
        force_refresh: bool,
    ) -> Result<StationData, RefreshError> {
        match self.data_source(station, force_refresh)? {
            DataSource::Cache => {
                debug!("Serving {} from store", station);
                let channels = self.store.channels_for_station(station)?;
                let mut readings = Vec::new();
                for channel in &channels {
                    readings.extend(self.store.readings_in_window(&channel.id, None, None)?);
                }
                Ok(StationData {
                    station_id: station.clone(),
                    source: DataSource::Cache,
                    channels,
                    readings,
                    persistence: None,
                })
            }
            DataSource::Upstream => {
                let outcome = self.refresh(station).await?;
                Ok(StationData {
                    station_id: outcome.station_id,
                    source: DataSource::Upstream,
                    channels: outcome.channels,
                    readings: outcome.readings,
                    persistence: Some(outcome.persistence),
                })
            }
        }
    }

    /// Fetch from upstream and queue new readings for persistence
    ///
    /// A provider failure appends a `failed` log entry and is returned; the
    /// station stays stale so the next request tries again.
    pub async fn refresh(&self, station: &StationId) -> Result<RefreshOutcome, RefreshError> {
        let started_at = self.clock.now();
        self.store
            .append_fetch_log(FetchLogEntry::started(station.clone(), started_at))?;
        info!("Fetching station {} from upstream", station);

        let since = self
            .store
            .latest_success(station)?
            .map(|entry| entry.fetch_started_at);

        let snapshot = match self.upstream.fetch_station(station, since).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("Upstream fetch for {} failed: {}", station, err);
                self.store.append_fetch_log(FetchLogEntry::failed(
                    station.clone(),
                    started_at,
                    self.clock.now(),
                    err.to_string(),
                    0,
                ))?;
                return Err(err.into());
            }
        };

        for channel in &snapshot.channels {
            self.store.upsert_channel(channel.clone())?;
        }

        let pending = self.unseen_readings(&snapshot.readings)?;
        let queued = pending.len();
        debug!(
            "Station {}: {} readings fetched, {} new",
            station,
            snapshot.readings.len(),
            queued
        );

        let persistence = self.spawn_persistence(station.clone(), started_at, pending);

        Ok(RefreshOutcome {
            station_id: station.clone(),
            started_at,
            channels: snapshot.channels,
            readings: snapshot.readings,
            queued,
            persistence,
        })
    }

    /// Drop readings at or before each channel's newest stored instant, and
    /// repeats within the fetched set
    fn unseen_readings(&self, readings: &[Reading]) -> Result<Vec<Reading>, StoreError> {
        let mut latest: HashMap<&ChannelId, Option<Timestamp>> = HashMap::new();
        let mut seen: HashSet<(&ChannelId, Timestamp)> = HashSet::new();
        let mut pending = Vec::new();

        for reading in readings {
            let cutoff = match latest.get(&reading.channel_id) {
                Some(cutoff) => *cutoff,
                None => {
                    let cutoff = self.store.latest_measured_at(&reading.channel_id)?;
                    latest.insert(&reading.channel_id, cutoff);
                    cutoff
                }
            };
            let is_new = cutoff.map_or(true, |cutoff| reading.measured_at > cutoff);
            if is_new && seen.insert((&reading.channel_id, reading.measured_at)) {
                pending.push(reading.clone());
            }
        }

        Ok(pending)
    }

    fn spawn_persistence(
        &self,
        station: StationId,
        started_at: Timestamp,
        readings: Vec<Reading>,
    ) -> PersistenceHandle {
        let store = Arc::clone(&self.store);
        let clock = Arc::clone(&self.clock);
        let batch_size = self.batch_size;

        // Store calls are synchronous
        let inner = tokio::task::spawn_blocking(move || {
            let result = write_in_batches(store.as_ref(), &readings, batch_size);
            let completed_at = clock.now();

            let entry = match &result {
                Ok(report) => {
                    info!(
                        "Stored {} readings for {} in {} batches",
                        report.written, station, report.batches
                    );
                    FetchLogEntry::succeeded(station.clone(), started_at, completed_at, report.written)
                }
                Err(err) => {
                    warn!("Persisting readings for {} failed: {}", station, err);
                    FetchLogEntry::failed(
                        station.clone(),
                        started_at,
                        completed_at,
                        err.to_string(),
                        err.rows_written(),
                    )
                }
            };
            store.append_fetch_log(entry)?;
            result
        });

        PersistenceHandle { inner }
    }

    /// Stored readings of `channel` with calibration offsets applied
    pub fn corrected_readings(
        &self,
        channel: &ChannelId,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> Result<Vec<CorrectedReading>, RefreshError> {
        let readings = self.store.readings_in_window(channel, from, to)?;
        let offsets = self.store.offsets_for_channel(channel)?;
        Ok(OffsetResolver::for_channel(&offsets, channel).correct_series(&readings))
    }

    /// Corrected series and diagnosis of one channel
    pub fn channel_assessment(&self, channel: &ChannelId) -> Result<ChannelAssessment, RefreshError> {
        let meta = self
            .store
            .channel(channel)?
            .ok_or_else(|| RefreshError::UnknownChannel(channel.clone()))?;
        self.assess(&meta)
    }

    /// Assessment of every channel of `station`
    pub fn channel_health(&self, station: &StationId) -> Result<Vec<ChannelAssessment>, RefreshError> {
        self.store
            .channels_for_station(station)?
            .iter()
            .map(|channel| self.assess(channel))
            .collect()
    }

    fn assess(&self, channel: &Channel) -> Result<ChannelAssessment, RefreshError> {
        let readings = self.store.readings_in_window(&channel.id, None, None)?;
        let offsets = self.store.offsets_for_channel(&channel.id)?;
        let assessment = assess_channel(channel, &readings, &offsets, &self.detector);
        if let Some(reason) = assessment.diagnosis.reason() {
            warn!("Channel {} flagged: {}", channel.id, reason);
        }
        Ok(assessment)
    }
}
