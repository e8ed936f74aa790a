//! In-memory store
//!
//! Each table sits behind its own `RwLock`. Writes that must check and insert
//! atomically (duplicate readings, overlapping offsets) do both under the same
//! write guard.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info};
use riverwatch_core::{
    check_no_overlap, AnalysisCacheEntry, CalibrationOffset, Channel, ChannelId, FetchLogEntry,
    FetchStatus, NewCalibrationOffset, OffsetId, OffsetPatch, Reading, StationId, Timestamp,
};

use crate::snapshot::StoreSnapshot;
use crate::traits::{AnalysisCacheStore, ChannelRegistry, FetchLogStore, OffsetStore, ReadingStore};
use crate::{StoreError, StoreResult};

type ReadingTable = HashMap<ChannelId, BTreeMap<Timestamp, f64>>;

#[derive(Debug, Default)]
struct OffsetTable {
    next_id: OffsetId,
    rows: BTreeMap<OffsetId, CalibrationOffset>,
}

impl OffsetTable {
    fn allocate_id(&mut self) -> OffsetId {
        self.next_id += 1;
        self.next_id
    }

    fn get(&self, id: OffsetId) -> StoreResult<&CalibrationOffset> {
        self.rows.get(&id).ok_or(StoreError::OffsetNotFound(id))
    }

    fn for_channel(&self, channel: &ChannelId) -> Vec<CalibrationOffset> {
        let mut offsets: Vec<_> = self
            .rows
            .values()
            .filter(|offset| &offset.channel_id == channel)
            .cloned()
            .collect();
        offsets.sort_by_key(|offset| (offset.window.valid_from, offset.id));
        offsets
    }
}

/// Reference implementation of every store trait
#[derive(Debug, Default)]
pub struct MemoryStore {
    readings: RwLock<ReadingTable>,
    channels: RwLock<BTreeMap<ChannelId, Channel>>,
    offsets: RwLock<OffsetTable>,
    fetch_log: RwLock<Vec<FetchLogEntry>>,
    analysis: RwLock<HashMap<(StationId, String), AnalysisCacheEntry>>,
}

fn read<'a, T>(lock: &'a RwLock<T>, table: &'static str) -> StoreResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| StoreError::LockPoisoned(table))
}

fn write<'a, T>(lock: &'a RwLock<T>, table: &'static str) -> StoreResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| StoreError::LockPoisoned(table))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored readings across channels
    pub fn reading_count(&self) -> StoreResult<usize> {
        let readings = read(&self.readings, "readings")?;
        Ok(readings.values().map(BTreeMap::len).sum())
    }

    /// Copy every table into a serializable snapshot
    pub fn snapshot(&self) -> StoreResult<StoreSnapshot> {
        let channels = read(&self.channels, "channels")?.values().cloned().collect();

        let readings = read(&self.readings, "readings")?
            .iter()
            .flat_map(|(channel, rows)| {
                rows.iter()
                    .map(move |(at, value)| Reading::new(channel.clone(), *at, *value))
            })
            .collect();

        let offsets_guard = read(&self.offsets, "offsets")?;
        let offsets = offsets_guard.rows.values().cloned().collect();
        let next_offset_id = offsets_guard.next_id;
        drop(offsets_guard);

        let fetch_log = read(&self.fetch_log, "fetch_log")?.clone();
        let analysis = read(&self.analysis, "analysis")?.values().cloned().collect();

        Ok(StoreSnapshot {
            channels,
            readings,
            offsets,
            next_offset_id,
            fetch_log,
            analysis,
        })
    }

    /// Rebuild a store from a snapshot
    ///
    /// Readings go through the same duplicate check as live inserts and offsets
    /// through the overlap gate, so a hand-edited snapshot cannot smuggle in
    /// conflicting rows.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> StoreResult<Self> {
        let store = Self::new();

        for channel in snapshot.channels {
            store.upsert_channel(channel)?;
        }
        store.insert_batch(&snapshot.readings)?;

        {
            let mut offsets = write(&store.offsets, "offsets")?;
            for offset in snapshot.offsets {
                if offsets.rows.contains_key(&offset.id) {
                    return Err(StoreError::DuplicateOffsetId(offset.id));
                }
                offset.validate()?;
                let existing: Vec<_> = offsets.rows.values().cloned().collect();
                check_no_overlap(&existing, &offset.channel_id, &offset.window, None)?;
                offsets.next_id = offsets.next_id.max(offset.id);
                offsets.rows.insert(offset.id, offset);
            }
            offsets.next_id = offsets.next_id.max(snapshot.next_offset_id);
        }

        *write(&store.fetch_log, "fetch_log")? = snapshot.fetch_log;
        for entry in snapshot.analysis {
            store.store_analysis(entry)?;
        }

        info!("Restored store snapshot ({} readings)", store.reading_count()?);
        Ok(store)
    }
}

impl ReadingStore for MemoryStore {
    fn insert_batch(&self, readings: &[Reading]) -> StoreResult<usize> {
        let mut table = write(&self.readings, "readings")?;

        // Validate the whole batch before touching the table
        let mut seen: HashMap<&ChannelId, Vec<Timestamp>> = HashMap::new();
        for reading in readings {
            let stored = table
                .get(&reading.channel_id)
                .is_some_and(|rows| rows.contains_key(&reading.measured_at));
            let instants = seen.entry(&reading.channel_id).or_default();
            if stored || instants.contains(&reading.measured_at) {
                return Err(StoreError::DuplicateReading {
                    channel_id: reading.channel_id.clone(),
                    measured_at: reading.measured_at,
                });
            }
            instants.push(reading.measured_at);
        }

        for reading in readings {
            table
                .entry(reading.channel_id.clone())
                .or_default()
                .insert(reading.measured_at, reading.value);
        }

        debug!("Inserted {} readings", readings.len());
        Ok(readings.len())
    }

    fn readings_in_window(
        &self,
        channel: &ChannelId,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
    ) -> StoreResult<Vec<Reading>> {
        let table = read(&self.readings, "readings")?;
        let Some(rows) = table.get(channel) else {
            return Ok(Vec::new());
        };

        Ok(rows
            .iter()
            .filter(|(at, _)| from.map_or(true, |from| **at >= from))
            .filter(|(at, _)| to.map_or(true, |to| **at <= to))
            .map(|(at, value)| Reading::new(channel.clone(), *at, *value))
            .collect())
    }

    fn latest_measured_at(&self, channel: &ChannelId) -> StoreResult<Option<Timestamp>> {
        let table = read(&self.readings, "readings")?;
        Ok(table
            .get(channel)
            .and_then(|rows| rows.keys().next_back().copied()))
    }

    fn delete_reading(&self, channel: &ChannelId, measured_at: Timestamp) -> StoreResult<Reading> {
        let mut table = write(&self.readings, "readings")?;
        let value = table
            .get_mut(channel)
            .and_then(|rows| rows.remove(&measured_at))
            .ok_or_else(|| StoreError::ReadingNotFound {
                channel_id: channel.clone(),
                measured_at,
            })?;

        info!("Deleted reading of {} at {}", channel, measured_at);
        Ok(Reading::new(channel.clone(), measured_at, value))
    }
}

impl ChannelRegistry for MemoryStore {
    fn upsert_channel(&self, channel: Channel) -> StoreResult<()> {
        let mut channels = write(&self.channels, "channels")?;
        channels.insert(channel.id.clone(), channel);
        Ok(())
    }

    fn channel(&self, id: &ChannelId) -> StoreResult<Option<Channel>> {
        Ok(read(&self.channels, "channels")?.get(id).cloned())
    }

    fn channels_for_station(&self, station: &StationId) -> StoreResult<Vec<Channel>> {
        let channels = read(&self.channels, "channels")?;
        Ok(channels
            .values()
            .filter(|channel| &channel.station_id == station)
            .cloned()
            .collect())
    }
}

impl OffsetStore for MemoryStore {
    fn offsets_for_channel(&self, channel: &ChannelId) -> StoreResult<Vec<CalibrationOffset>> {
        Ok(read(&self.offsets, "offsets")?.for_channel(channel))
    }

    fn offset(&self, id: OffsetId) -> StoreResult<Option<CalibrationOffset>> {
        Ok(read(&self.offsets, "offsets")?.rows.get(&id).cloned())
    }

    fn create_offset(&self, draft: NewCalibrationOffset, now: Timestamp) -> StoreResult<CalibrationOffset> {
        draft.validate()?;

        let mut offsets = write(&self.offsets, "offsets")?;
        let existing = offsets.for_channel(&draft.channel_id);
        check_no_overlap(&existing, &draft.channel_id, &draft.window, None)?;

        let id = offsets.allocate_id();
        let offset = draft.into_offset(id, now);
        offsets.rows.insert(id, offset.clone());

        info!(
            "Created calibration offset {} for {} ({:+})",
            id, offset.channel_id, offset.offset_value
        );
        Ok(offset)
    }

    fn update_offset(&self, id: OffsetId, patch: &OffsetPatch) -> StoreResult<CalibrationOffset> {
        let mut offsets = write(&self.offsets, "offsets")?;
        let updated = patch.apply(offsets.get(id)?);
        updated.validate()?;

        let existing = offsets.for_channel(&updated.channel_id);
        check_no_overlap(&existing, &updated.channel_id, &updated.window, Some(id))?;

        offsets.rows.insert(id, updated.clone());
        info!("Updated calibration offset {}", id);
        Ok(updated)
    }

    fn deactivate_offset(&self, id: OffsetId, now: Timestamp) -> StoreResult<CalibrationOffset> {
        let mut offsets = write(&self.offsets, "offsets")?;
        let current = offsets.get(id)?.clone();

        if current.window.valid_from > now {
            return Err(StoreError::NotYetActive {
                id,
                valid_from: current.window.valid_from,
            });
        }
        // Already ended; moving the end forward could cover a successor
        if current.window.valid_until.is_some_and(|until| until <= now) {
            debug!("Calibration offset {} already ended, nothing to deactivate", id);
            return Ok(current);
        }

        let mut updated = current;
        updated.deactivate(now);
        updated.validate()?;
        let existing = offsets.for_channel(&updated.channel_id);
        check_no_overlap(&existing, &updated.channel_id, &updated.window, Some(id))?;

        offsets.rows.insert(id, updated.clone());
        info!("Deactivated calibration offset {} at {}", id, now);
        Ok(updated)
    }

    fn delete_offset(&self, id: OffsetId) -> StoreResult<CalibrationOffset> {
        let mut offsets = write(&self.offsets, "offsets")?;
        let removed = offsets.rows.remove(&id).ok_or(StoreError::OffsetNotFound(id))?;
        info!("Deleted calibration offset {}", id);
        Ok(removed)
    }
}

impl FetchLogStore for MemoryStore {
    fn append_fetch_log(&self, entry: FetchLogEntry) -> StoreResult<()> {
        debug!("Fetch log {}: {:?}", entry.station_id, entry.status);
        write(&self.fetch_log, "fetch_log")?.push(entry);
        Ok(())
    }

    fn latest_success(&self, station: &StationId) -> StoreResult<Option<FetchLogEntry>> {
        let log = read(&self.fetch_log, "fetch_log")?;
        Ok(log
            .iter()
            .filter(|entry| &entry.station_id == station && entry.status == FetchStatus::Success)
            .filter(|entry| entry.fetch_completed_at.is_some())
            .max_by_key(|entry| entry.fetch_completed_at)
            .cloned())
    }

    fn fetch_log(&self, station: &StationId) -> StoreResult<Vec<FetchLogEntry>> {
        let log = read(&self.fetch_log, "fetch_log")?;
        Ok(log
            .iter()
            .filter(|entry| &entry.station_id == station)
            .cloned()
            .collect())
    }
}

impl AnalysisCacheStore for MemoryStore {
    fn cached_analysis(&self, station: &StationId, language: &str) -> StoreResult<Option<AnalysisCacheEntry>> {
        let analysis = read(&self.analysis, "analysis")?;
        Ok(analysis.get(&(station.clone(), language.to_string())).cloned())
    }

    fn store_analysis(&self, entry: AnalysisCacheEntry) -> StoreResult<()> {
        let key = (entry.station_id.clone(), entry.language.clone());
        write(&self.analysis, "analysis")?.insert(key, entry);
        Ok(())
    }
}
