//! JSON snapshots of a [`MemoryStore`](crate::MemoryStore)
//!
//! Lets a small deployment survive restarts without a database.

use std::fs;
use std::path::Path;

use log::info;
use riverwatch_core::{AnalysisCacheEntry, CalibrationOffset, Channel, FetchLogEntry, OffsetId, Reading};
use serde::{Deserialize, Serialize};

use crate::memory::MemoryStore;
use crate::StoreResult;

/// Every table of the store, flattened to rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub channels: Vec<Channel>,
    pub readings: Vec<Reading>,
    pub offsets: Vec<CalibrationOffset>,
    /// Highest id ever handed out, so deleted ids stay retired
    #[serde(default)]
    pub next_offset_id: OffsetId,
    pub fetch_log: Vec<FetchLogEntry>,
    #[serde(default)]
    pub analysis: Vec<AnalysisCacheEntry>,
}

impl StoreSnapshot {
    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl MemoryStore {
    /// Write the current contents to `path` as JSON
    pub fn save_to(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        let json = self.snapshot()?.to_json()?;
        fs::write(path, json)?;
        info!("Saved store snapshot to {}", path.display());
        Ok(())
    }

    /// Load a store previously written with [`MemoryStore::save_to`]
    pub fn load_from(path: impl AsRef<Path>) -> StoreResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_snapshot(StoreSnapshot::from_json(&json)?)
    }
}
