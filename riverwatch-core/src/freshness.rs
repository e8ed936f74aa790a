//! Freshness Decisions for Cached Readings and Summaries
//!
//! ## Overview
//!
//! The backend keeps every fetched reading, so most page loads can be served
//! from storage. Whether storage is "fresh enough" is not tracked in memory:
//! it is recomputed on every request from the persisted fetch log.
//!
//! ```text
//! fetch log ──▶ last_successful_fetch ──▶ is_fresh(now, threshold) ──┐
//!                                                                   ▼
//!                               force_refresh ──▶ select_data_source ──▶ Cache | Upstream
//! ```
//!
//! ## Failure Semantics
//!
//! Only `success` rows count. A failed attempt leaves the previous success (or
//! nothing) as the latest, so the next request retries upstream instead of
//! treating the failure as fresh data. An in-progress row never counts either;
//! success is logged only once every reading of the fetch is durable.
//!
//! ## Known Race
//!
//! Persistence of fetched readings runs in the background. A request arriving
//! right after a refresh may still see the previous success and fetch again.
//! The decision functions are pure, so this is a property of the caller's
//! write ordering, not of this module.
//!
//! ## Analysis Cache
//!
//! Station summaries use the same rule with their own lifetime
//! ([`AnalysisTtl`]); the `created_at` of the cached entry plays the role of
//! the last successful fetch.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    constants::{DEFAULT_ANALYSIS_TTL_MINUTES, DEFAULT_FRESHNESS_THRESHOLD_MINUTES},
    errors::ConfigError,
    model::{AnalysisCacheEntry, FetchLogEntry, FetchStatus},
    time::Timestamp,
};

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Where a request's readings come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum DataSource {
    /// Serve what is already stored
    Cache,
    /// Fetch from the sensor provider
    Upstream,
}

/// True when something was fetched successfully less than
/// `threshold_minutes` before `now`
///
/// No prior success is never fresh. A `last` in the future (clock skew)
/// counts as fresh.
pub fn is_fresh(last_successful_fetch_at: Option<Timestamp>, now: Timestamp, threshold_minutes: i64) -> bool {
    match last_successful_fetch_at {
        None => false,
        Some(last) => {
            let age_ms = (now - last).num_milliseconds();
            age_ms < threshold_minutes.saturating_mul(MILLIS_PER_MINUTE)
        }
    }
}

/// Decision table: a forced refresh always goes upstream, otherwise the cache
/// is used iff it is fresh
pub fn select_data_source(force_refresh: bool, is_fresh: bool) -> DataSource {
    if force_refresh || !is_fresh {
        DataSource::Upstream
    } else {
        DataSource::Cache
    }
}

/// Completion instant of the newest `success` row
///
/// `entries` is the fetch log of a single station, in any order.
pub fn last_successful_fetch(entries: &[FetchLogEntry]) -> Option<Timestamp> {
    entries
        .iter()
        .filter(|entry| entry.status == FetchStatus::Success)
        .filter_map(|entry| entry.fetch_completed_at)
        .max()
}

/// Whether a summary created at `created_at` is still within `ttl_minutes`
pub fn is_analysis_fresh(created_at: Timestamp, now: Timestamp, ttl_minutes: i64) -> bool {
    is_fresh(Some(created_at), now, ttl_minutes)
}

/// Staleness threshold for fetched readings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FreshnessConfig {
    pub threshold_minutes: i64,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            threshold_minutes: DEFAULT_FRESHNESS_THRESHOLD_MINUTES,
        }
    }
}

impl FreshnessConfig {
    /// Threshold in minutes
    pub fn new(threshold_minutes: i64) -> Self {
        Self { threshold_minutes }
    }

    /// Reject non-positive thresholds
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold_minutes <= 0 {
            return Err(ConfigError::NotPositive("freshness_threshold_minutes"));
        }
        Ok(())
    }
}

/// Cache-or-upstream decision for one station
#[derive(Debug, Clone, Copy, Default)]
pub struct FreshnessGate {
    config: FreshnessConfig,
}

impl FreshnessGate {
    /// Gate with the given threshold
    pub fn new(config: FreshnessConfig) -> Self {
        Self { config }
    }

    /// Active threshold
    pub fn config(&self) -> FreshnessConfig {
        self.config
    }

    /// [`is_fresh`] with the configured threshold
    pub fn is_fresh(&self, last_successful_fetch_at: Option<Timestamp>, now: Timestamp) -> bool {
        is_fresh(last_successful_fetch_at, now, self.config.threshold_minutes)
    }

    /// Full decision from a station's fetch log snapshot
    pub fn decide(&self, entries: &[FetchLogEntry], now: Timestamp, force_refresh: bool) -> DataSource {
        let fresh = self.is_fresh(last_successful_fetch(entries), now);
        select_data_source(force_refresh, fresh)
    }
}

/// Lifetime of cached station summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisTtl {
    pub ttl_minutes: i64,
}

impl Default for AnalysisTtl {
    fn default() -> Self {
        Self {
            ttl_minutes: DEFAULT_ANALYSIS_TTL_MINUTES,
        }
    }
}

impl AnalysisTtl {
    /// Lifetime in minutes
    pub fn new(ttl_minutes: i64) -> Self {
        Self { ttl_minutes }
    }

    /// Reject non-positive lifetimes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl_minutes <= 0 {
            return Err(ConfigError::NotPositive("analysis_ttl_minutes"));
        }
        Ok(())
    }

    /// Whether `entry` can be served instead of generating a new summary
    pub fn is_fresh(&self, entry: &AnalysisCacheEntry, now: Timestamp) -> bool {
        is_analysis_fresh(entry.created_at, now, self.ttl_minutes)
    }
}
