//! Third-party sensor API boundary
//!
//! The concrete HTTP client lives outside this workspace. It implements
//! [`UpstreamProvider`] and maps its failures onto [`UpstreamError`].

use async_trait::async_trait;
use riverwatch_core::{Channel, Reading, StationId, Timestamp};
use thiserror::Error;

/// Failures of the sensor API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// Credentials rejected by the provider
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Provider configuration is missing or malformed
    #[error("misconfigured provider: {0}")]
    Config(String),

    /// Provider answered but had nothing for the station
    #[error("no data for station {0}")]
    NoData(StationId),

    /// Network failure, timeout or unexpected status
    #[error("transport error: {0}")]
    Transport(String),
}

/// Everything one fetch returns for a station
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationSnapshot {
    pub channels: Vec<Channel>,
    /// Readings of every channel, in provider order
    pub readings: Vec<Reading>,
}

impl StationSnapshot {
    /// Newest measurement instant in the snapshot
    pub fn latest_measured_at(&self) -> Option<Timestamp> {
        self.readings.iter().map(|r| r.measured_at).max()
    }
}

/// Source of fresh station data
#[async_trait]
pub trait UpstreamProvider: Send + Sync {
    /// Fetch channels and readings measured at or after `since`
    ///
    /// `None` asks for the provider's default backfill.
    async fn fetch_station(
        &self,
        station: &StationId,
        since: Option<Timestamp>,
    ) -> Result<StationSnapshot, UpstreamError>;
}
