//! Cached natural-language station summaries
//!
//! Generating a summary is slow and billed per call, so results are stored
//! per `(station, language)` and reused until they are older than the TTL.
//! Staleness is judged from the stored `created_at` alone.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use riverwatch_core::{AnalysisCacheEntry, AnalysisTtl, StationId, SystemClock, TimeSource, Timestamp};
use riverwatch_store::{MonitorStore, StoreError};
use thiserror::Error;

use crate::config::MonitorConfig;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The text generator failed
    #[error("summary generation failed: {0}")]
    Generation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Summary text returned by a generator
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAnalysis {
    pub text: String,
    /// Newest reading the summary describes
    pub data_timestamp: Option<Timestamp>,
}

/// Produces summary text for a station
#[async_trait]
pub trait AnalysisGenerator: Send + Sync {
    async fn generate(&self, station: &StationId, language: &str) -> Result<GeneratedAnalysis, AnalysisError>;
}

/// A served summary and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub entry: AnalysisCacheEntry,
    pub from_cache: bool,
}

/// TTL cache in front of an [`AnalysisGenerator`]
pub struct AnalysisService {
    store: Arc<dyn MonitorStore>,
    generator: Arc<dyn AnalysisGenerator>,
    clock: Arc<dyn TimeSource>,
    ttl: AnalysisTtl,
}

impl AnalysisService {
    pub fn new(
        store: Arc<dyn MonitorStore>,
        generator: Arc<dyn AnalysisGenerator>,
        config: &MonitorConfig,
    ) -> Self {
        Self {
            store,
            generator,
            clock: Arc::new(SystemClock),
            ttl: config.analysis_ttl(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Cached summary if younger than the TTL, otherwise a new one
    ///
    /// A failed generation is returned as an error and leaves any older entry
    /// in place.
    pub async fn analysis(&self, station: &StationId, language: &str) -> Result<Analysis, AnalysisError> {
        let now = self.clock.now();

        if let Some(entry) = self.store.cached_analysis(station, language)? {
            if self.ttl.is_fresh(&entry, now) {
                debug!("Analysis cache hit for {} ({})", station, language);
                return Ok(Analysis {
                    entry,
                    from_cache: true,
                });
            }
        }

        let generated = match self.generator.generate(station, language).await {
            Ok(generated) => generated,
            Err(err) => {
                warn!("Analysis for {} ({}) failed: {}", station, language, err);
                return Err(err);
            }
        };

        let entry = AnalysisCacheEntry {
            station_id: station.clone(),
            language: language.to_string(),
            analysis_text: generated.text,
            data_timestamp: generated.data_timestamp,
            created_at: self.clock.now(),
        };
        self.store.store_analysis(entry.clone())?;
        info!("Stored new analysis for {} ({})", station, language);

        Ok(Analysis {
            entry,
            from_cache: false,
        })
    }
}
