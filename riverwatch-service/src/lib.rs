//! RiverWatch Service Layer
//!
//! ## Overview
//!
//! Async orchestration on top of `riverwatch-core` and `riverwatch-store`.
//! Collaborators outside the workspace plug in through two traits:
//!
//! - [`UpstreamProvider`]: the third-party sensor API
//! - [`AnalysisGenerator`]: the text model producing station summaries
//!
//! ## Components
//!
//! | type                 | job                                                         |
//! |----------------------|-------------------------------------------------------------|
//! | [`StationService`]   | cache-or-upstream decision, refresh, corrected series, health |
//! | [`CalibrationAdmin`] | password-gated offset and reading management                |
//! | [`AnalysisService`]  | TTL cache in front of the summary generator                 |
//! | [`MonitorConfig`]    | thresholds and secrets, loaded from TOML                    |
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use riverwatch_service::{MonitorConfig, StationService, UpstreamProvider};
//! use riverwatch_store::MemoryStore;
//!
//! # async fn example(provider: Arc<dyn UpstreamProvider>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = MonitorConfig::from_file("riverwatch.toml")?.with_env_overrides();
//! let service = StationService::new(Arc::new(MemoryStore::new()), provider, &config);
//!
//! let data = service.station_data(&"limmat-zurich".into(), false).await?;
//! println!("{} readings from {:?}", data.readings.len(), data.source);
//!
//! for assessment in service.channel_health(&"limmat-zurich".into())? {
//!     if let Some(reason) = assessment.diagnosis.reason() {
//!         println!("{}: {}", assessment.channel_id, reason);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod admin;
pub mod analysis;
pub mod config;
pub mod refresh;
pub mod upstream;

pub use admin::{AdminError, AdminOutcome, CalibrationAction, CalibrationAdmin, CalibrationRequest};
pub use analysis::{Analysis, AnalysisError, AnalysisGenerator, AnalysisService, GeneratedAnalysis};
pub use config::{ConfigLoadError, MonitorConfig, CALIBRATION_PASSWORD_ENV};
pub use refresh::{PersistenceHandle, RefreshError, RefreshOutcome, StationData, StationService};
pub use upstream::{StationSnapshot, UpstreamError, UpstreamProvider};
