//! Password-gated calibration management
//!
//! Operators create, adjust and retire calibration offsets and remove bad
//! readings. Every request carries the shared secret; it is checked before the
//! action is looked at, so a wrong password never reveals whether an id exists.

use std::fmt;
use std::sync::Arc;

use log::{info, warn};
use riverwatch_core::{
    CalibrationOffset, ChannelId, NewCalibrationOffset, OffsetId, OffsetPatch, Reading,
    SystemClock, TimeSource, Timestamp,
};
use riverwatch_store::{MonitorStore, StoreError};
use serde::Deserialize;
use thiserror::Error;

use crate::config::MonitorConfig;

/// Rejections of calibration management requests
#[derive(Debug, Error)]
pub enum AdminError {
    /// Missing, wrong, or no secret configured
    #[error("unauthorized")]
    Unauthorized,

    #[error("patch changes nothing")]
    EmptyPatch,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AdminError {
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Window overlaps an existing offset of the channel
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Store(err) if err.is_conflict())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::OffsetNotFound(_) | StoreError::ReadingNotFound { .. })
        )
    }
}

/// What an operator wants done
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CalibrationAction {
    Create(NewCalibrationOffset),
    Update { id: OffsetId, patch: OffsetPatch },
    /// End an offset now, keeping it as history
    Deactivate { id: OffsetId },
    Delete { id: OffsetId },
    DeleteReading {
        channel_id: ChannelId,
        measured_at: Timestamp,
    },
}

/// One authenticated management request
#[derive(Clone, Deserialize)]
pub struct CalibrationRequest {
    pub password: String,
    #[serde(flatten)]
    pub action: CalibrationAction,
}

impl CalibrationRequest {
    pub fn new(password: impl Into<String>, action: CalibrationAction) -> Self {
        Self {
            password: password.into(),
            action,
        }
    }
}

impl fmt::Debug for CalibrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalibrationRequest")
            .field("password", &"<redacted>")
            .field("action", &self.action)
            .finish()
    }
}

/// Result of a successful request
#[derive(Debug, Clone, PartialEq)]
pub enum AdminOutcome {
    Created(CalibrationOffset),
    Updated(CalibrationOffset),
    Deactivated(CalibrationOffset),
    Deleted(CalibrationOffset),
    ReadingDeleted(Reading),
}

/// Executes [`CalibrationRequest`]s against the store
pub struct CalibrationAdmin {
    store: Arc<dyn MonitorStore>,
    password: Option<String>,
    clock: Arc<dyn TimeSource>,
}

impl CalibrationAdmin {
    pub fn new(store: Arc<dyn MonitorStore>, config: &MonitorConfig) -> Self {
        Self {
            store,
            password: config.calibration_password.clone(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Offsets of a channel, ordered by start; reading them needs no secret
    pub fn offsets(&self, channel: &ChannelId) -> Result<Vec<CalibrationOffset>, AdminError> {
        Ok(self.store.offsets_for_channel(channel)?)
    }

    /// Authenticate, then run the action
    pub fn handle(&self, request: CalibrationRequest) -> Result<AdminOutcome, AdminError> {
        if !self.authorized(&request.password) {
            warn!("Rejected calibration request: bad credentials");
            return Err(AdminError::Unauthorized);
        }

        let outcome = match request.action {
            CalibrationAction::Create(draft) => {
                AdminOutcome::Created(self.store.create_offset(draft, self.clock.now())?)
            }
            CalibrationAction::Update { id, patch } => {
                if patch.is_empty() {
                    return Err(AdminError::EmptyPatch);
                }
                AdminOutcome::Updated(self.store.update_offset(id, &patch)?)
            }
            CalibrationAction::Deactivate { id } => {
                AdminOutcome::Deactivated(self.store.deactivate_offset(id, self.clock.now())?)
            }
            CalibrationAction::Delete { id } => AdminOutcome::Deleted(self.store.delete_offset(id)?),
            CalibrationAction::DeleteReading {
                channel_id,
                measured_at,
            } => AdminOutcome::ReadingDeleted(self.store.delete_reading(&channel_id, measured_at)?),
        };

        info!("Calibration request applied: {:?}", outcome);
        Ok(outcome)
    }

    fn authorized(&self, supplied: &str) -> bool {
        match &self.password {
            Some(secret) if !secret.is_empty() => constant_time_eq(secret.as_bytes(), supplied.as_bytes()),
            _ => false,
        }
    }
}

/// Comparison whose running time depends only on the lengths
fn constant_time_eq(expected: &[u8], supplied: &[u8]) -> bool {
    let len_diff = expected.len() ^ supplied.len();
    let byte_diff = expected
        .iter()
        .zip(supplied.iter().cycle())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b));
    len_diff == 0 && byte_diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_time_eq_matches_plain_equality() {
        assert!(constant_time_eq(b"river", b"river"));
        assert!(!constant_time_eq(b"river", b"rivet"));
        assert!(!constant_time_eq(b"river", b"riverwatch"));
        assert!(!constant_time_eq(b"river", b"riv"));
        assert!(!constant_time_eq(b"river", b""));
    }

    #[test]
    fn request_debug_hides_password() {
        let request = CalibrationRequest::new("s3cret", CalibrationAction::Delete { id: 4 });
        let rendered = format!("{request:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("Delete"));
    }

    #[test]
    fn request_parses_from_json() {
        let request: CalibrationRequest =
            serde_json::from_str(r#"{"password":"pw","action":"deactivate","id":3}"#).unwrap();
        assert_eq!(request.action, CalibrationAction::Deactivate { id: 3 });

        let create: CalibrationRequest = serde_json::from_str(
            r#"{
                "password": "pw",
                "action": "create",
                "channel_id": "pH-1",
                "offset_value": -0.2,
                "valid_from": "2025-01-01T00:00:00Z",
                "valid_until": null,
                "reason": "probe drift"
            }"#,
        )
        .unwrap();
        match create.action {
            CalibrationAction::Create(draft) => {
                assert_eq!(draft.channel_id.as_str(), "pH-1");
                assert!(draft.window.is_ongoing());
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn update_with_null_end_reopens_offset() {
        let reopen: CalibrationRequest = serde_json::from_str(
            r#"{"password":"pw","action":"update","id":3,"patch":{"valid_until":null}}"#,
        )
        .unwrap();
        match reopen.action {
            CalibrationAction::Update { id, patch } => {
                assert_eq!(id, 3);
                assert_eq!(patch.valid_until, Some(None));
                assert!(!patch.is_empty());
            }
            other => panic!("unexpected action {other:?}"),
        }

        let untouched: CalibrationRequest = serde_json::from_str(
            r#"{"password":"pw","action":"update","id":3,"patch":{"offset_value":0.4}}"#,
        )
        .unwrap();
        match untouched.action {
            CalibrationAction::Update { patch, .. } => {
                assert_eq!(patch.valid_until, None);
                assert_eq!(patch.offset_value, Some(0.4));
            }
            other => panic!("unexpected action {other:?}"),
        }
    }
}
