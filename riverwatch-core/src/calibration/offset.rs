//! Offset records, validity windows and the overlap gate

use alloc::string::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    errors::{CalibrationError, CalibrationResult},
    model::ChannelId,
    time::Timestamp,
};

/// Store-assigned offset identifier
pub type OffsetId = u64;

/// Closed time interval, unbounded on the right when `valid_until` is `None`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValidityWindow {
    pub valid_from: Timestamp,
    pub valid_until: Option<Timestamp>,
}

impl ValidityWindow {
    /// Window with an explicit end
    pub fn bounded(valid_from: Timestamp, valid_until: Timestamp) -> Self {
        Self {
            valid_from,
            valid_until: Some(valid_until),
        }
    }

    /// Window still in force
    pub fn ongoing(valid_from: Timestamp) -> Self {
        Self {
            valid_from,
            valid_until: None,
        }
    }

    /// No end instant yet
    pub fn is_ongoing(&self) -> bool {
        self.valid_until.is_none()
    }

    /// End precedes start; such a window contains no instant at all
    pub fn is_inverted(&self) -> bool {
        matches!(self.valid_until, Some(until) if until < self.valid_from)
    }

    /// Inclusive on both ends
    pub fn contains(&self, instant: Timestamp) -> bool {
        instant >= self.valid_from && self.valid_until.map_or(true, |until| instant <= until)
    }

    /// True when some instant lies in both windows
    ///
    /// Sharing a single boundary instant counts as overlapping.
    pub fn overlaps(&self, other: &ValidityWindow) -> bool {
        if self.is_inverted() || other.is_inverted() {
            return false;
        }

        let starts_before_other_ends = other.valid_until.map_or(true, |end| self.valid_from <= end);
        let other_starts_before_end = self.valid_until.map_or(true, |end| other.valid_from <= end);

        starts_before_other_ends && other_starts_before_end
    }

    /// Close the window at `at`
    pub fn close_at(&mut self, at: Timestamp) {
        self.valid_until = Some(at);
    }
}

/// Stored additive correction for one channel
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationOffset {
    pub id: OffsetId,
    pub channel_id: ChannelId,
    /// Added to raw readings inside the window
    pub offset_value: f64,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub window: ValidityWindow,
    pub reason: String,
    pub created_at: Timestamp,
}

impl CalibrationOffset {
    /// Whether this offset corrects a reading of `channel` taken at `instant`
    pub fn applies_to(&self, channel: &ChannelId, instant: Timestamp) -> bool {
        &self.channel_id == channel && self.window.contains(instant)
    }

    /// Deactivate: the offset stays on record but stops at `now`
    pub fn deactivate(&mut self, now: Timestamp) {
        self.window.close_at(now);
    }

    /// Field-level checks shared by create and update
    pub fn validate(&self) -> CalibrationResult<()> {
        validate_fields(&self.channel_id, self.offset_value, &self.window, &self.reason)
    }
}

/// Creation request for an offset, before the store assigns an id
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NewCalibrationOffset {
    pub channel_id: ChannelId,
    pub offset_value: f64,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub window: ValidityWindow,
    pub reason: String,
}

impl NewCalibrationOffset {
    /// Reject blank required fields, non-finite values and inverted windows
    pub fn validate(&self) -> CalibrationResult<()> {
        validate_fields(&self.channel_id, self.offset_value, &self.window, &self.reason)
    }

    /// Materialize with a store-assigned id
    pub fn into_offset(self, id: OffsetId, created_at: Timestamp) -> CalibrationOffset {
        CalibrationOffset {
            id,
            channel_id: self.channel_id,
            offset_value: self.offset_value,
            window: self.window,
            reason: self.reason,
            created_at,
        }
    }
}

/// Partial update of an existing offset
///
/// `valid_until: Some(None)` reopens the offset as ongoing, `None` leaves the
/// end untouched. In JSON an explicit `null` reopens and an absent field
/// leaves the end alone.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OffsetPatch {
    pub offset_value: Option<f64>,
    pub valid_from: Option<Timestamp>,
    #[cfg_attr(
        feature = "serde",
        serde(
            default,
            deserialize_with = "present_field",
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub valid_until: Option<Option<Timestamp>>,
    pub reason: Option<String>,
}

impl OffsetPatch {
    /// Updated copy of `offset`; the original is left alone so a rejected
    /// patch leaves no trace
    pub fn apply(&self, offset: &CalibrationOffset) -> CalibrationOffset {
        let mut updated = offset.clone();
        if let Some(value) = self.offset_value {
            updated.offset_value = value;
        }
        if let Some(from) = self.valid_from {
            updated.window.valid_from = from;
        }
        if let Some(until) = self.valid_until {
            updated.window.valid_until = until;
        }
        if let Some(reason) = &self.reason {
            updated.reason = reason.clone();
        }
        updated
    }

    /// Nothing to change
    pub fn is_empty(&self) -> bool {
        self.offset_value.is_none()
            && self.valid_from.is_none()
            && self.valid_until.is_none()
            && self.reason.is_none()
    }
}

/// Field present in the input, even as `null`
#[cfg(feature = "serde")]
fn present_field<'de, D>(deserializer: D) -> Result<Option<Option<Timestamp>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Timestamp>::deserialize(deserializer).map(Some)
}

fn validate_fields(
    channel_id: &ChannelId,
    offset_value: f64,
    window: &ValidityWindow,
    reason: &str,
) -> CalibrationResult<()> {
    if channel_id.as_str().trim().is_empty() {
        return Err(CalibrationError::MissingField("channel_id"));
    }
    if reason.trim().is_empty() {
        return Err(CalibrationError::MissingField("reason"));
    }
    if !offset_value.is_finite() {
        return Err(CalibrationError::NonFiniteOffset);
    }
    if window.is_inverted() {
        return Err(CalibrationError::InvertedWindow);
    }
    Ok(())
}

/// Pre-insert overlap gate
///
/// Scans `existing` for offsets of `channel` whose window intersects
/// `candidate`. `exclude` skips the offset being updated so it does not
/// conflict with its own previous window. Offsets of other channels are
/// ignored, so the full table may be passed in.
pub fn check_no_overlap(
    existing: &[CalibrationOffset],
    channel: &ChannelId,
    candidate: &ValidityWindow,
    exclude: Option<OffsetId>,
) -> CalibrationResult<()> {
    let conflict = existing
        .iter()
        .filter(|offset| &offset.channel_id == channel)
        .filter(|offset| Some(offset.id) != exclude)
        .find(|offset| offset.window.overlaps(candidate));

    match conflict {
        Some(offset) => Err(CalibrationError::Overlap {
            existing_id: offset.id,
        }),
        None => Ok(()),
    }
}
