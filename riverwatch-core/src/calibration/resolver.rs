//! Applies calibration offsets to raw readings

use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::offset::{CalibrationOffset, OffsetId};
use crate::{model::{ChannelId, Reading}, time::Timestamp};

/// Result of resolving one raw value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution<'a> {
    pub corrected_value: f64,
    /// Offset that produced the correction, if any matched
    pub applied_offset: Option<&'a CalibrationOffset>,
}

/// A stored reading with its correction overlaid
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CorrectedReading {
    pub reading: Reading,
    pub corrected_value: f64,
    pub applied_offset_id: Option<OffsetId>,
}

impl CorrectedReading {
    /// Whether an offset changed this reading
    pub fn is_corrected(&self) -> bool {
        self.applied_offset_id.is_some()
    }
}

/// Looks up the offset in force at an instant and applies it
///
/// Borrows a snapshot of offsets; building one is free, so create it per
/// request rather than caching it.
#[derive(Debug, Clone, Copy)]
pub struct OffsetResolver<'a> {
    offsets: &'a [CalibrationOffset],
    channel: Option<&'a ChannelId>,
}

impl<'a> OffsetResolver<'a> {
    /// Resolver over offsets that all belong to the reading's channel
    pub fn new(offsets: &'a [CalibrationOffset]) -> Self {
        Self {
            offsets,
            channel: None,
        }
    }

    /// Resolver over a mixed slice, restricted to `channel`
    pub fn for_channel(offsets: &'a [CalibrationOffset], channel: &'a ChannelId) -> Self {
        Self {
            offsets,
            channel: Some(channel),
        }
    }

    fn candidates(&self) -> impl Iterator<Item = &'a CalibrationOffset> {
        let channel = self.channel;
        self.offsets
            .iter()
            .filter(move |offset| channel.map_or(true, |channel| &offset.channel_id == channel))
    }

    /// Corrected value of `raw_value` taken at `timestamp`
    ///
    /// First match in slice order wins. Never fails: offsets with inverted
    /// windows never match, and several matches (a broken non-overlap
    /// invariant) only produce a warning.
    pub fn resolve(&self, raw_value: f64, timestamp: Timestamp) -> Resolution<'a> {
        let mut matches = self
            .candidates()
            .filter(|offset| offset.window.contains(timestamp));

        let applied = matches.next();

        if let (Some(first), Some(second)) = (applied, matches.next()) {
            log_warn!(
                "overlapping offsets {} and {} on channel {} at {}; applying {}",
                first.id,
                second.id,
                first.channel_id,
                timestamp,
                first.id
            );
        }

        match applied {
            Some(offset) => Resolution {
                corrected_value: raw_value + offset.offset_value,
                applied_offset: Some(offset),
            },
            None => Resolution {
                corrected_value: raw_value,
                applied_offset: None,
            },
        }
    }

    /// Overlay the correction on a stored reading
    pub fn correct(&self, reading: &Reading) -> CorrectedReading {
        let resolution = self.resolve(reading.value, reading.measured_at);
        CorrectedReading {
            reading: reading.clone(),
            corrected_value: resolution.corrected_value,
            applied_offset_id: resolution.applied_offset.map(|offset| offset.id),
        }
    }

    /// [`correct`](Self::correct) over a whole series, order preserved
    pub fn correct_series(&self, readings: &[Reading]) -> Vec<CorrectedReading> {
        readings.iter().map(|reading| self.correct(reading)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::ValidityWindow;
    use chrono::{TimeZone, Utc};

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn bad_calibration() -> CalibrationOffset {
        CalibrationOffset {
            id: 11,
            channel_id: "pH-1".into(),
            offset_value: 56.14,
            window: ValidityWindow::ongoing(ts(2024, 12, 12, 22, 30)),
            reason: "bad calibration".into(),
            created_at: ts(2024, 12, 12, 22, 35),
        }
    }

    #[test]
    fn ongoing_offset_applies_after_start() {
        let offsets = [bad_calibration()];
        let resolution = OffsetResolver::new(&offsets).resolve(7.2, ts(2025, 1, 1, 0, 0));

        assert!((resolution.corrected_value - 63.34).abs() < 1e-9);
        assert_eq!(resolution.applied_offset.map(|o| o.id), Some(11));
    }

    #[test]
    fn reading_before_window_is_untouched() {
        let offsets = [bad_calibration()];
        let resolution = OffsetResolver::new(&offsets).resolve(7.2, ts(2024, 1, 1, 0, 0));

        assert_eq!(resolution.corrected_value, 7.2);
        assert!(resolution.applied_offset.is_none());
    }

    #[test]
    fn no_offsets_means_raw_value() {
        let resolution = OffsetResolver::new(&[]).resolve(-3.5, ts(2025, 1, 1, 0, 0));
        assert_eq!(resolution.corrected_value, -3.5);
        assert!(resolution.applied_offset.is_none());
    }

    #[test]
    fn first_match_wins_when_windows_overlap() {
        let mut second = bad_calibration();
        second.id = 12;
        second.offset_value = 1.0;
        let offsets = [bad_calibration(), second];

        let resolution = OffsetResolver::new(&offsets).resolve(1.0, ts(2025, 1, 1, 0, 0));
        assert_eq!(resolution.applied_offset.map(|o| o.id), Some(11));

        let reversed = [offsets[1].clone(), offsets[0].clone()];
        let resolution = OffsetResolver::new(&reversed).resolve(1.0, ts(2025, 1, 1, 0, 0));
        assert_eq!(resolution.applied_offset.map(|o| o.id), Some(12));
        assert_eq!(resolution.corrected_value, 2.0);
    }

    #[test]
    fn inverted_offset_never_matches() {
        let mut broken = bad_calibration();
        broken.window = ValidityWindow::bounded(ts(2025, 2, 1, 0, 0), ts(2025, 1, 1, 0, 0));
        let offsets = [broken];

        let resolution = OffsetResolver::new(&offsets).resolve(7.0, ts(2025, 1, 15, 0, 0));
        assert_eq!(resolution.corrected_value, 7.0);
        assert!(resolution.applied_offset.is_none());
    }

    #[test]
    fn channel_filter_skips_foreign_offsets() {
        let mut temp = bad_calibration();
        temp.id = 20;
        temp.channel_id = "Temp-1".into();
        temp.offset_value = -1.5;
        let offsets = [temp, bad_calibration()];

        let channel: ChannelId = "Temp-1".into();
        let resolution = OffsetResolver::for_channel(&offsets, &channel).resolve(20.0, ts(2025, 1, 1, 0, 0));
        assert_eq!(resolution.applied_offset.map(|o| o.id), Some(20));
        assert_eq!(resolution.corrected_value, 18.5);

        let other: ChannelId = "Cond-1".into();
        let resolution = OffsetResolver::for_channel(&offsets, &other).resolve(20.0, ts(2025, 1, 1, 0, 0));
        assert!(resolution.applied_offset.is_none());
    }

    #[test]
    fn series_correction_keeps_order_and_marks_offsets() {
        let offsets = [bad_calibration()];
        let readings = [
            Reading::new("pH-1", ts(2024, 12, 12, 22, 0), 7.0),
            Reading::new("pH-1", ts(2024, 12, 12, 22, 30), 7.0),
            Reading::new("pH-1", ts(2024, 12, 12, 23, 0), 7.1),
        ];

        let corrected = OffsetResolver::new(&offsets).correct_series(&readings);
        assert_eq!(corrected.len(), 3);
        assert!(!corrected[0].is_corrected());
        assert!(corrected[1].is_corrected());
        assert!((corrected[2].corrected_value - 63.24).abs() < 1e-9);
        assert_eq!(corrected[2].reading, readings[2]);
    }
}
