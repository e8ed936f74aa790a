//! Correction followed by classification for one channel
//!
//! The order matters: a probe with a known calibration error is judged on its
//! corrected values, so an operator offset can bring a flagged channel back
//! into range.

use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    calibration::{CalibrationOffset, CorrectedReading, OffsetResolver},
    malfunction::{Diagnosis, MalfunctionDetector, MetricKind},
    model::{Channel, ChannelId, Reading, TimedValue},
};

/// Everything the dashboard shows for one channel
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelAssessment {
    pub channel_id: ChannelId,
    pub metric: MetricKind,
    /// Full series with corrections overlaid, oldest first
    pub series: Vec<CorrectedReading>,
    pub diagnosis: Diagnosis,
}

impl ChannelAssessment {
    /// Most recent corrected reading
    pub fn latest(&self) -> Option<&CorrectedReading> {
        self.series.last()
    }
}

/// Correct `readings` with the channel's offsets and classify the result
///
/// `readings` must be ordered oldest first. `offsets` may contain other
/// channels' offsets; only the channel's own are applied. The last corrected
/// value is the detector's current value; an empty series is healthy.
pub fn assess_channel(
    channel: &Channel,
    readings: &[Reading],
    offsets: &[CalibrationOffset],
    detector: &MalfunctionDetector,
) -> ChannelAssessment {
    let metric = MetricKind::from_sensor_name(&channel.name);
    let series = OffsetResolver::for_channel(offsets, &channel.id).correct_series(readings);

    let diagnosis = match series.last() {
        Some(latest) => {
            let history: Vec<TimedValue> = series
                .iter()
                .map(|corrected| TimedValue {
                    timestamp: corrected.reading.measured_at,
                    value: corrected.corrected_value,
                })
                .collect();
            detector.detect_metric(metric, &history, latest.corrected_value)
        }
        None => Diagnosis::Healthy,
    };

    ChannelAssessment {
        channel_id: channel.id.clone(),
        metric,
        series,
        diagnosis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        calibration::ValidityWindow,
        malfunction::MalfunctionReason,
        time::Timestamp,
    };
    use chrono::{Duration, TimeZone, Utc};

    fn start() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap()
    }

    fn ph_channel() -> Channel {
        Channel {
            id: "pH-1".into(),
            station_id: "limmat-zurich".into(),
            name: "pH".into(),
            unit: None,
        }
    }

    fn readings(values: &[f64]) -> Vec<Reading> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Reading::new("pH-1", start() + Duration::minutes(15 * i as i64), v))
            .collect()
    }

    #[test]
    fn empty_series_is_healthy() {
        let assessment = assess_channel(&ph_channel(), &[], &[], &MalfunctionDetector::default());
        assert!(assessment.latest().is_none());
        assert_eq!(assessment.diagnosis, Diagnosis::Healthy);
        assert_eq!(assessment.metric, MetricKind::Ph);
    }

    #[test]
    fn offset_brings_channel_back_into_range() {
        let raw: Vec<f64> = (0..12).map(|i| -1.0 + 0.05 * (i % 4) as f64).collect();
        let series = readings(&raw);
        let detector = MalfunctionDetector::default();

        let uncorrected = assess_channel(&ph_channel(), &series, &[], &detector);
        assert!(matches!(
            uncorrected.diagnosis.reason(),
            Some(MalfunctionReason::OutOfRange { .. })
        ));

        let offsets = [CalibrationOffset {
            id: 3,
            channel_id: "pH-1".into(),
            offset_value: 8.0,
            window: ValidityWindow::ongoing(start()),
            reason: "reference electrode replaced".into(),
            created_at: start(),
        }];
        let corrected = assess_channel(&ph_channel(), &series, &offsets, &detector);
        assert_eq!(corrected.diagnosis, Diagnosis::Healthy);
        assert_eq!(corrected.latest().and_then(|r| r.applied_offset_id), Some(3));
    }

    #[test]
    fn foreign_offsets_are_ignored() {
        let offsets = [CalibrationOffset {
            id: 9,
            channel_id: "Temp-1".into(),
            offset_value: 100.0,
            window: ValidityWindow::ongoing(start()),
            reason: "wrong channel".into(),
            created_at: start(),
        }];
        let assessment = assess_channel(&ph_channel(), &readings(&[7.0, 7.1]), &offsets, &MalfunctionDetector::default());
        assert!(assessment.series.iter().all(|r| !r.is_corrected()));
    }
}
