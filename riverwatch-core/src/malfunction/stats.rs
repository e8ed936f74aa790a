//! Window statistics shared by the heuristics
//!
//! Pure functions over slices. Empty input yields `None` instead of NaN so the
//! callers cannot silently compare against NaN.

use crate::model::TimedValue;

/// Last `window` entries, or all of them if fewer
pub fn trailing(readings: &[TimedValue], window: usize) -> &[TimedValue] {
    let start = readings.len().saturating_sub(window);
    &readings[start..]
}

/// Arithmetic mean
pub fn mean(readings: &[TimedValue]) -> Option<f64> {
    if readings.is_empty() {
        return None;
    }
    let sum: f64 = readings.iter().map(|r| r.value).sum();
    Some(sum / readings.len() as f64)
}

/// Population standard deviation (divides by n, not n - 1)
pub fn population_std_dev(readings: &[TimedValue], mean: f64) -> Option<f64> {
    if readings.is_empty() {
        return None;
    }
    let variance = readings
        .iter()
        .map(|r| {
            let delta = r.value - mean;
            delta * delta
        })
        .sum::<f64>()
        / readings.len() as f64;
    Some(libm::sqrt(variance))
}

/// Every value bit-for-bit equal to the first
pub fn all_identical(readings: &[TimedValue]) -> bool {
    match readings.split_first() {
        Some((first, rest)) => rest.iter().all(|r| r.value == first.value),
        None => false,
    }
}
