//! Malfunction Heuristic Parameters

/// Minimum number of historical readings before any classification.
///
/// Below this the detector always reports a healthy sensor.
pub const DEFAULT_MIN_HISTORY: usize = 10;

/// Number of trailing readings examined by the stuck and erratic checks.
pub const DEFAULT_TRAILING_WINDOW: usize = 20;

/// Standard deviation above this fraction of the mean counts as erratic.
pub const DEFAULT_ERRATIC_RATIO: f64 = 0.8;

/// Erratic check only runs when the window mean exceeds this value.
///
/// The ratio test is scale-relative and says nothing useful for means near
/// zero; this cut-off is the only guard against that.
pub const DEFAULT_ERRATIC_MIN_MEAN: f64 = 1.0;
