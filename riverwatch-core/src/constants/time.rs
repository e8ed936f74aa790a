//! Time-Related Constants

/// Age (minutes) after which fetched readings are refetched from upstream.
///
/// The sensor provider publishes new values every few minutes; 15 minutes
/// keeps page loads off the upstream API without showing visibly old data.
pub const DEFAULT_FRESHNESS_THRESHOLD_MINUTES: i64 = 15;

/// Lifetime (minutes) of a cached natural-language station summary.
///
/// Summaries are expensive to produce and change slowly.
pub const DEFAULT_ANALYSIS_TTL_MINUTES: i64 = 60;
