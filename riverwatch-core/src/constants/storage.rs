//! Bulk Write Sizing

/// Rows per insert batch when persisting fetched readings.
///
/// Each batch is written as one unit of work. Earlier batches stay durable
/// when a later one fails.
pub const DEFAULT_INSERT_BATCH_SIZE: usize = 1000;
