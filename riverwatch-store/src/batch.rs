//! Chunked reading writes
//!
//! Upstream backfills can return tens of thousands of rows. Each chunk is one
//! [`ReadingStore::insert_batch`] call; a failure stops the run and keeps the
//! chunks already written.

use log::{debug, warn};
use riverwatch_core::Reading;

use crate::traits::ReadingStore;
use crate::{StoreError, StoreResult};

/// Outcome of a fully successful [`write_in_batches`] run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub written: usize,
    pub batches: usize,
}

/// Write `readings` in chunks of `batch_size`
///
/// A zero `batch_size` is treated as one. On failure returns
/// [`StoreError::PartialWrite`] with the rows committed so far and the
/// zero-based index of the failing batch.
pub fn write_in_batches<S>(store: &S, readings: &[Reading], batch_size: usize) -> StoreResult<BatchReport>
where
    S: ReadingStore + ?Sized,
{
    let batch_size = batch_size.max(1);
    let mut report = BatchReport { written: 0, batches: 0 };

    for (index, chunk) in readings.chunks(batch_size).enumerate() {
        match store.insert_batch(chunk) {
            Ok(written) => {
                report.written += written;
                report.batches += 1;
                debug!("Batch {} committed ({} rows)", index, written);
            }
            Err(source) => {
                warn!(
                    "Batch {} failed after {} rows were written: {}",
                    index, report.written, source
                );
                return Err(StoreError::PartialWrite {
                    written: report.written,
                    failed_batch: index,
                    source: Box::new(source),
                });
            }
        }
    }

    Ok(report)
}
