//! The `OutputWriter` trait implemented by trace backends.

use crate::{BrainSnapshotRow, OutputResult, TickSummaryRow};

/// A sink for brain snapshots and tick summaries.
///
/// Errors are stored by [`TraceObserver`][crate::TraceObserver] and
/// retrieved with [`take_error`][crate::TraceObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of brain snapshots.
    fn write_snapshots(&mut self, rows: &[BrainSnapshotRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
