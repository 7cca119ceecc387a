//! Row-to-Arrow accumulation for result tables

use arrow::array::RecordBatch;

/// Accumulator for normalized records destined for one result table.
///
/// An orchestration run pushes every record it produces into a single
/// accumulator and drains it once at the end; the batch is the result
/// table handed back to the caller.
pub trait Accumulator {
    type Row;

    /// Push a row into the accumulator
    fn push(&mut self, row: Self::Row);

    /// Number of rows currently buffered
    fn len(&self) -> usize;

    /// Check if buffer is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Push every row from an iterator
    fn extend<I: IntoIterator<Item = Self::Row>>(&mut self, rows: I) {
        for row in rows {
            self.push(row);
        }
    }

    /// Drain buffered rows into a RecordBatch, resetting internal state
    fn take_batch(&mut self) -> RecordBatch;
}
