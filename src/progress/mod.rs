//! Aggregate statistics over decoded records.
//!
//! [`ProgressAggregator`] is the single-owner accumulator used when one task
//! drives the stream. [`SharedProgress`] wraps it for cases where snapshots
//! are read from a different task than the one observing records.

pub mod aggregator;
pub mod history;
pub mod shared;
pub mod snapshot;

pub use aggregator::{DEFAULT_SUCCESS_CODE, ProgressAggregator, ProgressConfig};
pub use history::History;
pub use shared::{ProgressWatch, SharedProgress};
pub use snapshot::{ProgressSnapshot, percent_complete};

use crate::record::Record;

/// Destination for records leaving the reassembler.
pub trait ProgressSink {
    /// Account for one record and return the updated progress.
    fn observe(&mut self, record: Record) -> ProgressSnapshot;
}

impl ProgressSink for ProgressAggregator {
    fn observe(&mut self, record: Record) -> ProgressSnapshot { ProgressAggregator::observe(self, record) }
}

impl<S: ProgressSink + ?Sized> ProgressSink for &mut S {
    fn observe(&mut self, record: Record) -> ProgressSnapshot { (**self).observe(record) }
}
