//! Running counters over decoded records.

use std::{collections::BTreeMap, num::NonZeroUsize};

use super::{History, ProgressSnapshot};
use crate::record::Record;

/// Outcome code treated as success unless configured otherwise.
pub const DEFAULT_SUCCESS_CODE: u16 = 200;

/// Classification and retention settings for a [`ProgressAggregator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressConfig {
    success_code: u16,
    history_limit: Option<NonZeroUsize>,
}

impl ProgressConfig {
    /// Success on [`DEFAULT_SUCCESS_CODE`], unbounded history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            success_code: DEFAULT_SUCCESS_CODE,
            history_limit: None,
        }
    }

    /// Outcome code counted as success; every other code is a failure.
    #[must_use]
    pub const fn with_success_code(mut self, code: u16) -> Self {
        self.success_code = code;
        self
    }

    /// Cap retained history at `limit` records, evicting the oldest.
    #[must_use]
    pub const fn with_history_limit(mut self, limit: Option<NonZeroUsize>) -> Self {
        self.history_limit = limit;
        self
    }

    /// Configured success code.
    #[must_use]
    pub const fn success_code(&self) -> u16 { self.success_code }

    /// Configured history cap.
    #[must_use]
    pub const fn history_limit(&self) -> Option<NonZeroUsize> { self.history_limit }
}

impl Default for ProgressConfig {
    fn default() -> Self { Self::new() }
}

/// Single-owner accumulator of progress counters and record history.
///
/// The declared total follows the most recently observed record that carries
/// one. Records without a total leave it unchanged, and revisions are never
/// treated as errors.
///
/// # Examples
///
/// ```
/// use recordframe::{ProgressAggregator, Record};
///
/// let mut aggregator = ProgressAggregator::default();
/// aggregator.observe(Record::new(1, 200).with_total_records(2));
/// let snapshot = aggregator.observe(Record::new(2, 500).with_total_records(2));
///
/// assert_eq!(snapshot.processed(), 2);
/// assert_eq!(snapshot.success_count(), 1);
/// assert_eq!(snapshot.failure_count(), 1);
/// assert!((snapshot.percent_complete() - 100.0).abs() < f64::EPSILON);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ProgressAggregator {
    config: ProgressConfig,
    processed: u64,
    success_count: u64,
    failure_count: u64,
    declared_total: Option<u64>,
    outcome_counts: BTreeMap<u16, u64>,
    history: History,
}

impl ProgressAggregator {
    /// Create an empty aggregator.
    #[must_use]
    pub fn new(config: ProgressConfig) -> Self {
        Self {
            config,
            history: History::new(config.history_limit()),
            ..Self::default()
        }
    }

    /// Account for one record and return the updated progress.
    pub fn observe(&mut self, record: Record) -> ProgressSnapshot {
        self.processed += 1;
        let code = record.outcome_code();
        if code == self.config.success_code() {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
        }
        *self.outcome_counts.entry(code).or_default() += 1;

        if let Some(total) = record.total_records() {
            if let Some(previous) = self.declared_total.filter(|previous| *previous != total) {
                tracing::debug!(previous, revised = total, "declared total revised");
            }
            self.declared_total = Some(total);
        }

        self.history.push(record);
        self.snapshot()
    }

    /// Current progress without observing anything.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot::new(
            self.processed,
            self.declared_total,
            self.success_count,
            self.failure_count,
            self.outcome_counts.clone(),
            self.history.len(),
            self.history.evicted(),
        )
    }

    /// Records retained so far, oldest first.
    #[must_use]
    pub fn history(&self) -> &History { &self.history }

    /// Consume the aggregator and keep its history.
    #[must_use]
    pub fn into_history(self) -> Vec<Record> { self.history.into_vec() }

    /// Settings in force.
    #[must_use]
    pub const fn config(&self) -> &ProgressConfig { &self.config }
}
