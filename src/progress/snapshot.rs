//! Immutable view of aggregation state.

use std::collections::BTreeMap;

use serde::Serialize;

/// Progress at the moment a record was observed.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    processed: u64,
    declared_total: Option<u64>,
    success_count: u64,
    failure_count: u64,
    percent_complete: f64,
    outcome_counts: BTreeMap<u16, u64>,
    history_len: usize,
    history_evicted: u64,
}

impl ProgressSnapshot {
    pub(crate) fn new(
        processed: u64,
        declared_total: Option<u64>,
        success_count: u64,
        failure_count: u64,
        outcome_counts: BTreeMap<u16, u64>,
        history_len: usize,
        history_evicted: u64,
    ) -> Self {
        Self {
            processed,
            declared_total,
            success_count,
            failure_count,
            percent_complete: percent_complete(processed, declared_total),
            outcome_counts,
            history_len,
            history_evicted,
        }
    }

    /// Records observed so far.
    #[must_use]
    pub const fn processed(&self) -> u64 { self.processed }

    /// Most recently declared batch size.
    #[must_use]
    pub const fn declared_total(&self) -> Option<u64> { self.declared_total }

    /// Records whose outcome matched the success code.
    #[must_use]
    pub const fn success_count(&self) -> u64 { self.success_count }

    /// Records with any other outcome.
    #[must_use]
    pub const fn failure_count(&self) -> u64 { self.failure_count }

    /// Completion in percent, within `0.0..=100.0`.
    #[must_use]
    pub const fn percent_complete(&self) -> f64 { self.percent_complete }

    /// Observed records per outcome code.
    #[must_use]
    pub fn outcome_counts(&self) -> &BTreeMap<u16, u64> { &self.outcome_counts }

    /// Count for a single outcome code.
    #[must_use]
    pub fn outcome_count(&self, code: u16) -> u64 { self.outcome_counts.get(&code).copied().unwrap_or(0) }

    /// Records currently retained in history.
    #[must_use]
    pub const fn history_len(&self) -> usize { self.history_len }

    /// Records dropped from history by the retention limit.
    #[must_use]
    pub const fn history_evicted(&self) -> u64 { self.history_evicted }

    /// Whether every declared record has been observed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.declared_total, Some(total) if total > 0 && self.processed >= total)
    }
}

/// `processed / total * 100`, clamped to `0.0..=100.0`.
///
/// An unknown or zero total yields `0.0`.
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    reason = "percentages tolerate rounding for counts above 2^53"
)]
pub fn percent_complete(processed: u64, declared_total: Option<u64>) -> f64 {
    match declared_total {
        Some(total) if total > 0 => (processed as f64 / total as f64 * 100.0).clamp(0.0, 100.0),
        _ => 0.0,
    }
}
