//! Ordered retention of observed records.

use std::{collections::VecDeque, num::NonZeroUsize};

use crate::record::Record;

/// Append-only record history with an optional retention cap.
///
/// Without a cap every record is kept in arrival order. With a cap the oldest
/// record is evicted once the cap is reached and the eviction is counted.
#[derive(Clone, Debug, Default)]
pub struct History {
    records: VecDeque<Record>,
    limit: Option<NonZeroUsize>,
    evicted: u64,
}

impl History {
    /// Create a history, optionally bounded to `limit` records.
    #[must_use]
    pub fn new(limit: Option<NonZeroUsize>) -> Self {
        Self {
            records: VecDeque::new(),
            limit,
            evicted: 0,
        }
    }

    /// Append a record, returning the one evicted to make room, if any.
    pub fn push(&mut self, record: Record) -> Option<Record> {
        let evicted = match self.limit {
            Some(limit) if self.records.len() >= limit.get() => {
                self.evicted += 1;
                self.records.pop_front()
            }
            _ => None,
        };
        self.records.push_back(record);
        evicted
    }

    /// Retained records, oldest first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Record> + '_ { self.records.iter() }

    /// Number of retained records.
    #[must_use]
    pub fn len(&self) -> usize { self.records.len() }

    /// Whether no records are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Records evicted by the cap since creation.
    #[must_use]
    pub const fn evicted(&self) -> u64 { self.evicted }

    /// Retention cap, if any.
    #[must_use]
    pub const fn limit(&self) -> Option<NonZeroUsize> { self.limit }

    /// Take the retained records, oldest first.
    #[must_use]
    pub fn into_vec(self) -> Vec<Record> { self.records.into() }
}
