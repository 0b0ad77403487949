//! Progress shared between the stream task and presentation readers.
//!
//! [`SharedProgress`] serialises every `observe` behind one mutex and publishes
//! the resulting snapshot through a `tokio::sync::watch` channel before the
//! lock is released. Readers therefore only ever see whole snapshots, in
//! the order they were produced.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::{History, ProgressAggregator, ProgressConfig, ProgressSink, ProgressSnapshot};
use crate::record::Record;

/// Cloneable handle to an aggregator observed from several tasks.
#[derive(Clone, Debug)]
pub struct SharedProgress {
    aggregator: Arc<Mutex<ProgressAggregator>>,
    publisher: Arc<watch::Sender<ProgressSnapshot>>,
}

impl SharedProgress {
    /// Create a shared aggregator with the given settings.
    #[must_use]
    pub fn new(config: ProgressConfig) -> Self {
        let aggregator = ProgressAggregator::new(config);
        let (publisher, _) = watch::channel(aggregator.snapshot());
        Self {
            aggregator: Arc::new(Mutex::new(aggregator)),
            publisher: Arc::new(publisher),
        }
    }

    /// Account for one record and publish the updated snapshot.
    pub fn observe(&self, record: Record) -> ProgressSnapshot {
        let mut aggregator = self.lock();
        let snapshot = aggregator.observe(record);
        self.publisher.send_replace(snapshot.clone());
        snapshot
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot { self.publisher.borrow().clone() }

    /// Subscribe to snapshot updates.
    #[must_use]
    pub fn subscribe(&self) -> ProgressWatch {
        ProgressWatch {
            receiver: self.publisher.subscribe(),
        }
    }

    /// Copy of the retained history, oldest first.
    #[must_use]
    pub fn history_snapshot(&self) -> Vec<Record> { self.with_history(|history| history.iter().cloned().collect()) }

    /// Run `f` against the retained history while holding the lock.
    pub fn with_history<R>(&self, f: impl FnOnce(&History) -> R) -> R { f(self.lock().history()) }

    fn lock(&self) -> MutexGuard<'_, ProgressAggregator> {
        self.aggregator.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SharedProgress {
    fn default() -> Self { Self::new(ProgressConfig::default()) }
}

impl ProgressSink for SharedProgress {
    fn observe(&mut self, record: Record) -> ProgressSnapshot { SharedProgress::observe(self, record) }
}

/// Read side of a [`SharedProgress`].
#[derive(Clone, Debug)]
pub struct ProgressWatch {
    receiver: watch::Receiver<ProgressSnapshot>,
}

impl ProgressWatch {
    /// Latest snapshot, marking it as seen.
    pub fn latest(&mut self) -> ProgressSnapshot { self.receiver.borrow_and_update().clone() }

    /// Wait for a snapshot newer than the last one seen.
    ///
    /// Returns `None` once every [`SharedProgress`] handle has been dropped.
    pub async fn changed(&mut self) -> Option<ProgressSnapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.latest())
    }
}
