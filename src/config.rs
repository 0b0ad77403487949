//! Pipeline configuration.
//!
//! [`IngestConfig`] gathers the settings of every stage so callers can
//! assemble a consumer and its shared progress in one step.

use std::{num::NonZeroUsize, time::Duration};

use crate::{
    frame::ReassemblerConfig,
    progress::{ProgressConfig, SharedProgress},
    stream::{ConsumerConfig, StreamConsumer},
};

/// Settings for the whole ingest pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestConfig {
    reassembler: ReassemblerConfig,
    progress: ProgressConfig,
    idle_timeout: Option<Duration>,
}

impl IngestConfig {
    /// Library defaults for every stage.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reassembler: ReassemblerConfig::new(),
            progress: ProgressConfig::new(),
            idle_timeout: None,
        }
    }

    /// Replace the reassembly limits.
    #[must_use]
    pub const fn with_reassembler(mut self, reassembler: ReassemblerConfig) -> Self {
        self.reassembler = reassembler;
        self
    }

    /// Replace the aggregation settings.
    #[must_use]
    pub const fn with_progress(mut self, progress: ProgressConfig) -> Self {
        self.progress = progress;
        self
    }

    /// Set the transport idle timeout.
    #[must_use]
    pub const fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Convenience for [`ProgressConfig::with_success_code`].
    #[must_use]
    pub const fn with_success_code(mut self, code: u16) -> Self {
        self.progress = self.progress.with_success_code(code);
        self
    }

    /// Convenience for [`ProgressConfig::with_history_limit`].
    #[must_use]
    pub const fn with_history_limit(mut self, limit: Option<NonZeroUsize>) -> Self {
        self.progress = self.progress.with_history_limit(limit);
        self
    }

    /// Convenience for [`ReassemblerConfig::with_max_pending_bytes`].
    #[must_use]
    pub const fn with_max_pending_bytes(mut self, limit: NonZeroUsize) -> Self {
        self.reassembler = self.reassembler.with_max_pending_bytes(limit);
        self
    }

    /// Reassembly limits.
    #[must_use]
    pub const fn reassembler(&self) -> &ReassemblerConfig { &self.reassembler }

    /// Aggregation settings.
    #[must_use]
    pub const fn progress(&self) -> &ProgressConfig { &self.progress }

    /// Transport idle timeout.
    #[must_use]
    pub const fn idle_timeout(&self) -> Option<Duration> { self.idle_timeout }

    /// Settings for the stream consumer stage.
    #[must_use]
    pub const fn consumer_config(&self) -> ConsumerConfig {
        ConsumerConfig::new()
            .with_reassembler(self.reassembler)
            .with_idle_timeout(self.idle_timeout)
    }

    /// Build a consumer publishing into a fresh [`SharedProgress`].
    ///
    /// The returned handle shares state with the consumer's sink.
    #[must_use]
    pub fn build(&self) -> (StreamConsumer<SharedProgress>, SharedProgress) {
        let progress = SharedProgress::new(self.progress);
        let consumer = StreamConsumer::new(progress.clone(), self.consumer_config());
        (consumer, progress)
    }
}
