//! The loop binding a transport to the reassembler and a progress sink.

use std::{pin::pin, time::Duration};

use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::{
    error::{Result, StreamError, TransportError},
    frame::{FrameDecodeError, FrameReassembler, ReassemblerConfig},
    progress::{ProgressSink, ProgressSnapshot},
    record::Record,
};

/// Settings for a [`StreamConsumer`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConsumerConfig {
    reassembler: ReassemblerConfig,
    idle_timeout: Option<Duration>,
}

impl ConsumerConfig {
    /// Default reassembly limits and no idle timeout.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reassembler: ReassemblerConfig::new(),
            idle_timeout: None,
        }
    }

    /// Limits passed to the underlying [`FrameReassembler`].
    #[must_use]
    pub const fn with_reassembler(mut self, reassembler: ReassemblerConfig) -> Self {
        self.reassembler = reassembler;
        self
    }

    /// Fail with [`TransportError::TimedOut`] when no fragment arrives in time.
    #[must_use]
    pub const fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Configured reassembly limits.
    #[must_use]
    pub const fn reassembler(&self) -> &ReassemblerConfig { &self.reassembler }

    /// Configured idle timeout.
    #[must_use]
    pub const fn idle_timeout(&self) -> Option<Duration> { self.idle_timeout }
}

/// Counters describing one consumed stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamSummary {
    /// Fragments received from the transport.
    pub fragments: u64,
    /// Bytes received from the transport.
    pub bytes: u64,
    /// Records handed to the sink.
    pub records: u64,
    /// Payloads skipped as undecodable.
    pub decode_failures: u64,
    /// Progress after the last record, if any record arrived.
    pub last_snapshot: Option<ProgressSnapshot>,
}

/// How a stream that did not fail came to an end.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamOutcome {
    /// The transport signalled end-of-stream and the residue decoded cleanly.
    Completed(StreamSummary),
    /// The cancellation token fired; buffered residue was discarded unread.
    Cancelled(StreamSummary),
}

impl StreamOutcome {
    /// Counters for the stream regardless of how it ended.
    #[must_use]
    pub fn summary(&self) -> &StreamSummary {
        match self {
            Self::Completed(summary) | Self::Cancelled(summary) => summary,
        }
    }

    /// Whether the stream was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool { matches!(self, Self::Cancelled(_)) }
}

/// Drives fragments through a [`FrameReassembler`] into a [`ProgressSink`].
///
/// Fragments are applied strictly in arrival order. Decoding and aggregation
/// happen inline; the only suspension point is waiting for the next fragment.
#[derive(Debug)]
pub struct StreamConsumer<S> {
    reassembler: FrameReassembler<Record>,
    sink: S,
    idle_timeout: Option<Duration>,
}

impl<S: ProgressSink> StreamConsumer<S> {
    /// Create a consumer feeding `sink`.
    #[must_use]
    pub fn new(sink: S, config: ConsumerConfig) -> Self {
        Self {
            reassembler: FrameReassembler::new(config.reassembler),
            sink,
            idle_timeout: config.idle_timeout,
        }
    }

    /// Consume `fragments` until end-of-stream, failure, or cancellation.
    ///
    /// On cancellation the transport is dropped without being polled again and
    /// any buffered residue is discarded; this is a clean outcome, not a
    /// truncation. A transport failure also discards the residue, so the
    /// consumer can be run again on a fresh stream. Records observed before a
    /// failure remain in the sink.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Transport`] if the transport fails or stays idle
    /// past the configured timeout, and [`StreamError::Truncated`] if it ends
    /// while a record is incomplete.
    pub async fn run<F, B, E>(
        &mut self,
        fragments: F,
        cancel: &CancellationToken,
    ) -> Result<StreamOutcome>
    where
        F: Stream<Item = std::result::Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<TransportError>,
    {
        let mut fragments = pin!(fragments);
        let failures_before = self.reassembler.decode_failures();
        let mut summary = StreamSummary::default();

        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                next = next_fragment(&mut fragments, self.idle_timeout) => Some(next),
            };

            let Some(next) = next else {
                self.reassembler.reset();
                summary.decode_failures = self.reassembler.decode_failures() - failures_before;
                tracing::info!(
                    fragments = summary.fragments,
                    records = summary.records,
                    "record stream cancelled"
                );
                return Ok(StreamOutcome::Cancelled(summary));
            };

            match next {
                Ok(Some(fragment)) => {
                    let fragment = fragment.as_ref();
                    summary.fragments += 1;
                    summary.bytes += fragment.len() as u64;
                    let records = self.reassembler.feed(fragment);
                    self.deliver(records, &mut summary);
                }
                Ok(None) => break,
                Err(err) => {
                    self.reassembler.reset();
                    summary.decode_failures = self.reassembler.decode_failures() - failures_before;
                    return Err(Self::fail(StreamError::Transport(err), &summary));
                }
            }
        }

        let (records, truncation) = self.reassembler.finish().into_parts();
        self.deliver(records, &mut summary);
        summary.decode_failures = self.reassembler.decode_failures() - failures_before;
        if let Some(truncation) = truncation {
            return Err(Self::fail(StreamError::Truncated(truncation), &summary));
        }

        tracing::info!(
            fragments = summary.fragments,
            bytes = summary.bytes,
            records = summary.records,
            decode_failures = summary.decode_failures,
            "record stream complete"
        );
        Ok(StreamOutcome::Completed(summary))
    }

    /// Drain decode failures recorded by the reassembler.
    pub fn take_diagnostics(&mut self) -> Vec<FrameDecodeError> { self.reassembler.take_diagnostics() }

    /// Borrow the progress sink.
    #[must_use]
    pub fn sink(&self) -> &S { &self.sink }

    /// Consume the consumer, returning its sink.
    #[must_use]
    pub fn into_sink(self) -> S { self.sink }

    fn deliver(&mut self, records: Vec<Record>, summary: &mut StreamSummary) {
        for record in records {
            summary.records += 1;
            summary.last_snapshot = Some(self.sink.observe(record));
        }
    }

    fn fail(err: StreamError, summary: &StreamSummary) -> StreamError {
        crate::metrics::inc_stream_errors(err.kind());
        tracing::warn!(
            error.kind = err.kind(),
            error = %err,
            fragments = summary.fragments,
            records = summary.records,
            "record stream failed"
        );
        err
    }
}

async fn next_fragment<F, B, E>(
    fragments: &mut F,
    idle_timeout: Option<Duration>,
) -> std::result::Result<Option<B>, TransportError>
where
    F: Stream<Item = std::result::Result<B, E>> + Unpin,
    E: Into<TransportError>,
{
    let next = match idle_timeout {
        Some(after) => tokio::time::timeout(after, fragments.next())
            .await
            .map_err(|_| TransportError::TimedOut { after })?,
        None => fragments.next().await,
    };
    next.transpose().map_err(Into::into)
}
