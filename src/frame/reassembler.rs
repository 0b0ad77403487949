//! Inbound helper that turns an arbitrary byte stream into typed records.
//!
//! [`FrameReassembler`] accepts fragments whose boundaries carry no meaning.
//! It decodes them as streaming UTF-8, splits complete candidates on
//! newlines, and repairs candidates holding several concatenated objects
//! before decoding each piece with `serde_json`. Objects written back to back
//! with no newline at all are released as soon as the next one starts, so
//! only the final, possibly incomplete, piece is ever buffered. A malformed
//! piece is reported and skipped; it never poisons the pieces around it or
//! the buffered residue.

use std::{collections::VecDeque, marker::PhantomData};

use serde::de::DeserializeOwned;

use super::{
    ConcatenationSplitter,
    FrameDecodeError,
    ReassemblerConfig,
    TruncationError,
    utf8::Utf8Decoder,
};
use crate::record::Record;

const BOUNDARY: char = '\n';

/// Records recovered when the stream ends, plus any truncation detected.
#[derive(Debug)]
pub struct Flush<T> {
    records: Vec<T>,
    truncation: Option<TruncationError>,
}

impl<T> Flush<T> {
    fn empty() -> Self {
        Self {
            records: Vec::new(),
            truncation: None,
        }
    }

    /// Complete records found in the residue.
    #[must_use]
    pub fn records(&self) -> &[T] { &self.records }

    /// Truncation reported for the final residue, if any.
    #[must_use]
    pub fn truncation(&self) -> Option<&TruncationError> { self.truncation.as_ref() }

    /// Split into the recovered records and the optional truncation.
    #[must_use]
    pub fn into_parts(self) -> (Vec<T>, Option<TruncationError>) { (self.records, self.truncation) }

    /// Collapse into a [`Result`], discarding recovered records on truncation.
    ///
    /// # Errors
    ///
    /// Returns the [`TruncationError`] when the residue ended mid-record.
    pub fn into_result(self) -> Result<Vec<T>, TruncationError> {
        match self.truncation {
            Some(err) => Err(err),
            None => Ok(self.records),
        }
    }
}

/// Stateful newline-delimited record reassembler.
///
/// # Examples
///
/// ```
/// use recordframe::{FrameReassembler, Record};
///
/// let mut reassembler: FrameReassembler<Record> = FrameReassembler::default();
/// assert!(reassembler.feed(br#"{"id":1,"outcomeCode":2"#).is_empty());
/// let records = reassembler.feed(b"00}{\"id\":2,\"outcomeCode\":500}\n");
/// assert_eq!(records.len(), 2);
/// assert!(reassembler.finish().into_result().expect("clean end").is_empty());
/// ```
#[derive(Debug)]
pub struct FrameReassembler<T = Record> {
    config: ReassemblerConfig,
    decoder: Utf8Decoder,
    pending: String,
    discarding: bool,
    discard_closed: bool,
    diagnostics: VecDeque<FrameDecodeError>,
    diagnostics_dropped: u64,
    decode_failures: u64,
    records_decoded: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> FrameReassembler<T> {
    /// Create a reassembler with the given limits.
    #[must_use]
    pub fn new(config: ReassemblerConfig) -> Self {
        Self {
            config,
            decoder: Utf8Decoder::default(),
            pending: String::new(),
            discarding: false,
            discard_closed: false,
            diagnostics: VecDeque::new(),
            diagnostics_dropped: 0,
            decode_failures: 0,
            records_decoded: 0,
            _marker: PhantomData,
        }
    }

    /// Consume one fragment and return the records it completed.
    ///
    /// The final piece after the last newline is always held back, even when
    /// it already looks complete, because the next fragment may extend it.
    /// Earlier pieces on that line are released once the following object
    /// begins.
    pub fn feed(&mut self, fragment: impl AsRef<[u8]>) -> Vec<T> {
        let bytes = fragment.as_ref();
        let mut records = Vec::new();
        if bytes.is_empty() {
            return records;
        }

        let mut text = String::with_capacity(bytes.len());
        self.decoder.decode_into(bytes, &mut text);
        let mut text = text.as_str();

        if self.discarding {
            let Some(idx) = self.resync_offset(text) else {
                if !text.trim().is_empty() {
                    self.discard_closed = text.trim_end().ends_with('}');
                }
                return records;
            };
            self.discarding = false;
            text = &text[idx..];
        }

        if let Some(idx) = text.rfind(BOUNDARY) {
            let boundary = self.pending.len() + idx;
            self.pending.push_str(text);
            let tail = self.pending.split_off(boundary + BOUNDARY.len_utf8());
            let complete = std::mem::replace(&mut self.pending, tail);
            for candidate in complete.split(BOUNDARY) {
                self.decode_candidate(candidate, &mut records);
            }
        } else {
            self.pending.push_str(text);
        }

        self.release_concatenated(&mut records);
        self.enforce_pending_limit();

        if !records.is_empty() {
            self.records_decoded += records.len() as u64;
            crate::metrics::inc_records_decoded(records.len());
            tracing::trace!(
                fragment.bytes = bytes.len(),
                records = records.len(),
                pending.bytes = self.pending_len(),
                "fragment completed records"
            );
        }
        records
    }

    /// Decode whatever remains once the transport signals end-of-stream.
    ///
    /// Complete pieces in the residue are returned. If the final piece does
    /// not decode, it is reported as a [`TruncationError`]; the stream ended
    /// before that record was fully delivered. The reassembler is empty
    /// afterwards and may be reused.
    pub fn finish(&mut self) -> Flush<T> {
        let mut residue = std::mem::take(&mut self.pending);
        self.decoder.flush_into(&mut residue);
        self.discarding = false;
        self.discard_closed = false;

        let trimmed = residue.trim();
        if trimmed.is_empty() {
            return Flush::empty();
        }

        let pieces: Vec<&str> = ConcatenationSplitter::new(trimmed).collect();
        let last = pieces.len().saturating_sub(1);
        let mut flush = Flush::empty();
        for (position, piece) in pieces.into_iter().enumerate() {
            match serde_json::from_str::<T>(piece) {
                Ok(record) => flush.records.push(record),
                Err(err) if position == last => {
                    let truncation = TruncationError::new(piece, err);
                    tracing::warn!(
                        residual.bytes = truncation.residual_bytes(),
                        error = %truncation,
                        "stream ended mid-record"
                    );
                    flush.truncation = Some(truncation);
                }
                Err(err) => self.report(FrameDecodeError::malformed(piece, err)),
            }
        }

        if !flush.records.is_empty() {
            self.records_decoded += flush.records.len() as u64;
            crate::metrics::inc_records_decoded(flush.records.len());
        }
        flush
    }

    /// Drain the decode failures recorded since the last call.
    pub fn take_diagnostics(&mut self) -> Vec<FrameDecodeError> { self.diagnostics.drain(..).collect() }

    /// Drop all buffered state without decoding it.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.decoder.clear();
        self.discarding = false;
        self.discard_closed = false;
    }

    /// Bytes currently buffered awaiting a boundary.
    #[must_use]
    pub fn pending_len(&self) -> usize { self.pending.len() + self.decoder.pending() }

    /// Total pieces rejected since construction.
    #[must_use]
    pub const fn decode_failures(&self) -> u64 { self.decode_failures }

    /// Total records emitted since construction.
    #[must_use]
    pub const fn records_decoded(&self) -> u64 { self.records_decoded }

    /// Diagnostics evicted because the retention queue was full.
    #[must_use]
    pub const fn diagnostics_dropped(&self) -> u64 { self.diagnostics_dropped }

    /// Limits in force.
    #[must_use]
    pub const fn config(&self) -> &ReassemblerConfig { &self.config }

    fn decode_candidate(&mut self, candidate: &str, records: &mut Vec<T>) {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return;
        }

        let mut splitter = ConcatenationSplitter::new(candidate);
        for piece in splitter.by_ref() {
            match serde_json::from_str::<T>(piece) {
                Ok(record) => records.push(record),
                Err(err) => self.report(FrameDecodeError::malformed(piece, err)),
            }
        }
        if splitter.repairs() > 0 {
            tracing::debug!(
                repairs = splitter.repairs(),
                "separated concatenated record payloads"
            );
        }
    }

    /// Decode every piece of the pending line that a following object has
    /// already closed off, leaving only the final piece buffered.
    fn release_concatenated(&mut self, records: &mut Vec<T>) {
        let mut splitter = ConcatenationSplitter::new(&self.pending);
        let mut cut = 0;
        while splitter.next().is_some() && splitter.consumed() < self.pending.len() {
            cut = splitter.consumed();
        }
        if cut == 0 {
            return;
        }

        let tail = self.pending.split_off(cut);
        let complete = std::mem::replace(&mut self.pending, tail);
        self.decode_candidate(&complete, records);
    }

    /// Offset in `text` where decoding resumes after an oversized piece: just
    /// past the next newline, or at the next object that directly follows a
    /// closing brace.
    fn resync_offset(&self, text: &str) -> Option<usize> {
        if self.discard_closed && text.trim_start().starts_with('{') {
            return Some(text.len() - text.trim_start().len());
        }
        let newline = text.find(BOUNDARY).map(|idx| idx + BOUNDARY.len_utf8());
        let next_object = text.find("}{").map(|idx| idx + 1);
        match (newline, next_object) {
            (Some(newline), Some(next_object)) => Some(newline.min(next_object)),
            (newline, next_object) => newline.or(next_object),
        }
    }

    fn enforce_pending_limit(&mut self) {
        let limit = self.config.max_pending_bytes().get();
        if self.pending.len() <= limit {
            return;
        }
        let discarded = self.pending.len();
        self.pending.clear();
        self.discarding = true;
        self.discard_closed = false;
        self.report(FrameDecodeError::Oversized { discarded, limit });
    }

    fn report(&mut self, err: FrameDecodeError) {
        self.decode_failures += 1;
        crate::metrics::inc_decode_failures(err.kind());
        tracing::warn!(error.kind = err.kind(), error = %err, "skipping undecodable record payload");

        let capacity = self.config.max_diagnostics();
        if capacity == 0 {
            self.diagnostics_dropped += 1;
            return;
        }
        if self.diagnostics.len() == capacity {
            self.diagnostics.pop_front();
            self.diagnostics_dropped += 1;
        }
        self.diagnostics.push_back(err);
    }
}

impl<T: DeserializeOwned> Default for FrameReassembler<T> {
    fn default() -> Self { Self::new(ReassemblerConfig::default()) }
}
