//! Error types emitted while reassembling records from a byte stream.
//!
//! Two categories are reported separately:
//!
//! - [`FrameDecodeError`]: a single piece of a candidate could not be decoded. The reassembler
//!   records it, skips the piece, and keeps going.
//! - [`TruncationError`]: the stream ended while residual text was still buffered. Only
//!   [`FrameReassembler::finish`](crate::frame::FrameReassembler::finish) produces it.

use thiserror::Error;

/// Longest excerpt of an offending payload kept inside an error.
pub const EXCERPT_LIMIT: usize = 128;

/// A recoverable failure affecting one piece of the stream.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FrameDecodeError {
    /// The piece was not a valid record payload even after concatenation repair.
    #[error("malformed record payload ({reason}): {excerpt}")]
    Malformed {
        /// Leading part of the rejected piece.
        excerpt: String,
        /// Decoder message describing the failure.
        reason: String,
    },

    /// The pending candidate grew past the configured cap without a boundary.
    #[error("pending candidate discarded after {discarded} bytes (limit {limit})")]
    Oversized {
        /// Bytes dropped from the pending buffer.
        discarded: usize,
        /// Configured maximum pending size.
        limit: usize,
    },
}

impl FrameDecodeError {
    pub(crate) fn malformed(piece: &str, reason: impl ToString) -> Self {
        Self::Malformed {
            excerpt: excerpt(piece),
            reason: reason.to_string(),
        }
    }

    /// Stable label for metrics and structured logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "malformed",
            Self::Oversized { .. } => "oversized",
        }
    }
}

/// Residual buffered content that never resolved into a complete record.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("stream ended with {residual_bytes} undecoded bytes ({reason}): {excerpt}")]
pub struct TruncationError {
    residual_bytes: usize,
    excerpt: String,
    reason: String,
}

impl TruncationError {
    pub(crate) fn new(residue: &str, reason: impl ToString) -> Self {
        Self {
            residual_bytes: residue.len(),
            excerpt: excerpt(residue),
            reason: reason.to_string(),
        }
    }

    /// Size of the residue left in the buffer when the stream ended.
    #[must_use]
    pub const fn residual_bytes(&self) -> usize { self.residual_bytes }

    /// Leading part of the residue.
    #[must_use]
    pub fn excerpt(&self) -> &str { &self.excerpt }

    /// Decoder message explaining why the residue was rejected.
    #[must_use]
    pub fn reason(&self) -> &str { &self.reason }
}

fn excerpt(text: &str) -> String {
    if text.len() <= EXCERPT_LIMIT {
        return text.to_owned();
    }
    let mut end = EXCERPT_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("{\"id\":1", "{\"id\":1")]
    #[case("", "")]
    fn short_payloads_are_kept_whole(#[case] input: &str, #[case] expected: &str) {
        let err = FrameDecodeError::malformed(input, "eof");
        assert_eq!(
            err,
            FrameDecodeError::Malformed {
                excerpt: expected.to_owned(),
                reason: "eof".to_owned(),
            }
        );
    }

    #[test]
    fn long_payloads_are_cut_on_a_char_boundary() {
        let input = format!("{}é{}", "a".repeat(EXCERPT_LIMIT - 1), "b".repeat(64));
        let err = TruncationError::new(&input, "eof");
        assert!(err.excerpt().ends_with("..."));
        assert!(err.excerpt().len() <= EXCERPT_LIMIT + 3);
        assert_eq!(err.residual_bytes(), input.len());
    }

    #[test]
    fn kinds_are_stable() {
        assert_eq!(FrameDecodeError::malformed("x", "y").kind(), "malformed");
        let oversized = FrameDecodeError::Oversized {
            discarded: 10,
            limit: 4,
        };
        assert_eq!(oversized.kind(), "oversized");
        assert_eq!(
            oversized.to_string(),
            "pending candidate discarded after 10 bytes (limit 4)"
        );
    }
}
