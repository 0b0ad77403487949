//! Canonical error types for stream consumption.
//!
//! Mid-stream decode failures are recoverable and live in
//! [`crate::frame::FrameDecodeError`]. The types here describe conditions that
//! end a stream: the transport failing, or the stream closing mid-record.

use std::{error::Error as StdError, io, time::Duration};

use thiserror::Error;

use crate::frame::TruncationError;

/// Failure reported by the transport delivering fragments.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying connection or reader failed.
    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),

    /// The remote service answered with a non-success status before any data.
    #[error("remote service returned status {code}")]
    Status {
        /// Status code returned by the service.
        code: u16,
    },

    /// No fragment arrived within the configured idle timeout.
    #[error("no data received for {after:?}")]
    TimedOut {
        /// Idle period that elapsed.
        after: Duration,
    },

    /// Any other transport-specific failure.
    #[error("transport error: {0}")]
    Other(#[source] Box<dyn StdError + Send + Sync>),
}

impl TransportError {
    /// Wrap an arbitrary transport failure.
    pub fn other(error: impl Into<Box<dyn StdError + Send + Sync>>) -> Self { Self::Other(error.into()) }

    /// Stable label for metrics and structured logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Status { .. } => "status",
            Self::TimedOut { .. } => "timeout",
            Self::Other(_) => "other",
        }
    }
}

/// Terminal failure of a consumed stream.
///
/// Whatever was aggregated before the failure stands; callers decide whether
/// to present partial results.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The transport failed or timed out.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The stream ended while a record was still incomplete.
    #[error(transparent)]
    Truncated(#[from] TruncationError),
}

impl StreamError {
    /// Stable label for metrics and structured logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Truncated(_) => "truncated",
        }
    }
}

/// Canonical result alias for stream consumption.
pub type Result<T, E = StreamError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use std::{io, time::Duration};

    use rstest::rstest;

    use super::{StreamError, TransportError};
    use crate::frame::TruncationError;

    #[rstest]
    #[case(TransportError::from(io::Error::from(io::ErrorKind::ConnectionReset)), "io")]
    #[case(TransportError::Status { code: 503 }, "status")]
    #[case(TransportError::TimedOut { after: Duration::from_secs(1) }, "timeout")]
    #[case(TransportError::other("tls handshake failed"), "other")]
    fn transport_kinds_are_stable(#[case] err: TransportError, #[case] kind: &str) {
        assert_eq!(err.kind(), kind);
        assert_eq!(StreamError::from(err).kind(), "transport");
    }

    #[test]
    fn truncation_is_distinct_from_transport() {
        let err = StreamError::from(TruncationError::new("{\"id\"", "EOF while parsing"));
        assert!(matches!(err, StreamError::Truncated(_)));
        assert!(err.to_string().starts_with("stream ended with 5 undecoded bytes"));
    }

    #[test]
    fn status_message_names_code() {
        assert_eq!(
            TransportError::Status { code: 502 }.to_string(),
            "remote service returned status 502"
        );
    }
}
