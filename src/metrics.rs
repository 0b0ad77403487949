//! Metric helpers for `recordframe`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to nothing.

/// Name of the counter tracking decoded records.
pub const RECORDS_DECODED: &str = "recordframe_records_decoded_total";
/// Name of the counter tracking rejected record payloads.
pub const DECODE_FAILURES: &str = "recordframe_decode_failures_total";
/// Name of the counter tracking terminal stream errors.
pub const STREAM_ERRORS: &str = "recordframe_stream_errors_total";

/// Record `count` successfully decoded records.
pub fn inc_records_decoded(count: usize) {
    #[cfg(feature = "metrics")]
    metrics::counter!(RECORDS_DECODED).increment(count as u64);
    #[cfg(not(feature = "metrics"))]
    let _ = count;
}

/// Record a rejected payload of the given kind.
pub fn inc_decode_failures(kind: &'static str) {
    #[cfg(feature = "metrics")]
    metrics::counter!(DECODE_FAILURES, "kind" => kind).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}

/// Record a stream ending in error.
pub fn inc_stream_errors(kind: &'static str) {
    #[cfg(feature = "metrics")]
    metrics::counter!(STREAM_ERRORS, "kind" => kind).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}
