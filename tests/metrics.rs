#![cfg(feature = "metrics")]
//! Tests for `recordframe` metrics.
//!
//! Counters are observed through `metrics_util::debugging::DebuggingRecorder`
//! installed as a thread-local recorder.

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use recordframe::{FrameReassembler, Record};

fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

fn counter(snapshotter: &Snapshotter, name: &str, label: Option<(&str, &str)>) -> u64 {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(k, _, _, _)| {
            k.key().name() == name
                && label.is_none_or(|(key, value)| {
                    k.key().labels().any(|l| l.key() == key && l.value() == value)
                })
        })
        .map(|(_, _, _, v)| match v {
            DebugValue::Counter(c) => c,
            _ => 0,
        })
        .sum()
}

#[test]
fn decoded_records_are_counted() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        let mut reassembler: FrameReassembler<Record> = FrameReassembler::default();
        let records = reassembler.feed(b"{\"id\":1,\"outcomeCode\":200}\n{\"id\":2,\"outcomeCode\":200}\n");
        assert_eq!(records.len(), 2);
    });

    assert_eq!(counter(&snapshotter, recordframe::RECORDS_DECODED, None), 2);
}

#[test]
fn decode_failures_carry_their_kind() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        let mut reassembler: FrameReassembler<Record> = FrameReassembler::default();
        let _ = reassembler.feed(b"not json\n");
    });

    assert_eq!(
        counter(&snapshotter, recordframe::DECODE_FAILURES, Some(("kind", "malformed"))),
        1
    );
}

#[test]
fn stream_errors_carry_their_kind() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        recordframe::metrics::inc_stream_errors("truncated");
    });

    assert_eq!(
        counter(&snapshotter, recordframe::STREAM_ERRORS, Some(("kind", "truncated"))),
        1
    );
}
