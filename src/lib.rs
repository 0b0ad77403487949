#![doc(html_root_url = "https://docs.rs/recordframe/latest")]
//! Public API for the `recordframe` library.
//!
//! This crate consumes a chunked stream of JSON progress records, recovers
//! whole records across arbitrary fragment boundaries, and maintains running
//! progress counters over them.
//!
//! ```
//! use recordframe::{FrameReassembler, ProgressAggregator, Record};
//!
//! let mut reassembler: FrameReassembler<Record> = FrameReassembler::default();
//! let mut progress = ProgressAggregator::default();
//!
//! let mut records = reassembler.feed(b"{\"id\":1,\"outcomeCode\":200,\"totalRecords\":2}\n{\"id\":2,");
//! records.extend(reassembler.feed(b"\"outcomeCode\":404}\n"));
//! records.extend(reassembler.finish().into_result().expect("no residue"));
//!
//! let snapshot = records.into_iter().map(|r| progress.observe(r)).last().expect("two records");
//! assert_eq!(snapshot.success_count(), 1);
//! assert_eq!(snapshot.failure_count(), 1);
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod frame;
pub mod metrics;
pub mod progress;
pub mod record;
pub mod stream;

pub use config::IngestConfig;
pub use error::{Result, StreamError, TransportError};
pub use frame::{
    Flush,
    FrameDecodeError,
    FrameReassembler,
    ReassemblerConfig,
    TruncationError,
};
pub use metrics::{DECODE_FAILURES, RECORDS_DECODED, STREAM_ERRORS};
pub use progress::{
    ProgressAggregator,
    ProgressConfig,
    ProgressSink,
    ProgressSnapshot,
    ProgressWatch,
    SharedProgress,
};
pub use record::{Record, RecordId};
pub use stream::{ConsumerConfig, StreamConsumer, StreamOutcome, StreamSummary};
