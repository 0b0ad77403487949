//! Asynchronous consumption of a record stream.
//!
//! [`StreamConsumer::run`] pulls fragments from any `futures::Stream`,
//! feeds them to a [`FrameReassembler`](crate::frame::FrameReassembler), and
//! hands each decoded record to a [`ProgressSink`](crate::progress::ProgressSink).
//! [`transport::fragments`] adapts a `tokio::io::AsyncRead` source.

pub mod consumer;
pub mod transport;

pub use consumer::{ConsumerConfig, StreamConsumer, StreamOutcome, StreamSummary};
pub use transport::{DEFAULT_READ_CAPACITY, fragments, fragments_with_capacity};
