//! Reassembly of newline-delimited records from an unframed byte stream.
//!
//! The transport hands over fragments whose boundaries mean nothing: a single
//! fragment may hold part of a record, several records, or a record whose
//! separator went missing upstream. The types here hide those hazards from
//! downstream consumers. Each sub-module covers one concern:
//!
//! - `utf8`: streaming text decoding across fragment boundaries.
//! - [`splitter`]: the concatenation repair state machine.
//! - [`reassembler`]: buffering, boundary detection, and decoding.

pub mod config;
pub mod error;
pub mod reassembler;
pub mod splitter;
mod utf8;

pub use config::{DEFAULT_MAX_DIAGNOSTICS, DEFAULT_MAX_PENDING_BYTES, ReassemblerConfig};
pub use error::{FrameDecodeError, TruncationError};
pub use reassembler::{Flush, FrameReassembler};
pub use splitter::{ConcatenationSplitter, SplitState};
