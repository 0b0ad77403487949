//! Utilities for exercising [`recordframe`] with synthetic record streams.
//!
//! These helpers build wire bytes from [`Record`](recordframe::Record)
//! values, cut them into fragments at chosen offsets, and wrap the fragments
//! in transports that end cleanly or fail.
//!
//! ```rust
//! use recordframe::Record;
//! use recordframe_testing::{newline_delimited, split_at};
//!
//! let wire = newline_delimited(&[Record::new(1, 200), Record::new(2, 500)]);
//! let fragments = split_at(&wire, &[3, 20]);
//! assert_eq!(fragments.concat(), wire);
//! ```

pub mod fragments;
pub mod logging;

pub use fragments::{
    chunks_of,
    concatenated,
    failing_stream,
    fragment_stream,
    newline_delimited,
    split_at,
};
pub use logging::{LoggerHandle, logger};
