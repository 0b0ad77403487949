//! Builders for wire bytes and the fragment streams that carry them.

use std::io;

use bytes::Bytes;
use futures::{Stream, stream};
use recordframe::{Record, TransportError};

/// Encode `records` as newline-delimited JSON.
#[must_use]
pub fn newline_delimited(records: &[Record]) -> Vec<u8> {
    recordframe::export::to_json_lines(records).expect("records serialize")
}

/// Encode `records` back to back with no separator, followed by one newline.
///
/// This is the shape produced when the service flushes several records into
/// a single chunk without delimiting them.
#[must_use]
pub fn concatenated(records: &[Record]) -> Vec<u8> {
    let mut wire = Vec::new();
    for record in records {
        serde_json::to_writer(&mut wire, record).expect("record serializes");
    }
    wire.push(b'\n');
    wire
}

/// Split `wire` at each offset in `cuts`.
///
/// Offsets are clamped to the input and need not be sorted; duplicates yield
/// empty fragments.
#[must_use]
pub fn split_at(wire: &[u8], cuts: &[usize]) -> Vec<Vec<u8>> {
    let mut cuts: Vec<usize> = cuts.iter().map(|&cut| cut.min(wire.len())).collect();
    cuts.sort_unstable();

    let mut fragments = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for cut in cuts {
        fragments.push(wire[start..cut].to_vec());
        start = cut;
    }
    fragments.push(wire[start..].to_vec());
    fragments
}

/// Split `wire` into fragments of at most `size` bytes.
///
/// # Panics
///
/// Panics if `size` is zero.
#[must_use]
pub fn chunks_of(wire: &[u8], size: usize) -> Vec<Vec<u8>> {
    wire.chunks(size).map(<[u8]>::to_vec).collect()
}

/// A transport that yields `fragments` and then ends.
pub fn fragment_stream(
    fragments: Vec<Vec<u8>>,
) -> impl Stream<Item = Result<Bytes, TransportError>> + Unpin {
    stream::iter(fragments.into_iter().map(|fragment| Ok(Bytes::from(fragment))))
}

/// A transport that yields `fragments` and then fails with `kind`.
pub fn failing_stream(
    fragments: Vec<Vec<u8>>,
    kind: io::ErrorKind,
) -> impl Stream<Item = Result<Bytes, TransportError>> + Unpin {
    let failure = Err(TransportError::Io(io::Error::from(kind)));
    stream::iter(
        fragments
            .into_iter()
            .map(|fragment| Ok(Bytes::from(fragment)))
            .chain(std::iter::once(failure)),
    )
}

#[cfg(test)]
mod tests {
    use super::{chunks_of, split_at};

    #[test]
    fn split_at_sorts_and_clamps_cuts() {
        let parts = split_at(b"abcdef", &[4, 1, 99]);
        assert_eq!(parts, vec![b"a".to_vec(), b"bcd".to_vec(), b"ef".to_vec(), Vec::new()]);
    }

    #[test]
    fn chunks_cover_the_input() {
        let parts = chunks_of(b"abcdefg", 3);
        assert_eq!(parts.concat(), b"abcdefg");
        assert_eq!(parts.len(), 3);
    }
}
