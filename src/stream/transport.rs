//! Adapters turning byte sources into fragment streams.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::error::TransportError;

/// Default read size used by [`fragments`].
pub const DEFAULT_READ_CAPACITY: usize = 8 * 1024;

/// Stream the contents of `reader` as fragments.
///
/// Fragment boundaries follow whatever the reader yields and carry no
/// meaning. Read failures surface as [`TransportError::Io`].
pub fn fragments<R>(reader: R) -> impl Stream<Item = Result<Bytes, TransportError>>
where
    R: AsyncRead,
{
    fragments_with_capacity(reader, DEFAULT_READ_CAPACITY)
}

/// Like [`fragments`], reading at most `capacity` bytes per fragment.
pub fn fragments_with_capacity<R>(
    reader: R,
    capacity: usize,
) -> impl Stream<Item = Result<Bytes, TransportError>>
where
    R: AsyncRead,
{
    ReaderStream::with_capacity(reader, capacity).map(|chunk| chunk.map_err(TransportError::from))
}
