//! Streaming response body that can be closed from another task.
//!
//! Closing is the only way to stop a subscription. A pending read observes
//! the close as end-of-stream, and the underlying connection is released
//! the moment the reader notices it.

use std::fmt;
use std::io;

use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};

use crate::cancel::Latch;

/// Chunks of a response body as they arrive from the network.
pub type ChunkStream = BoxStream<'static, io::Result<Bytes>>;

/// Handle that closes a [`ClosableBody`] from anywhere.
///
/// Closing is idempotent: only the first call has an effect.
#[derive(Debug, Clone)]
pub struct BodyCloser {
    latch: Latch,
}

impl BodyCloser {
    /// Closes the body. Returns `true` if this call closed it.
    pub fn close(&self) -> bool {
        self.latch.raise()
    }

    /// Returns `true` once the body has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.latch.is_raised()
    }

    /// Resolves once the body has been closed.
    pub(crate) async fn closed(&self) {
        self.latch.raised().await;
    }
}

/// Response body read chunk by chunk, with an out-of-band close.
pub struct ClosableBody {
    stream: Option<ChunkStream>,
    closer: BodyCloser,
}

impl ClosableBody {
    /// Wraps an arbitrary chunk stream.
    #[must_use]
    pub fn new(stream: ChunkStream) -> Self {
        Self {
            stream: Some(stream),
            closer: BodyCloser {
                latch: Latch::new(),
            },
        }
    }

    /// Wraps the body of an HTTP response.
    #[must_use]
    pub fn from_response(response: reqwest::Response) -> Self {
        Self::new(response.bytes_stream().map_err(io::Error::other).boxed())
    }

    /// Returns a handle that can close this body from another task.
    #[must_use]
    pub fn closer(&self) -> BodyCloser {
        self.closer.clone()
    }

    /// Returns `true` once [`BodyCloser::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closer.is_closed()
    }

    /// Waits for the next chunk.
    ///
    /// Returns `Ok(None)` at end of stream, and also as soon as the body is
    /// closed, even while a read is pending.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the connection breaks mid-read.
    pub async fn next_chunk(&mut self) -> io::Result<Option<Bytes>> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(None);
        };

        let next = tokio::select! {
            biased;
            () = self.closer.closed() => None,
            item = stream.next() => item,
        };

        match next {
            Some(Ok(chunk)) => Ok(Some(chunk)),
            Some(Err(e)) => {
                self.release();
                Err(e)
            }
            None => {
                self.release();
                Ok(None)
            }
        }
    }

    fn release(&mut self) {
        if self.stream.take().is_some() {
            tracing::trace!(closed = self.is_closed(), "response body released");
        }
    }
}

impl fmt::Debug for ClosableBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosableBody")
            .field("open", &self.stream.is_some())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures_util::stream;

    use super::*;

    fn chunks(parts: &[&'static str]) -> Vec<io::Result<Bytes>> {
        parts.iter().map(|p| Ok(Bytes::from_static(p.as_bytes()))).collect()
    }

    #[tokio::test]
    async fn yields_chunks_then_end() {
        let mut body = ClosableBody::new(stream::iter(chunks(&["a", "b"])).boxed());
        assert_eq!(body.next_chunk().await.expect("a"), Some(Bytes::from("a")));
        assert_eq!(body.next_chunk().await.expect("b"), Some(Bytes::from("b")));
        assert_eq!(body.next_chunk().await.expect("end"), None);
        assert_eq!(body.next_chunk().await.expect("still end"), None);
    }

    #[tokio::test]
    async fn close_unblocks_pending_read() {
        let mut body = ClosableBody::new(stream::pending().boxed());
        let closer = body.closer();
        let reader = tokio::spawn(async move { body.next_chunk().await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(closer.close());

        let read = tokio::time::timeout(Duration::from_secs(1), reader)
            .await
            .expect("read unblocked")
            .expect("task");
        assert_eq!(read.expect("clean end"), None);
    }

    #[tokio::test]
    async fn closed_body_hides_buffered_chunks() {
        let mut body = ClosableBody::new(stream::iter(chunks(&["x"])).boxed());
        let _ = body.closer().close();
        assert_eq!(body.next_chunk().await.expect("end"), None);
    }

    #[tokio::test]
    async fn closing_twice_is_harmless() {
        let body = ClosableBody::new(stream::pending().boxed());
        let closer = body.closer();
        assert!(closer.close());
        assert!(!closer.close());
        assert!(body.is_closed());
    }

    #[tokio::test]
    async fn transport_error_is_returned_once() {
        let items = vec![Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))];
        let mut body = ClosableBody::new(stream::iter(items).boxed());
        assert!(body.next_chunk().await.is_err());
        assert_eq!(body.next_chunk().await.expect("released"), None);
    }
}
