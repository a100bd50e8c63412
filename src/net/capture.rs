//! Wire capture for request heads.
//!
//! hyper hands handlers a normalised `HeaderMap`: names lowercased and
//! repeated names grouped together. To log headers exactly as sent, each
//! connection's stream is wrapped in a [`RecordingStream`] that copies every
//! byte read into a [`WireLog`]. The handler then re-parses its own request
//! head from that log.

use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Same ceiling hyper applies by default.
const MAX_HEADERS: usize = 100;

/// A request head as it appeared on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHead {
    /// Request target, byte for byte.
    pub target: String,
    /// Header pairs in wire order, original case.
    pub headers: Vec<(String, String)>,
}

/// Bytes read from one connection that no handler has claimed yet.
#[derive(Debug, Clone, Default)]
pub struct WireLog {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl WireLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.buf.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn append(&self, bytes: &[u8]) {
        self.lock().extend_from_slice(bytes);
    }

    /// Find the head starting with `method target`, parse it and discard
    /// everything up to its end.
    pub fn take_head(&self, method: &str, target: &str) -> Option<RawHead> {
        let mut buf = self.lock();
        let start = find_request_line(&buf, method, target)?;

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut request = httparse::Request::new(&mut headers);
        let head_len = match request.parse(&buf[start..]) {
            Ok(httparse::Status::Complete(len)) => len,
            Ok(httparse::Status::Partial) => return None,
            Err(e) => {
                tracing::debug!(error = %e, "Captured head did not parse");
                return None;
            }
        };

        let head = RawHead {
            target: request.path.unwrap_or(target).to_string(),
            headers: request
                .headers
                .iter()
                .map(|h| {
                    (
                        h.name.to_string(),
                        String::from_utf8_lossy(h.value).into_owned(),
                    )
                })
                .collect(),
        };

        buf.drain(..start + head_len);
        Some(head)
    }

    /// Discard up to `len` bytes of body that followed the last head.
    pub fn skip(&self, len: usize) {
        let mut buf = self.lock();
        let len = len.min(buf.len());
        buf.drain(..len);
    }
}

/// Offset of a line starting with `method target `.
fn find_request_line(buf: &[u8], method: &str, target: &str) -> Option<usize> {
    let line = format!("{method} {target} ");
    let line = line.as_bytes();

    (0..buf.len())
        .filter(|&i| i == 0 || buf[i - 1] == b'\n')
        .find(|&i| buf[i..].starts_with(line))
}

/// Stream wrapper that copies everything read into a [`WireLog`].
#[derive(Debug)]
pub struct RecordingStream<S> {
    inner: S,
    wire: WireLog,
}

impl<S> RecordingStream<S> {
    pub fn new(inner: S, wire: WireLog) -> Self {
        Self { inner, wire }
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for RecordingStream<S> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let before = buf.filled().len();
        let this = &mut *self;
        let poll = Pin::new(&mut this.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = poll {
            this.wire.append(&buf.filled()[before..]);
        }
        poll
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for RecordingStream<S> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_write_vectored(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}
