//! Response sinks.
//!
//! A [`ResponseWriter`] is what a response is emitted onto. It mirrors the way
//! an HTTP/1.1 response goes out: headers are collected in a mutable map, the
//! status line is written once, then body bytes follow. Writing body bytes
//! before the status line implies `200 OK`.
//!
//! Sinks that can push buffered bytes to the client on demand expose the
//! [`Flush`] capability through [`ResponseWriter::flusher`].
//!
//! Two sinks are provided:
//!
//! - [`WireWriter`]: serializes HTTP/1.1 onto any `AsyncWrite`
//! - [`ResponseRecorder`]: keeps everything in memory for inspection

use crate::protocol::SendError;
use async_trait::async_trait;
use http::{HeaderMap, StatusCode};

mod recorder;
mod wire_writer;

pub use recorder::ResponseRecorder;
pub use wire_writer::WireWriter;

/// The output side of a single response.
#[async_trait]
pub trait ResponseWriter: Send {
    /// Headers that will be sent with the status line.
    fn headers(&self) -> &HeaderMap;

    /// Mutable access to the headers; changes after [`write_head`](Self::write_head) have no effect.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Writes the status line and the current headers.
    async fn write_head(&mut self, status: StatusCode) -> Result<(), SendError>;

    /// Writes body bytes, sending the head with `200 OK` first if it is still pending.
    async fn write(&mut self, data: &[u8]) -> Result<(), SendError>;

    /// Returns the flush capability of this sink, if it has one.
    fn flusher(&mut self) -> Option<&mut dyn Flush> {
        None
    }
}

/// Pushes everything written so far to the client.
#[async_trait]
pub trait Flush: Send {
    async fn flush(&mut self) -> Result<(), SendError>;
}

#[async_trait]
impl<W: ResponseWriter + ?Sized> ResponseWriter for &mut W {
    fn headers(&self) -> &HeaderMap {
        (**self).headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        (**self).headers_mut()
    }

    async fn write_head(&mut self, status: StatusCode) -> Result<(), SendError> {
        (**self).write_head(status).await
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), SendError> {
        (**self).write(data).await
    }

    fn flusher(&mut self) -> Option<&mut dyn Flush> {
        (**self).flusher()
    }
}
