use crate::protocol::SendError;
use crate::writer::{Flush, ResponseWriter};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use http::{HeaderMap, StatusCode};
use tracing::warn;

/// An in-memory [`ResponseWriter`] recording what a response emitted.
///
/// The headers sent with the status line are captured when the head is
/// written, later changes to [`headers_mut`](ResponseWriter::headers_mut) are
/// not part of the result, the same way they would not reach the wire.
#[derive(Debug)]
pub struct ResponseRecorder {
    headers: HeaderMap,
    status: Option<StatusCode>,
    sent_headers: Option<HeaderMap>,
    body: BytesMut,
    flush_count: usize,
    flushable: bool,
}

impl ResponseRecorder {
    pub fn new() -> Self {
        Self {
            headers: HeaderMap::new(),
            status: None,
            sent_headers: None,
            body: BytesMut::new(),
            flush_count: 0,
            flushable: true,
        }
    }

    /// A recorder without the [`Flush`] capability.
    pub fn without_flush() -> Self {
        Self { flushable: false, ..Self::new() }
    }

    /// The written status, `200 OK` when nothing was written, like a client would see it.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    /// Returns true once the status line has been written.
    pub fn is_head_written(&self) -> bool {
        self.status.is_some()
    }

    /// Headers as they were sent with the status line, or the pending ones if no head was written.
    pub fn sent_headers(&self) -> &HeaderMap {
        self.sent_headers.as_ref().unwrap_or(&self.headers)
    }

    /// The first value of a sent header, as a string.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.sent_headers().get(key).and_then(|value| value.to_str().ok())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn into_body(self) -> Bytes {
        self.body.freeze()
    }

    pub fn flush_count(&self) -> usize {
        self.flush_count
    }

    fn snapshot_head(&mut self, status: StatusCode) {
        self.status = Some(status);
        self.sent_headers = Some(self.headers.clone());
    }
}

impl Default for ResponseRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResponseWriter for ResponseRecorder {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    async fn write_head(&mut self, status: StatusCode) -> Result<(), SendError> {
        if let Some(written) = self.status {
            warn!(written = %written, ignored = %status, "response head already written");
            return Ok(());
        }
        self.snapshot_head(status);
        Ok(())
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), SendError> {
        if self.status.is_none() {
            self.snapshot_head(StatusCode::OK);
        }
        self.body.extend_from_slice(data);
        Ok(())
    }

    fn flusher(&mut self) -> Option<&mut dyn Flush> {
        if self.flushable { Some(self) } else { None }
    }
}

#[async_trait]
impl Flush for ResponseRecorder {
    async fn flush(&mut self) -> Result<(), SendError> {
        if self.status.is_none() {
            self.snapshot_head(StatusCode::OK);
        }
        self.flush_count += 1;
        Ok(())
    }
}
