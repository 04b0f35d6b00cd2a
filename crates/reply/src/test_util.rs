use async_trait::async_trait;
use http::{HeaderMap, Method, Request, StatusCode};
use micro_reply_http::protocol::{IncomingRequest, SendError};
use micro_reply_http::writer::{Flush, ResponseWriter};
use std::io;

pub(crate) fn get(path: &str) -> IncomingRequest {
    request(Method::GET, path)
}

pub(crate) fn request(method: Method, path: &str) -> IncomingRequest {
    IncomingRequest::from(Request::builder().method(method).uri(path).body(()).unwrap())
}

/// A writer whose body writes always fail, like a connection reset by the peer.
#[derive(Debug, Default)]
pub(crate) struct BrokenWriter {
    headers: HeaderMap,
    pub(crate) status: Option<StatusCode>,
    flushable: bool,
    pub(crate) flushes: usize,
}

impl BrokenWriter {
    pub(crate) fn flushable() -> Self {
        Self { flushable: true, ..Self::default() }
    }
}

#[async_trait]
impl ResponseWriter for BrokenWriter {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    async fn write_head(&mut self, status: StatusCode) -> Result<(), SendError> {
        self.status = Some(status);
        Ok(())
    }

    async fn write(&mut self, _data: &[u8]) -> Result<(), SendError> {
        Err(SendError::io(io::Error::from(io::ErrorKind::ConnectionReset)))
    }

    fn flusher(&mut self) -> Option<&mut dyn Flush> {
        if self.flushable { Some(self) } else { None }
    }
}

#[async_trait]
impl Flush for BrokenWriter {
    async fn flush(&mut self) -> Result<(), SendError> {
        self.flushes += 1;
        Ok(())
    }
}
