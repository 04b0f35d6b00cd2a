//! The request a response is emitted for.
//!
//! The transport parses the request and hands over its head together with a
//! cancellation signal that fires when the client goes away. Responses only
//! read from it; nothing here parses bytes.

use http::request::Parts;
use http::{HeaderMap, Method, Request, Uri, Version};
use tokio_util::sync::CancellationToken;

/// An incoming request head plus the signal telling whether the request has been cancelled.
#[derive(Debug)]
pub struct IncomingRequest {
    inner: Request<()>,
    cancellation: CancellationToken,
}

impl IncomingRequest {
    /// Creates a request with a fresh, never cancelled, signal.
    pub fn new(inner: Request<()>) -> Self {
        Self::with_cancellation(inner, CancellationToken::new())
    }

    /// Creates a request bound to the transport's cancellation signal.
    pub fn with_cancellation(inner: Request<()>, cancellation: CancellationToken) -> Self {
        Self { inner, cancellation }
    }

    /// Consumes the request and returns the inner `Request<()>`.
    pub fn into_inner(self) -> Request<()> {
        self.inner
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    /// Returns a reference to the request's URI.
    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    /// Returns the request's HTTP version.
    pub fn version(&self) -> Version {
        self.inner.version()
    }

    /// Returns a reference to the request's headers.
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Returns the cancellation signal of this request.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Returns true once the transport has cancelled this request.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

impl AsRef<Request<()>> for IncomingRequest {
    fn as_ref(&self) -> &Request<()> {
        &self.inner
    }
}

impl From<Parts> for IncomingRequest {
    #[inline]
    fn from(parts: Parts) -> Self {
        Self::new(Request::from_parts(parts, ()))
    }
}

impl From<Request<()>> for IncomingRequest {
    #[inline]
    fn from(inner: Request<()>) -> Self {
        Self::new(inner)
    }
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;

    #[test]
    fn exposes_request_head() {
        let request = Request::post("/index/?a=1&b=2")
            .header(http::header::HOST, "127.0.0.1:8080")
            .header(http::header::ACCEPT, "*/*")
            .body(())
            .unwrap();

        let request = IncomingRequest::from(request);

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.version(), Version::HTTP_11);
        assert_eq!(request.uri().path(), "/index/");
        assert_eq!(request.uri().query(), Some("a=1&b=2"));
        assert_eq!(request.headers().len(), 2);
        assert_eq!(request.headers().get(http::header::ACCEPT), Some(&HeaderValue::from_static("*/*")));
        assert!(!request.is_cancelled());
    }

    #[test]
    fn follows_transport_cancellation() {
        let token = CancellationToken::new();
        let request = IncomingRequest::with_cancellation(Request::get("/").body(()).unwrap(), token.clone());

        assert!(!request.is_cancelled());
        token.cancel();
        assert!(request.is_cancelled());
        assert!(request.cancellation().is_cancelled());
    }
}
