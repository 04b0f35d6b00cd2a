use super::Response;
use crate::EmitError;
use crate::ResponseError;
use crate::sniff::{MagicSniffer, SNIFF_LEN, Sniffer};
use http::header::{self, HeaderValue};
use mime::Mime;
use micro_reply_http::protocol::IncomingRequest;
use micro_reply_http::writer::ResponseWriter;
use std::fmt;
use std::io::SeekFrom;
use std::ops::{Deref, DerefMut};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, ReadBuf};
use tracing::{debug, error, trace};

/// Size of the chunks copied from a source to the writer.
pub const COPY_BUF_SIZE: usize = 8 * 1024;

/// A byte source that can be rewound after sniffing.
pub trait SeekableSource: AsyncRead + AsyncSeek + Unpin + Send {}

impl<T> SeekableSource for T where T: AsyncRead + AsyncSeek + Unpin + Send {}

/// The body source of a [`ReaderResponse`].
pub enum ReaderSource {
    Seekable(Box<dyn SeekableSource>),
    /// Can only be streamed when the content type is set explicitly.
    Forward(Box<dyn AsyncRead + Unpin + Send>),
}

impl ReaderSource {
    pub fn seekable<R>(reader: R) -> Self
    where
        R: AsyncRead + AsyncSeek + Unpin + Send + 'static,
    {
        Self::Seekable(Box::new(reader))
    }

    pub fn forward<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        Self::Forward(Box::new(reader))
    }
}

impl AsyncRead for ReaderSource {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            Self::Seekable(reader) => Pin::new(reader).poll_read(cx, buf),
            Self::Forward(reader) => Pin::new(reader).poll_read(cx, buf),
        }
    }
}

impl fmt::Debug for ReaderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seekable(_) => f.write_str("Seekable"),
            Self::Forward(_) => f.write_str("Forward"),
        }
    }
}

/// A response streaming its body from an async reader.
///
/// The content type is, in order: the explicit one, the one sniffed from the
/// first [`SNIFF_LEN`] bytes of the source, or `application/octet-stream`
/// when there is no source.
pub struct ReaderResponse {
    pub(crate) response: Response,
    content_type: Option<HeaderValue>,
    source: Option<ReaderSource>,
    sniffer: Box<dyn Sniffer>,
}

impl ReaderResponse {
    pub fn new(response: Response) -> Self {
        Self { response, content_type: None, source: None, sniffer: Box::new(MagicSniffer) }
    }

    /// Sets the content type sent instead of a sniffed one; an empty string unsets it.
    pub fn set_content_type(&mut self, content_type: &str) -> Result<(), ResponseError> {
        if content_type.is_empty() {
            self.content_type = None;
            return Ok(());
        }

        let value = HeaderValue::from_str(content_type)
            .map_err(|e| ResponseError::invalid_argument("content_type", format!("`{content_type}`: {e}")))?;
        self.content_type = Some(value);
        Ok(())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_ref().and_then(|value| value.to_str().ok())
    }

    pub fn set_source(&mut self, source: Option<ReaderSource>) {
        self.source = source;
    }

    /// Sets a seekable reader as the source.
    pub fn set_reader<R>(&mut self, reader: R)
    where
        R: AsyncRead + AsyncSeek + Unpin + Send + 'static,
    {
        self.source = Some(ReaderSource::seekable(reader));
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn take_source(&mut self) -> Option<ReaderSource> {
        self.source.take()
    }

    /// Replaces the content type detector.
    pub fn set_sniffer<S: Sniffer + 'static>(&mut self, sniffer: S) {
        self.sniffer = Box::new(sniffer);
    }

    pub fn into_response(self) -> Response {
        self.response
    }

    pub async fn emit(&mut self, writer: &mut dyn ResponseWriter, _request: &IncomingRequest) -> Result<(), EmitError> {
        let content_type = self.resolve_content_type().await?;

        self.response.apply_headers(writer);
        writer.headers_mut().insert(header::CONTENT_TYPE, content_type);
        writer.write_head(self.response.status_code()).await?;

        let Some(source) = self.source.as_mut() else {
            return Ok(());
        };

        let mut buf = vec![0u8; COPY_BUF_SIZE];
        let mut total = 0usize;
        loop {
            let n = source.read(&mut buf).await.map_err(|e| {
                error!(cause = %e, written = total, "read response source failed");
                EmitError::from(e)
            })?;
            if n == 0 {
                break;
            }
            writer.write(&buf[..n]).await?;
            total += n;
        }

        trace!(bytes = total, "copied response source");
        Ok(())
    }

    async fn resolve_content_type(&mut self) -> Result<HeaderValue, EmitError> {
        if let Some(content_type) = &self.content_type {
            return Ok(content_type.clone());
        }

        let reader = match self.source.as_mut() {
            None => return Ok(header_value_of(&mime::APPLICATION_OCTET_STREAM)),
            Some(ReaderSource::Forward(_)) => {
                error!("can not sniff a forward only source without an explicit content type");
                return Err(EmitError::NotSeekable);
            }
            Some(ReaderSource::Seekable(reader)) => reader,
        };

        let mut prefix = Vec::with_capacity(SNIFF_LEN);
        (&mut *reader).take(SNIFF_LEN as u64).read_to_end(&mut prefix).await?;
        let mime = self.sniffer.sniff(&prefix);

        reader.seek(SeekFrom::Start(0)).await.map_err(|e| {
            error!(cause = %e, "rewind response source failed");
            EmitError::from(e)
        })?;

        debug!(content_type = %mime, sniffed = prefix.len(), "sniffed response content type");
        Ok(header_value_of(&mime))
    }
}

fn header_value_of(mime: &Mime) -> HeaderValue {
    HeaderValue::from_str(mime.as_ref()).unwrap_or(HeaderValue::from_static("application/octet-stream"))
}

impl Deref for ReaderResponse {
    type Target = Response;

    fn deref(&self) -> &Self::Target {
        &self.response
    }
}

impl DerefMut for ReaderResponse {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.response
    }
}

impl fmt::Debug for ReaderResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderResponse")
            .field("response", &self.response)
            .field("content_type", &self.content_type)
            .field("source", &self.source)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{BrokenWriter, get};
    use micro_reply_http::writer::ResponseRecorder;
    use std::io::{self, Cursor, SeekFrom};
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, AsyncSeek, ReadBuf};

    /// Serves its bytes until rewound, then fails on the second read.
    struct FlakySource {
        inner: Cursor<Vec<u8>>,
        rewound: bool,
        reads: usize,
    }

    impl AsyncRead for FlakySource {
        fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
            if self.rewound {
                if self.reads > 0 {
                    return Poll::Ready(Err(io::Error::other("device removed")));
                }
                self.reads += 1;
            }
            Pin::new(&mut self.inner).poll_read(cx, buf)
        }
    }

    impl AsyncSeek for FlakySource {
        fn start_seek(mut self: Pin<&mut Self>, position: SeekFrom) -> io::Result<()> {
            self.rewound = true;
            Pin::new(&mut self.inner).start_seek(position)
        }

        fn poll_complete(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
            Pin::new(&mut self.inner).poll_complete(cx)
        }
    }

    #[tokio::test]
    async fn explicit_content_type_wins() {
        let mut reader = Response::ok().reader(Cursor::new(b"<html></html>".to_vec()));
        reader.set_content_type("application/x-custom").unwrap();

        let mut recorder = ResponseRecorder::new();
        reader.emit(&mut recorder, &get("/")).await.unwrap();

        assert_eq!(recorder.header("content-type"), Some("application/x-custom"));
        assert_eq!(recorder.body_string(), "<html></html>");
    }

    #[tokio::test]
    async fn sniffs_then_rewinds() {
        let text = "Hello, World!".repeat(100);
        let mut reader = Response::ok().reader(Cursor::new(text.clone().into_bytes()));

        let mut recorder = ResponseRecorder::new();
        reader.emit(&mut recorder, &get("/")).await.unwrap();

        assert_eq!(recorder.header("content-type"), Some("text/plain; charset=utf-8"));
        assert_eq!(recorder.body_string(), text);
    }

    #[tokio::test]
    async fn no_source_is_octet_stream() {
        let mut reader = ReaderResponse::new(Response::ok());

        let mut recorder = ResponseRecorder::new();
        reader.emit(&mut recorder, &get("/")).await.unwrap();

        assert_eq!(recorder.header("content-type"), Some("application/octet-stream"));
        assert!(recorder.body().is_empty());
    }

    #[tokio::test]
    async fn forward_source_needs_content_type() {
        let mut reader = ReaderResponse::new(Response::ok());
        reader.set_source(Some(ReaderSource::forward(&b"plain"[..])));

        let mut recorder = ResponseRecorder::new();
        let result = reader.emit(&mut recorder, &get("/")).await;
        assert!(matches!(result, Err(EmitError::NotSeekable)));
        assert!(!recorder.is_head_written());

        reader.set_source(Some(ReaderSource::forward(&b"plain"[..])));
        reader.set_content_type("text/plain").unwrap();
        let mut recorder = ResponseRecorder::new();
        reader.emit(&mut recorder, &get("/")).await.unwrap();
        assert_eq!(recorder.body_string(), "plain");
    }

    #[tokio::test]
    async fn base_headers_and_cookies_are_kept() {
        let mut reader = Response::new(206).unwrap().reader(Cursor::new(vec![0u8, 1, 2]));
        reader.set_header("x-request-id", "42", true).unwrap();
        reader.set_cookie(crate::Cookie::new("k", "v"));
        reader.set_sniffer(|_: &[u8]| mime::IMAGE_PNG);

        let mut recorder = ResponseRecorder::new();
        reader.emit(&mut recorder, &get("/")).await.unwrap();

        assert_eq!(recorder.status().as_u16(), 206);
        assert_eq!(recorder.header("x-request-id"), Some("42"));
        assert_eq!(recorder.header("set-cookie"), Some("k=v"));
        assert_eq!(recorder.header("content-type"), Some("image/png"));
        assert_eq!(recorder.body(), [0u8, 1, 2]);
    }

    #[tokio::test]
    async fn empty_content_type_unsets() {
        let mut reader = ReaderResponse::new(Response::ok());
        reader.set_content_type("text/csv").unwrap();
        assert_eq!(reader.content_type(), Some("text/csv"));
        reader.set_content_type("").unwrap();
        assert_eq!(reader.content_type(), None);
        assert!(reader.set_content_type("bad\nvalue").is_err());
    }

    #[tokio::test]
    async fn copy_failure_is_fatal() {
        let mut reader = Response::ok().reader(Cursor::new(b"data".to_vec()));
        let mut writer = BrokenWriter::default();

        let result = reader.emit(&mut writer, &get("/")).await;
        assert!(matches!(result, Err(EmitError::Send { .. })));
    }

    #[tokio::test]
    async fn read_failure_mid_copy_is_fatal() {
        let source = FlakySource { inner: Cursor::new(b"hello world".to_vec()), rewound: false, reads: 0 };
        let mut reader = Response::ok().reader(source);

        let mut recorder = ResponseRecorder::new();
        let result = reader.emit(&mut recorder, &get("/")).await;

        let Err(EmitError::Io { source }) = result else {
            panic!("expected an io error");
        };
        assert_eq!(source.to_string(), "device removed");
        assert_eq!(recorder.header("content-type"), Some("text/plain; charset=utf-8"));
        assert_eq!(recorder.body_string(), "hello world");
    }
}
