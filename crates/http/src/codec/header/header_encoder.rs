//! HTTP header encoder implementation for serializing HTTP response headers
//!
//! This module provides functionality for encoding HTTP response heads into raw bytes.
//! It handles serialization of the status line and headers, and sets content length or
//! transfer encoding headers according to the payload framing.

use crate::protocol::{PayloadSize, ResponseHead, SendError};

use bytes::{BufMut, BytesMut};

use http::{HeaderValue, Version, header};
use std::io;
use std::io::Write;
use tracing::error;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Encoder for HTTP response heads implementing the [`Encoder`](tokio_util::codec::Encoder) trait.
///
/// This encoder serializes a [`ResponseHead`] and [`PayloadSize`] into raw bytes,
/// setting Content-Length or Transfer-Encoding headers based on the payload size.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderEncoder;

impl tokio_util::codec::Encoder<(ResponseHead, PayloadSize)> for HeaderEncoder {
    type Error = SendError;

    /// Encodes the response head into the provided bytes buffer.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - HTTP version is not supported (only HTTP/1.1 supported)
    /// - Writing to buffer fails
    fn encode(&mut self, item: (ResponseHead, PayloadSize), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (mut header, payload_size) = item;

        dst.reserve(INIT_HEADER_SIZE);
        match header.version() {
            Version::HTTP_11 => {
                write!(
                    FastWrite(dst),
                    "HTTP/1.1 {} {}\r\n",
                    header.status().as_str(),
                    header.status().canonical_reason().unwrap_or_default()
                )?;
            }
            v => {
                error!(http_version = ?v, "unsupported http version");
                return Err(SendError::invalid_head(format!("unsupported http version {v:?}")));
            }
        }

        let headers = header.headers_mut();
        match payload_size {
            PayloadSize::Length(n) => {
                headers.remove(header::TRANSFER_ENCODING);
                headers.insert(header::CONTENT_LENGTH, n.into());
            }
            PayloadSize::Chunked => {
                const CHUNKED: HeaderValue = HeaderValue::from_static("chunked");
                headers.remove(header::CONTENT_LENGTH);
                headers.insert(header::TRANSFER_ENCODING, CHUNKED);
            }
            PayloadSize::Empty => {
                // 1xx and 204 must not carry a content-length, 304 keeps whatever the caller set
                headers.remove(header::TRANSFER_ENCODING);
                if header.status().is_informational() || header.status() == http::StatusCode::NO_CONTENT {
                    header.headers_mut().remove(header::CONTENT_LENGTH);
                }
            }
        }

        for (header_name, header_value) in header.headers() {
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

/// Fast writer implementation for writing to `BytesMut`.
///
/// Avoids going through an intermediate `String` when formatting the status line.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Response, StatusCode};
    use indoc::indoc;
    use tokio_util::codec::Encoder;

    fn encode(head: ResponseHead, payload_size: PayloadSize) -> String {
        let mut dst = BytesMut::new();
        HeaderEncoder.encode((head, payload_size), &mut dst).unwrap();
        String::from_utf8(dst.to_vec()).unwrap().replace("\r\n", "\n")
    }

    #[test]
    fn fixed_length_head() {
        let head = Response::builder().status(StatusCode::OK).header("x-trace", "1").body(()).unwrap();

        let expected = indoc! {"
            HTTP/1.1 200 OK
            x-trace: 1
            content-length: 13

        "};
        assert_eq!(encode(head, PayloadSize::Length(13)), expected);
    }

    #[test]
    fn chunked_head_replaces_content_length() {
        let head = Response::builder().status(StatusCode::NOT_FOUND).header("content-length", "99").body(()).unwrap();

        let expected = indoc! {"
            HTTP/1.1 404 Not Found
            transfer-encoding: chunked

        "};
        assert_eq!(encode(head, PayloadSize::Chunked), expected);
    }

    #[test]
    fn repeated_headers_are_written_in_order() {
        let head = Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header("set-cookie", "a=1")
            .header("set-cookie", "b=2")
            .header("content-length", "0")
            .body(())
            .unwrap();

        let expected = indoc! {"
            HTTP/1.1 204 No Content
            set-cookie: a=1
            set-cookie: b=2

        "};
        assert_eq!(encode(head, PayloadSize::Empty), expected);
    }

    #[test]
    fn unknown_status_has_empty_reason() {
        let head = Response::builder().status(599).body(()).unwrap();
        assert!(encode(head, PayloadSize::Length(0)).starts_with("HTTP/1.1 599 \n"));
    }

    #[test]
    fn rejects_http_10() {
        let head = Response::builder().version(Version::HTTP_10).body(()).unwrap();
        let mut dst = BytesMut::new();
        let result = HeaderEncoder.encode((head, PayloadSize::Empty), &mut dst);
        assert!(matches!(result, Err(SendError::InvalidHead { .. })));
    }
}
