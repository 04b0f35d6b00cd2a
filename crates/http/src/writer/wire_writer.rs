use crate::codec::ResponseEncoder;
use crate::protocol::{Message, PayloadItem, PayloadSize, ResponseHead, SendError};
use crate::writer::{Flush, ResponseWriter};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use http::{HeaderMap, HeaderValue, Response, StatusCode, header};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;
use tracing::{trace, warn};

const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// A [`ResponseWriter`] producing HTTP/1.1 bytes on an `AsyncWrite`.
///
/// Bytes are encoded into an internal buffer which is handed to the underlying
/// writer when it grows past its capacity, on [`Flush::flush`] and on
/// [`finish`](WireWriter::finish).
///
/// Framing is decided when the head is written: bodiless statuses get no
/// payload, a caller supplied `content-length` is honoured, anything else is
/// sent with chunked transfer encoding. A `date` header is added when missing.
#[derive(Debug)]
pub struct WireWriter<W> {
    writer: W,
    buffer: BytesMut,
    capacity: usize,
    encoder: ResponseEncoder,
    headers: HeaderMap,
    status: Option<StatusCode>,
}

impl<W> WireWriter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self::with_capacity(writer, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(writer: W, buffer_size: usize) -> Self {
        Self {
            writer,
            buffer: BytesMut::with_capacity(buffer_size),
            capacity: buffer_size,
            encoder: ResponseEncoder::new(),
            headers: HeaderMap::new(),
            status: None,
        }
    }

    /// The status written so far, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Terminates the body and flushes everything to the underlying writer.
    ///
    /// A response that never wrote its head is sent as an empty `200 OK`.
    pub async fn finish(&mut self) -> Result<(), SendError> {
        if self.status.is_none() {
            self.write_head(StatusCode::OK).await?;
        }
        if self.encoder.is_in_payload() {
            let eof = Message::<(ResponseHead, PayloadSize), Bytes>::Payload(PayloadItem::Eof);
            self.encoder.encode(eof, &mut self.buffer)?;
        }
        self.flush_buffer().await
    }

    fn payload_size(&self, status: StatusCode) -> PayloadSize {
        if status.is_informational() || status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED {
            return PayloadSize::Empty;
        }

        self.headers
            .get(header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map_or(PayloadSize::Chunked, PayloadSize::Length)
    }

    async fn drain_if_full(&mut self) -> Result<(), SendError> {
        if self.buffer.len() < self.capacity {
            return Ok(());
        }
        self.writer.write_all(self.buffer.as_ref()).await?;
        self.buffer.clear();
        Ok(())
    }

    async fn flush_buffer(&mut self) -> Result<(), SendError> {
        if !self.buffer.is_empty() {
            self.writer.write_all(self.buffer.as_ref()).await?;
            self.buffer.clear();
        }
        Ok(self.writer.flush().await?)
    }
}

#[async_trait]
impl<W> ResponseWriter for WireWriter<W>
where
    W: AsyncWrite + Unpin + Send,
{
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

        if !self.headers.contains_key(header::DATE) {
            let mut buf = faf_http_date::get_date_buff_no_key();
            faf_http_date::get_date_no_key(&mut buf);
            if let Ok(date) = HeaderValue::from_bytes(&buf) {
                self.headers.insert(header::DATE, date);
            }
        }

        let payload_size = self.payload_size(status);
        trace!(status = %status, ?payload_size, "write response head");

        let mut head = Response::new(());
        *head.status_mut() = status;
        *head.headers_mut() = self.headers.clone();

        self.encoder.encode(Message::<_, Bytes>::Header((head, payload_size)), &mut self.buffer)?;
        self.status = Some(status);
        self.drain_if_full().await
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), SendError> {
        if self.status.is_none() {
            self.write_head(StatusCode::OK).await?;
        }
        let chunk = Message::<(ResponseHead, PayloadSize), &[u8]>::Payload(PayloadItem::Chunk(data));
        self.encoder.encode(chunk, &mut self.buffer)?;
        self.drain_if_full().await
    }

    fn flusher(&mut self) -> Option<&mut dyn Flush> {
        Some(self)
    }
}

#[async_trait]
impl<W> Flush for WireWriter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn flush(&mut self) -> Result<(), SendError> {
        self.flush_buffer().await
    }
}
