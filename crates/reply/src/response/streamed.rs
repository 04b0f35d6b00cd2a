use super::Response;
use crate::EmitError;
use bytes::BytesMut;
use micro_reply_http::protocol::IncomingRequest;
use micro_reply_http::writer::ResponseWriter;
use std::fmt;
use std::ops::{Deref, DerefMut};
use tracing::{debug, error, trace};

/// Produces the next part of a streamed body into the buffer, returning whether to continue.
pub type Step = Box<dyn FnMut(&mut BytesMut) -> bool + Send>;

/// A response whose body is produced step by step and flushed at the end.
///
/// The request's cancellation token is checked once, before anything is
/// written: a cancelled request gets no head and no body. The writer must
/// support flushing.
pub struct StreamedResponse {
    pub(crate) response: Response,
    step: Option<Step>,
}

impl StreamedResponse {
    pub fn new(response: Response) -> Self {
        Self { response, step: None }
    }

    pub fn set_step<F>(&mut self, step: F)
    where
        F: FnMut(&mut BytesMut) -> bool + Send + 'static,
    {
        self.step = Some(Box::new(step));
    }

    pub fn has_step(&self) -> bool {
        self.step.is_some()
    }

    pub fn into_response(self) -> Response {
        self.response
    }

    pub async fn emit(&mut self, writer: &mut dyn ResponseWriter, request: &IncomingRequest) -> Result<(), EmitError> {
        if request.is_cancelled() {
            debug!(uri = %request.uri(), "request cancelled, skip streamed response");
            return Ok(());
        }

        if writer.flusher().is_none() {
            error!("streamed response needs a flushable writer");
            return Err(EmitError::FlushUnsupported);
        }

        self.response.write_head(writer).await?;

        if let Some(step) = self.step.as_mut() {
            let mut buf = BytesMut::new();
            let mut steps = 0usize;
            loop {
                let more = step(&mut buf);
                steps += 1;
                if !buf.is_empty() {
                    writer.write(&buf).await?;
                    buf.clear();
                }
                if !more {
                    break;
                }
            }
            trace!(steps, "streamed response steps done");
        }

        match writer.flusher() {
            Some(flusher) => flusher.flush().await?,
            None => return Err(EmitError::FlushUnsupported),
        }
        Ok(())
    }
}

impl Deref for StreamedResponse {
    type Target = Response;

    fn deref(&self) -> &Self::Target {
        &self.response
    }
}

impl DerefMut for StreamedResponse {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.response
    }
}

impl fmt::Debug for StreamedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamedResponse")
            .field("response", &self.response)
            .field("has_step", &self.step.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{BrokenWriter, get};
    use http::{Request, StatusCode};
    use micro_reply_http::writer::ResponseRecorder;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn concatenates_steps() {
        let mut count = 0;
        let mut streamed = Response::ok().stream(move |buf| {
            count += 1;
            buf.extend_from_slice(format!("chunk{count};").as_bytes());
            count < 3
        });

        let mut recorder = ResponseRecorder::new();
        streamed.emit(&mut recorder, &get("/events")).await.unwrap();

        assert_eq!(recorder.body_string(), "chunk1;chunk2;chunk3;");
        assert_eq!(recorder.flush_count(), 1);
    }

    #[tokio::test]
    async fn cancelled_request_does_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut streamed = Response::ok().stream(move |buf| {
            counter.fetch_add(1, Ordering::SeqCst);
            buf.extend_from_slice(b"data");
            false
        });

        let token = CancellationToken::new();
        token.cancel();
        let request = IncomingRequest::with_cancellation(Request::get("/events").body(()).unwrap(), token);

        let mut recorder = ResponseRecorder::new();
        streamed.emit(&mut recorder, &request).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!recorder.is_head_written());
        assert!(recorder.body().is_empty());
        assert_eq!(recorder.flush_count(), 0);
    }

    #[tokio::test]
    async fn no_step_only_flushes() {
        let mut streamed = Response::new(202).unwrap().into_stream();
        streamed.set_header("x-stream", "1", true).unwrap();

        let mut recorder = ResponseRecorder::new();
        streamed.emit(&mut recorder, &get("/")).await.unwrap();

        assert_eq!(recorder.status().as_u16(), 202);
        assert_eq!(recorder.header("x-stream"), Some("1"));
        assert!(recorder.body().is_empty());
        assert_eq!(recorder.flush_count(), 1);
    }

    #[tokio::test]
    async fn unflushable_writer_is_fatal() {
        let mut streamed = Response::ok().stream(|buf| {
            buf.extend_from_slice(b"never");
            false
        });

        let mut recorder = ResponseRecorder::without_flush();
        let result = streamed.emit(&mut recorder, &get("/")).await;

        assert!(matches!(result, Err(EmitError::FlushUnsupported)));
        assert!(!recorder.is_head_written());
    }

    #[tokio::test]
    async fn write_failure_skips_flush() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut streamed = Response::ok().stream(move |buf| {
            counter.fetch_add(1, Ordering::SeqCst);
            buf.extend_from_slice(b"tick");
            true
        });

        let mut writer = BrokenWriter::flushable();
        let result = streamed.emit(&mut writer, &get("/events")).await;

        assert!(matches!(result, Err(EmitError::Send { .. })));
        assert_eq!(writer.status, Some(StatusCode::OK));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(writer.flushes, 0);
    }
}
