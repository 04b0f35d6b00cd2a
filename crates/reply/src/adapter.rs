use crate::{EmitError, Responder, Response};
use async_trait::async_trait;
use micro_reply_http::handler::Handler;
use micro_reply_http::protocol::IncomingRequest;
use micro_reply_http::writer::ResponseWriter;
use tracing::error;

/// Lets a [`Handler`] stand where a [`Responder`] is expected.
///
/// Emission runs the handler against the writer. The handler owns the whole
/// response, so every accessor of the [`Responder`] surface fails with
/// [`ResponseError::Unsupported`](crate::ResponseError::Unsupported).
#[derive(Debug)]
pub struct HandlerAdapter<H> {
    handler: H,
}

impl<H: Handler> HandlerAdapter<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn into_inner(self) -> H {
        self.handler
    }
}

#[async_trait]
impl<H: Handler> Responder for HandlerAdapter<H> {
    fn base(&self) -> Option<&Response> {
        None
    }

    fn base_mut(&mut self) -> Option<&mut Response> {
        None
    }

    async fn emit(&mut self, writer: &mut dyn ResponseWriter, request: &IncomingRequest) -> Result<(), EmitError> {
        self.handler.serve(writer, request).await.map_err(|source| {
            error!(cause = %source, uri = %request.uri(), "handler failed");
            EmitError::Handler { source }
        })
    }
}
