use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;

use crate::protocol::IncomingRequest;
use crate::writer::ResponseWriter;

/// A request handler supplied by the transport or the application.
///
/// The handler owns the whole response: it writes headers, status and body
/// onto the writer itself.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn serve(
        &self,
        writer: &mut dyn ResponseWriter,
        request: &IncomingRequest,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Box<H> {
    async fn serve(
        &self,
        writer: &mut dyn ResponseWriter,
        request: &IncomingRequest,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        (**self).serve(writer, request).await
    }
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn serve(
        &self,
        writer: &mut dyn ResponseWriter,
        request: &IncomingRequest,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        (**self).serve(writer, request).await
    }
}
