//! The uniform surface every response type implements.
//!
//! [`Responder`] lets the transport and middleware treat the base response, its
//! typed variants and the [`HandlerAdapter`](crate::HandlerAdapter) alike. All
//! accessors go through [`Responder::base`]; types without a base response
//! reject them with [`ResponseError::Unsupported`].

use crate::{Content, Cookie, EmitError, Response, ResponseError};
use async_trait::async_trait;
use http::{HeaderMap, StatusCode};
use micro_reply_http::protocol::IncomingRequest;
use micro_reply_http::writer::ResponseWriter;

#[async_trait]
pub trait Responder: Send {
    /// The base response carrying status, headers, cookies and content.
    fn base(&self) -> Option<&Response>;

    fn base_mut(&mut self) -> Option<&mut Response>;

    /// Writes the whole response onto `writer`. Called once per response.
    async fn emit(&mut self, writer: &mut dyn ResponseWriter, request: &IncomingRequest) -> Result<(), EmitError>;

    fn set_status_code(&mut self, status_code: u16) -> Result<(), ResponseError> {
        self.base_mut().ok_or(ResponseError::unsupported("set_status_code"))?.set_status_code(status_code)
    }

    fn status_code(&self) -> Result<StatusCode, ResponseError> {
        Ok(self.base().ok_or(ResponseError::unsupported("status_code"))?.status_code())
    }

    fn set_content(&mut self, content: Content) -> Result<(), ResponseError> {
        self.base_mut().ok_or(ResponseError::unsupported("set_content"))?.set_content(content);
        Ok(())
    }

    fn content(&self) -> Result<Option<&Content>, ResponseError> {
        Ok(self.base().ok_or(ResponseError::unsupported("content"))?.content())
    }

    fn set_header(&mut self, key: &str, value: &str, replace: bool) -> Result<(), ResponseError> {
        self.base_mut().ok_or(ResponseError::unsupported("set_header"))?.set_header(key, value, replace)
    }

    fn set_headers(&mut self, headers: &[(&str, &str)]) -> Result<(), ResponseError> {
        self.base_mut().ok_or(ResponseError::unsupported("set_headers"))?.set_headers(headers.iter().copied())
    }

    fn has_header(&self, key: &str) -> Result<bool, ResponseError> {
        Ok(self.base().ok_or(ResponseError::unsupported("has_header"))?.has_header(key))
    }

    fn header(&self, key: &str) -> Result<Option<&str>, ResponseError> {
        Ok(self.base().ok_or(ResponseError::unsupported("header"))?.header(key))
    }

    fn headers(&self) -> Result<&HeaderMap, ResponseError> {
        Ok(self.base().ok_or(ResponseError::unsupported("headers"))?.headers())
    }

    fn set_cookie(&mut self, cookie: Cookie<'static>) -> Result<(), ResponseError> {
        self.base_mut().ok_or(ResponseError::unsupported("set_cookie"))?.set_cookie(cookie);
        Ok(())
    }

    fn cookies(&self) -> Result<&[Cookie<'static>], ResponseError> {
        Ok(self.base().ok_or(ResponseError::unsupported("cookies"))?.cookies())
    }
}

/// Boxed responders, e.g. `Box<dyn Responder>` picked at runtime by a handler.
#[async_trait]
impl<R: Responder + ?Sized> Responder for Box<R> {
    fn base(&self) -> Option<&Response> {
        (**self).base()
    }

    fn base_mut(&mut self) -> Option<&mut Response> {
        (**self).base_mut()
    }

    async fn emit(&mut self, writer: &mut dyn ResponseWriter, request: &IncomingRequest) -> Result<(), EmitError> {
        (**self).emit(writer, request).await
    }

    fn set_content(&mut self, content: Content) -> Result<(), ResponseError> {
        (**self).set_content(content)
    }
}

/// Implements [`Responder`] for a variant that embeds its base response in `self.response`
/// and has an inherent `emit`.
macro_rules! impl_responder {
    ($ty:ty) => {
        #[async_trait::async_trait]
        impl $crate::Responder for $ty {
            fn base(&self) -> Option<&$crate::Response> {
                Some(&self.response)
            }

            fn base_mut(&mut self) -> Option<&mut $crate::Response> {
                Some(&mut self.response)
            }

            async fn emit(
                &mut self,
                writer: &mut dyn micro_reply_http::writer::ResponseWriter,
                request: &micro_reply_http::protocol::IncomingRequest,
            ) -> Result<(), $crate::EmitError> {
                <$ty>::emit(self, writer, request).await
            }
        }
    };
}

pub(crate) use impl_responder;
