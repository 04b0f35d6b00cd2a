use super::{Encode, Response};
use crate::{Content, EmitError, ResponseError};
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{self, HeaderValue};
use micro_reply_http::protocol::IncomingRequest;
use micro_reply_http::writer::ResponseWriter;
use serde::Serialize;
use std::fmt;
use std::ops::{Deref, DerefMut};
use tracing::error;

/// A response whose body is the JSON encoding of a serde value.
///
/// The value is encoded at emission; `content-type` is always `application/json`.
pub struct JsonResponse {
    response: Response,
    data: Option<Encode>,
}

impl JsonResponse {
    pub fn new(response: Response) -> Self {
        Self { response, data: None }
    }

    pub fn set_content<T>(&mut self, data: T)
    where
        T: Serialize + Send + Sync + 'static,
    {
        self.data = Some(Box::new(move || serde_json::to_vec(&data).map_err(|e| e.to_string())));
    }

    /// Drops the data; the response then emits `null`.
    pub fn clear_content(&mut self) {
        self.data = None;
    }

    pub fn into_response(self) -> Response {
        self.response
    }

    pub async fn emit(&mut self, writer: &mut dyn ResponseWriter, request: &IncomingRequest) -> Result<(), EmitError> {
        let encoded = match &self.data {
            Some(encode) => encode(),
            None => serde_json::to_vec(&()).map_err(|e| e.to_string()),
        };

        let body = encoded.map_err(|reason| {
            error!(cause = %reason, "json encoding failed");
            EmitError::encode("json", reason)
        })?;

        self.response.set_content(Bytes::from(body));
        self.response.insert_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.response.emit(writer, request).await
    }
}

impl Deref for JsonResponse {
    type Target = Response;

    fn deref(&self) -> &Self::Target {
        &self.response
    }
}

impl DerefMut for JsonResponse {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.response
    }
}

impl fmt::Debug for JsonResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonResponse")
            .field("response", &self.response)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}

#[async_trait]
impl crate::Responder for JsonResponse {
    fn base(&self) -> Option<&Response> {
        Some(&self.response)
    }

    fn base_mut(&mut self) -> Option<&mut Response> {
        Some(&mut self.response)
    }

    async fn emit(&mut self, writer: &mut dyn ResponseWriter, request: &IncomingRequest) -> Result<(), EmitError> {
        JsonResponse::emit(self, writer, request).await
    }

    fn set_content(&mut self, content: Content) -> Result<(), ResponseError> {
        JsonResponse::set_content(self, content);
        Ok(())
    }
}
