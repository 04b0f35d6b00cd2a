//! The base response and its typed variants.
//!
//! [`Response`] holds what every response has: a status code, a header
//! multimap, cookies and an optional [`Content`]. The factory methods move it
//! into a typed variant, which keeps it embedded and reachable through `Deref`,
//! so headers or cookies set before or after the conversion end up on the wire.
//!
//! Emission writes, in order: cookies as `set-cookie` headers, the headers,
//! the status line, then the body. Headers set after emission started are not
//! sent.

use crate::responder::impl_responder;
use crate::{Content, Cookie, EmitError, ResponseError};
use async_trait::async_trait;
use bytes::BytesMut;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode, header};
use micro_reply_http::protocol::IncomingRequest;
use micro_reply_http::writer::ResponseWriter;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncSeek};
use tracing::{trace, warn};

mod file;
mod html;
mod json;
mod reader;
mod redirect;
mod streamed;
mod xml;

pub use file::FileResponse;
pub use html::HtmlResponse;
pub use json::JsonResponse;
pub use reader::COPY_BUF_SIZE;
pub use reader::ReaderResponse;
pub use reader::ReaderSource;
pub use reader::SeekableSource;
pub use redirect::RedirectResponse;
pub use streamed::Step;
pub use streamed::StreamedResponse;
pub use xml::XmlResponse;

/// A deferred serde encoding, run at emission so failures abort the response instead of the setter.
pub(crate) type Encode = Box<dyn Fn() -> Result<Vec<u8>, String> + Send + Sync>;

/// Status code, headers, cookies and content of an HTTP response.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    cookies: Vec<Cookie<'static>>,
    content: Option<Content>,
}

impl Response {
    /// Creates an empty response; fails unless `100 <= status_code < 600`.
    pub fn new(status_code: u16) -> Result<Self, ResponseError> {
        Ok(Self::from_status(parse_status(status_code)?))
    }

    pub fn with_content(status_code: u16, content: impl Into<Content>) -> Result<Self, ResponseError> {
        let mut response = Self::new(status_code)?;
        response.set_content(content);
        Ok(response)
    }

    /// An empty `200 OK` response.
    pub fn ok() -> Self {
        Self::from_status(StatusCode::OK)
    }

    fn from_status(status: StatusCode) -> Self {
        Self { status, headers: HeaderMap::new(), cookies: Vec::new(), content: None }
    }

    pub fn set_status_code(&mut self, status_code: u16) -> Result<(), ResponseError> {
        self.status = parse_status(status_code)?;
        Ok(())
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn set_content(&mut self, content: impl Into<Content>) {
        self.content = Some(content.into());
    }

    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    pub fn take_content(&mut self) -> Option<Content> {
        self.content.take()
    }

    /// Sets a header; `replace` drops every previous value of `key`, otherwise `value` is appended.
    pub fn set_header(&mut self, key: &str, value: &str, replace: bool) -> Result<(), ResponseError> {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| ResponseError::invalid_argument("key", format!("`{key}`: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ResponseError::invalid_argument("value", format!("`{value}`: {e}")))?;

        if replace {
            self.headers.insert(name, value);
        } else {
            self.headers.append(name, value);
        }
        Ok(())
    }

    /// Replace-sets every pair.
    pub fn set_headers<I, K, V>(&mut self, headers: I) -> Result<(), ResponseError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in headers {
            self.set_header(key.as_ref(), value.as_ref(), true)?;
        }
        Ok(())
    }

    /// Returns true when the first value of `key` is non-empty.
    ///
    /// A header explicitly set to the empty string reads as absent.
    pub fn has_header(&self, key: &str) -> bool {
        self.header(key).is_some_and(|value| !value.is_empty())
    }

    /// The first value of `key`, if it is visible ASCII.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).and_then(|value| value.to_str().ok())
    }

    /// Every value of `key` in insertion order.
    pub fn header_all(&self, key: &str) -> Vec<&str> {
        self.headers.get_all(key).iter().filter_map(|value| value.to_str().ok()).collect()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn set_cookie(&mut self, cookie: Cookie<'static>) {
        self.cookies.push(cookie);
    }

    pub fn cookies(&self) -> &[Cookie<'static>] {
        &self.cookies
    }

    /// Writes cookies, headers, the status line and the content.
    pub async fn emit(&mut self, writer: &mut dyn ResponseWriter, _request: &IncomingRequest) -> Result<(), EmitError> {
        self.write_head(writer).await?;

        match &self.content {
            Some(Content::Bytes(bytes)) => writer.write(bytes).await?,
            Some(Content::Text(text)) => writer.write(text.as_bytes()).await?,
            Some(content) => writer.write(&content.to_bytes()).await?,
            None => writer.write(&[]).await?,
        }
        Ok(())
    }

    /// Copies cookies then headers onto the writer, replacing what it holds for the same names.
    pub(crate) fn apply_headers(&self, writer: &mut dyn ResponseWriter) {
        let sink = writer.headers_mut();

        for cookie in &self.cookies {
            match HeaderValue::from_str(&cookie.to_string()) {
                Ok(value) => {
                    sink.append(header::SET_COOKIE, value);
                }
                Err(e) => warn!(cookie = cookie.name(), cause = %e, "drop invalid cookie"),
            }
        }

        for name in self.headers.keys() {
            sink.remove(name);
            for value in self.headers.get_all(name) {
                sink.append(name.clone(), value.clone());
            }
        }
    }

    /// Applies cookies and headers then writes the status line.
    pub(crate) async fn write_head(&self, writer: &mut dyn ResponseWriter) -> Result<(), EmitError> {
        self.apply_headers(writer);
        trace!(status = %self.status, cookies = self.cookies.len(), "write response head");
        writer.write_head(self.status).await?;
        Ok(())
    }

    pub(crate) fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Converts into a JSON response encoding `data`.
    pub fn json<T>(self, data: T) -> JsonResponse
    where
        T: Serialize + Send + Sync + 'static,
    {
        let mut json = JsonResponse::new(self);
        json.set_content(data);
        json
    }

    /// Converts into a JSON response encoding the current content, or `null` without one.
    pub fn into_json(mut self) -> JsonResponse {
        let content = self.take_content();
        let mut json = JsonResponse::new(self);
        if let Some(content) = content {
            json.set_content(content);
        }
        json
    }

    /// Converts into an XML response encoding `data`.
    pub fn xml<T>(self, data: T) -> XmlResponse
    where
        T: Serialize + Send + Sync + 'static,
    {
        let mut xml = XmlResponse::new(self);
        xml.set_content(data);
        xml
    }

    /// Converts into an XML response encoding the current content, or an empty body without one.
    pub fn into_xml(mut self) -> XmlResponse {
        let content = self.take_content();
        let mut xml = XmlResponse::new(self);
        if let Some(content) = content {
            xml.set_base_content(content);
        }
        xml
    }

    /// Converts into a response streaming a seekable reader.
    pub fn reader<R>(self, reader: R) -> ReaderResponse
    where
        R: AsyncRead + AsyncSeek + Unpin + Send + 'static,
    {
        let mut response = ReaderResponse::new(self);
        response.set_source(Some(ReaderSource::seekable(reader)));
        response
    }

    pub fn redirect(self, location: impl Into<String>) -> RedirectResponse {
        let mut redirect = RedirectResponse::new(self);
        redirect.set_location(location);
        redirect
    }

    pub fn file(self, path: impl Into<PathBuf>) -> FileResponse {
        let mut file = FileResponse::new(self);
        file.set_file(path);
        file
    }

    pub fn stream<F>(self, step: F) -> StreamedResponse
    where
        F: FnMut(&mut BytesMut) -> bool + Send + 'static,
    {
        let mut streamed = StreamedResponse::new(self);
        streamed.set_step(step);
        streamed
    }

    pub fn into_stream(self) -> StreamedResponse {
        StreamedResponse::new(self)
    }

    /// Converts into an HTML response rendering the template file at `path`.
    pub async fn html(self, path: impl AsRef<Path>, model: Map<String, Value>) -> Result<HtmlResponse, ResponseError> {
        let mut html = HtmlResponse::new(self);
        html.load_html(path).await?;
        html.set_model(model);
        Ok(html)
    }

    pub fn html_str(self, template: impl Into<String>, model: Map<String, Value>) -> HtmlResponse {
        let mut html = HtmlResponse::new(self);
        html.set_html(template);
        html.set_model(model);
        html
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}

#[async_trait]
impl crate::Responder for Response {
    fn base(&self) -> Option<&Response> {
        Some(self)
    }

    fn base_mut(&mut self) -> Option<&mut Response> {
        Some(self)
    }

    async fn emit(&mut self, writer: &mut dyn ResponseWriter, request: &IncomingRequest) -> Result<(), EmitError> {
        Response::emit(self, writer, request).await
    }
}

impl_responder!(ReaderResponse);
impl_responder!(RedirectResponse);
impl_responder!(StreamedResponse);
impl_responder!(HtmlResponse);

fn parse_status(status_code: u16) -> Result<StatusCode, ResponseError> {
    if !(100..600).contains(&status_code) {
        return Err(ResponseError::invalid_argument("status_code", format!("invalid status code: {status_code}")));
    }
    StatusCode::from_u16(status_code).map_err(|e| ResponseError::invalid_argument("status_code", e))
}
