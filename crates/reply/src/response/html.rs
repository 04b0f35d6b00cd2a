use super::Response;
use crate::EmitError;
use crate::ResponseError;
use crate::template::Template;
use http::StatusCode;
use http::header::{self, HeaderValue};
use micro_reply_http::protocol::IncomingRequest;
use micro_reply_http::writer::ResponseWriter;
use serde_json::{Map, Value};
use std::ops::{Deref, DerefMut};
use std::path::Path;
use tracing::{error, trace};

/// A response rendering an HTML template against a key/value model.
///
/// See [`template`](crate::template) for the tag syntax. A malformed template
/// is an emission error; a model value that can not be rendered turns into a
/// `500` plain text response instead.
#[derive(Debug)]
pub struct HtmlResponse {
    pub(crate) response: Response,
    html: String,
    model: Map<String, Value>,
}

impl HtmlResponse {
    pub fn new(response: Response) -> Self {
        Self { response, html: String::new(), model: Map::new() }
    }

    pub fn set_html(&mut self, html: impl Into<String>) {
        self.html = html.into();
    }

    /// Reads the template from a file.
    pub async fn load_html(&mut self, path: impl AsRef<Path>) -> Result<(), ResponseError> {
        self.html = tokio::fs::read_to_string(path.as_ref()).await?;
        trace!(path = %path.as_ref().display(), bytes = self.html.len(), "loaded html template");
        Ok(())
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn set_model(&mut self, model: Map<String, Value>) {
        self.model = model;
    }

    /// Inserts or replaces one model entry.
    pub fn assign(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.model.insert(key.into(), value.into());
    }

    pub fn model(&self) -> &Map<String, Value> {
        &self.model
    }

    pub fn into_response(self) -> Response {
        self.response
    }

    pub async fn emit(&mut self, writer: &mut dyn ResponseWriter, request: &IncomingRequest) -> Result<(), EmitError> {
        let template = Template::parse(&self.html).map_err(|e| {
            error!(cause = %e, uri = %request.uri(), "parse html template failed");
            EmitError::from(e)
        })?;

        match template.render(&self.model) {
            Ok(html) => {
                if !self.response.has_header(header::CONTENT_TYPE.as_str()) {
                    self.response
                        .insert_header(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
                }
                self.response.set_content(html);
                self.response.emit(writer, request).await
            }
            Err(e) => {
                error!(cause = %e, uri = %request.uri(), "render html template failed");

                let headers = writer.headers_mut();
                headers.remove(header::CONTENT_LENGTH);
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
                headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
                writer.write_head(StatusCode::INTERNAL_SERVER_ERROR).await?;
                writer.write(format!("{e}\n").as_bytes()).await?;
                Ok(())
            }
        }
    }
}

impl Deref for HtmlResponse {
    type Target = Response;

    fn deref(&self) -> &Self::Target {
        &self.response
    }
}

impl DerefMut for HtmlResponse {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.response
    }
}
