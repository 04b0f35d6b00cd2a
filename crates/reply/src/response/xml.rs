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

/// A response whose body is the XML encoding of a serde value.
///
/// The root element is named after the value's type, or its `#[serde(rename)]`.
/// Plain [`Content`] has no type name and is wrapped in `<string>`. Without
/// data the body is empty.
pub struct XmlResponse {
    response: Response,
    data: Option<Encode>,
}

impl XmlResponse {
    pub fn new(response: Response) -> Self {
        Self { response, data: None }
    }

    pub fn set_content<T>(&mut self, data: T)
    where
        T: Serialize + Send + Sync + 'static,
    {
        self.data = Some(Box::new(move || {
            quick_xml::se::to_string(&data).map(String::into_bytes).map_err(|e| e.to_string())
        }));
    }

    pub(crate) fn set_base_content(&mut self, content: Content) {
        self.data = Some(Box::new(move || {
            quick_xml::se::to_string_with_root("string", &content)
                .map(String::into_bytes)
                .map_err(|e| e.to_string())
        }));
    }

    pub fn clear_content(&mut self) {
        self.data = None;
    }

    pub fn into_response(self) -> Response {
        self.response
    }

    pub async fn emit(&mut self, writer: &mut dyn ResponseWriter, request: &IncomingRequest) -> Result<(), EmitError> {
        let body = match &self.data {
            Some(encode) => encode().map_err(|reason| {
                error!(cause = %reason, "xml encoding failed");
                EmitError::encode("xml", reason)
            })?,
            None => Vec::new(),
        };

        self.response.set_content(Bytes::from(body));
        self.response.insert_header(header::CONTENT_TYPE, HeaderValue::from_static("application/xml"));
        self.response.emit(writer, request).await
    }
}

impl Deref for XmlResponse {
    type Target = Response;

    fn deref(&self) -> &Self::Target {
        &self.response
    }
}

impl DerefMut for XmlResponse {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.response
    }
}

impl fmt::Debug for XmlResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlResponse")
            .field("response", &self.response)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}

#[async_trait]
impl crate::Responder for XmlResponse {
    fn base(&self) -> Option<&Response> {
        Some(&self.response)
    }

    fn base_mut(&mut self) -> Option<&mut Response> {
        Some(&mut self.response)
    }

    async fn emit(&mut self, writer: &mut dyn ResponseWriter, request: &IncomingRequest) -> Result<(), EmitError> {
        XmlResponse::emit(self, writer, request).await
    }

    fn set_content(&mut self, content: Content) -> Result<(), ResponseError> {
        self.set_base_content(content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::get;
    use micro_reply_http::writer::ResponseRecorder;
    use serde::ser::Error as _;

    #[derive(Serialize)]
    #[serde(rename = "struct")]
    struct Person {
        #[serde(rename = "Name")]
        name: String,
        #[serde(rename = "Age")]
        age: u32,
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("functions can not be encoded"))
        }
    }

    #[tokio::test]
    async fn encodes_struct_under_its_tag() {
        let mut xml = Response::ok().xml(Person { name: "John".to_owned(), age: 30 });
        let mut recorder = ResponseRecorder::new();
        xml.emit(&mut recorder, &get("/")).await.unwrap();

        assert_eq!(recorder.body_string(), "<struct><Name>John</Name><Age>30</Age></struct>");
        assert_eq!(recorder.header("content-type"), Some("application/xml"));
    }

    #[tokio::test]
    async fn absent_data_is_empty() {
        let mut recorder = ResponseRecorder::new();
        Response::ok().into_xml().emit(&mut recorder, &get("/")).await.unwrap();

        assert!(recorder.body().is_empty());
        assert_eq!(recorder.header("content-type"), Some("application/xml"));
    }

    #[tokio::test]
    async fn base_content_is_kept() {
        let mut xml = Response::with_content(200, "Tom & Jerry").unwrap().into_xml();
        let mut recorder = ResponseRecorder::new();
        xml.emit(&mut recorder, &get("/")).await.unwrap();

        assert_eq!(recorder.body_string(), "<string>Tom &amp; Jerry</string>");
        assert_eq!(recorder.header("content-type"), Some("application/xml"));
    }

    #[tokio::test]
    async fn responder_content_is_wrapped() {
        let mut xml = Response::ok().xml(1);
        crate::Responder::set_content(&mut xml, Content::from("hi")).unwrap();

        let mut recorder = ResponseRecorder::new();
        xml.emit(&mut recorder, &get("/")).await.unwrap();
        assert_eq!(recorder.body_string(), "<string>hi</string>");
    }

    #[tokio::test]
    async fn encoding_failure_is_fatal() {
        let mut xml = Response::ok().xml(Unserializable);
        let mut recorder = ResponseRecorder::new();

        let result = xml.emit(&mut recorder, &get("/")).await;
        assert!(matches!(result, Err(EmitError::Encode { format: "xml", .. })));
        assert!(!recorder.is_head_written());
    }
}
