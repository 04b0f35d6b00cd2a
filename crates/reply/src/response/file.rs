use super::{ReaderResponse, ReaderSource, Response};
use crate::EmitError;
use async_trait::async_trait;
use micro_reply_http::protocol::IncomingRequest;
use micro_reply_http::writer::ResponseWriter;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tracing::{error, trace};

/// A [`ReaderResponse`] over a file opened at emission.
///
/// The file is closed before `emit` returns, whatever the outcome.
#[derive(Debug)]
pub struct FileResponse {
    reader: ReaderResponse,
    path: PathBuf,
}

impl FileResponse {
    pub fn new(response: Response) -> Self {
        Self { reader: ReaderResponse::new(response), path: PathBuf::new() }
    }

    pub fn set_file(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    pub fn file(&self) -> &Path {
        &self.path
    }

    pub fn into_response(self) -> Response {
        self.reader.into_response()
    }

    pub async fn emit(&mut self, writer: &mut dyn ResponseWriter, request: &IncomingRequest) -> Result<(), EmitError> {
        let file = File::open(&self.path).await.map_err(|e| {
            error!(path = %self.path.display(), cause = %e, "open response file failed");
            EmitError::open(&self.path, e)
        })?;
        trace!(path = %self.path.display(), "opened response file");

        self.reader.set_source(Some(ReaderSource::seekable(file)));
        let result = self.reader.emit(writer, request).await;
        drop(self.reader.take_source());
        result
    }
}

impl Deref for FileResponse {
    type Target = ReaderResponse;

    fn deref(&self) -> &Self::Target {
        &self.reader
    }
}

impl DerefMut for FileResponse {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.reader
    }
}

#[async_trait]
impl crate::Responder for FileResponse {
    fn base(&self) -> Option<&Response> {
        Some(&self.reader.response)
    }

    fn base_mut(&mut self) -> Option<&mut Response> {
        Some(&mut self.reader.response)
    }

    async fn emit(&mut self, writer: &mut dyn ResponseWriter, request: &IncomingRequest) -> Result<(), EmitError> {
        FileResponse::emit(self, writer, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{BrokenWriter, get};
    use micro_reply_http::writer::ResponseRecorder;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[tokio::test]
    async fn streams_file_with_sniffed_type() {
        let content = "Hello, World!\n".repeat(64);
        let temp = temp_file(content.as_bytes());
        let mut file = Response::ok().file(temp.path());

        let mut recorder = ResponseRecorder::new();
        file.emit(&mut recorder, &get("/")).await.unwrap();

        assert_eq!(recorder.header("content-type"), Some("text/plain; charset=utf-8"));
        assert_eq!(recorder.body_string(), content);
        assert!(!file.has_source());
    }

    #[tokio::test]
    async fn explicit_content_type_wins() {
        let temp = temp_file(b"a,b\n1,2\n");
        let mut file = Response::ok().file(temp.path());
        file.set_content_type("text/csv").unwrap();
        file.set_header("content-disposition", "attachment", true).unwrap();

        let mut recorder = ResponseRecorder::new();
        file.emit(&mut recorder, &get("/")).await.unwrap();

        assert_eq!(recorder.header("content-type"), Some("text/csv"));
        assert_eq!(recorder.header("content-disposition"), Some("attachment"));
        assert_eq!(recorder.body_string(), "a,b\n1,2\n");
    }

    #[tokio::test]
    async fn missing_file_is_fatal_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = Response::ok().file(dir.path().join("absent.txt"));

        let mut recorder = ResponseRecorder::new();
        let result = file.emit(&mut recorder, &get("/")).await;

        assert!(matches!(result, Err(EmitError::Open { .. })));
        assert!(!recorder.is_head_written());
        assert!(recorder.body().is_empty());
    }

    #[tokio::test]
    async fn file_is_released_on_failure() {
        let temp = temp_file(b"bytes");
        let mut file = Response::ok().file(temp.path());

        let result = file.emit(&mut BrokenWriter::default(), &get("/")).await;
        assert!(matches!(result, Err(EmitError::Send { .. })));
        assert!(!file.has_source());
    }
}
