use super::Response;
use crate::EmitError;
use http::header::{self, HeaderValue};
use micro_reply_http::protocol::IncomingRequest;
use micro_reply_http::writer::ResponseWriter;
use std::ops::{Deref, DerefMut};
use tracing::{debug, error};

/// A response redirecting the client to another location.
///
/// The status code must be a redirection (`300..=308`) when the response is
/// emitted. An empty location redirects to `/`; a relative one is resolved
/// against the directory of the request path.
#[derive(Debug)]
pub struct RedirectResponse {
    pub(crate) response: Response,
    location: String,
}

impl RedirectResponse {
    pub fn new(response: Response) -> Self {
        Self { response, location: String::new() }
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn into_response(self) -> Response {
        self.response
    }

    pub async fn emit(&mut self, writer: &mut dyn ResponseWriter, request: &IncomingRequest) -> Result<(), EmitError> {
        let status = self.response.status_code();
        if !(300..=308).contains(&status.as_u16()) {
            error!(status = status.as_u16(), "redirect with a non redirection status code");
            return Err(EmitError::RedirectStatus { status: status.as_u16() });
        }

        let location = resolve_location(&self.location, request.uri().path());
        let value = HeaderValue::from_str(&location).map_err(|e| {
            error!(location = %location, cause = %e, "invalid redirect location");
            EmitError::encode("location", e)
        })?;
        debug!(status = status.as_u16(), location = %location, "redirect");

        self.response.apply_headers(writer);
        writer.headers_mut().insert(header::LOCATION, value);
        writer.write_head(status).await?;
        Ok(())
    }
}

impl Deref for RedirectResponse {
    type Target = Response;

    fn deref(&self) -> &Self::Target {
        &self.response
    }
}

impl DerefMut for RedirectResponse {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.response
    }
}

/// Resolves `location` against `request_path`, leaving URLs with a scheme or an authority untouched.
fn resolve_location(location: &str, request_path: &str) -> String {
    if location.is_empty() {
        return "/".to_owned();
    }
    if has_scheme(location) || location.starts_with("//") {
        return location.to_owned();
    }

    let mut target = if location.starts_with('/') {
        location.to_owned()
    } else {
        let dir = match request_path.rfind('/') {
            Some(i) => &request_path[..=i],
            None => "/",
        };
        format!("{dir}{location}")
    };

    let query = match target.find('?') {
        Some(i) => target.split_off(i),
        None => String::new(),
    };

    let trailing = target.ends_with('/');
    let mut cleaned = clean_path(&target);
    if trailing && !cleaned.ends_with('/') {
        cleaned.push('/');
    }
    cleaned.push_str(&query);
    cleaned
}

fn has_scheme(location: &str) -> bool {
    let Some(end) = location.find(':') else {
        return false;
    };
    let scheme = &location[..end];
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Lexically removes `.` and `..` segments and repeated slashes from a rooted path.
fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }

    let mut cleaned = String::with_capacity(path.len());
    for segment in &segments {
        cleaned.push('/');
        cleaned.push_str(segment);
    }
    if cleaned.is_empty() {
        cleaned.push('/');
    }
    cleaned
}
