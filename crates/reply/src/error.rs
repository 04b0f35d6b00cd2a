use crate::template::TemplateError;
use micro_reply_http::protocol::SendError;
use std::error::Error;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a response.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("operation `{operation}` is not supported")]
    Unsupported { operation: &'static str },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ResponseError {
    pub fn invalid_argument<S: ToString>(name: &'static str, reason: S) -> Self {
        Self::InvalidArgument { name, reason: reason.to_string() }
    }

    pub fn unsupported(operation: &'static str) -> Self {
        Self::Unsupported { operation }
    }
}

/// A fatal failure during emission.
///
/// The in-flight response is aborted as soon as one is raised; whatever was
/// already written stays written and nothing is retried.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("send error: {source}")]
    Send {
        #[from]
        source: SendError,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("can not open `{}`: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("{format} encoding error: {reason}")]
    Encode { format: &'static str, reason: String },

    #[error("template error: {source}")]
    Template {
        #[from]
        source: TemplateError,
    },

    #[error("can not redirect with HTTP status code `{status}`")]
    RedirectStatus { status: u16 },

    #[error("reader can not seek back after sniffing its content type")]
    NotSeekable,

    #[error("response writer does not support flushing")]
    FlushUnsupported,

    #[error("handler error: {source}")]
    Handler { source: Box<dyn Error + Send + Sync> },
}

impl EmitError {
    pub fn encode<S: ToString>(format: &'static str, reason: S) -> Self {
        Self::Encode { format, reason: reason.to_string() }
    }

    pub fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Open { path: path.into(), source }
    }
}
