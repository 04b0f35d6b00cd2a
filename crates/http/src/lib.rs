//! The wire-level side of micro-reply.
//!
//! This crate provides the pieces a response needs in order to reach a client:
//! a [`writer::ResponseWriter`] sink that accepts a header map, a status line and
//! body bytes, the [`protocol::IncomingRequest`] a response is emitted for, and
//! the HTTP/1.1 encoders that serialize everything onto an `AsyncWrite`.
//!
//! # Example
//!
//! ```no_run
//! use http::StatusCode;
//! use micro_reply_http::writer::{ResponseWriter, WireWriter};
//!
//! # async fn run() -> Result<(), micro_reply_http::protocol::SendError> {
//! let mut writer = WireWriter::new(tokio::io::stdout());
//! writer.headers_mut().insert(http::header::CONTENT_TYPE, "text/plain".parse().unwrap());
//! writer.write_head(StatusCode::OK).await?;
//! writer.write(b"Hello World!\r\n").await?;
//! writer.finish().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: request head, payload framing types and error types
//! - [`codec`]: status line, header block and payload encoders
//! - [`writer`]: the [`writer::ResponseWriter`] trait and its implementations
//! - [`handler`]: the trait implemented by externally supplied request handlers
//!
//! # Limitations
//!
//! - HTTP/1.1 only
//! - No request parsing; the transport hands over an already parsed request head

pub mod codec;
pub mod handler;
pub mod protocol;
pub mod writer;

mod utils;
pub(crate) use utils::ensure;
