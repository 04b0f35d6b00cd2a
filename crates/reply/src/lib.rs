//! Build HTTP responses and emit them onto a response writer.
//!
//! A handler assembles a [`Response`] (status, headers, cookies and content),
//! optionally converts it into one of the typed variants, and the transport
//! calls `emit` exactly once:
//!
//! ```no_run
//! use http::Request;
//! use micro_reply::Response;
//! use micro_reply_http::protocol::IncomingRequest;
//! use micro_reply_http::writer::WireWriter;
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let request = IncomingRequest::from(Request::get("/").body(())?);
//! let mut writer = WireWriter::new(tokio::io::stdout());
//!
//! let mut response = Response::new(201)?.json(json!({ "id": 7 }));
//! response.set_header("x-request-id", "42", true)?;
//! response.emit(&mut writer, &request).await?;
//! writer.finish().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Variants
//!
//! - [`JsonResponse`] / [`XmlResponse`]: serde values encoded at emission
//! - [`ReaderResponse`] / [`FileResponse`]: bytes copied from a reader or a file,
//!   content type sniffed when not given
//! - [`RedirectResponse`]: `Location` header with a 3xx status
//! - [`StreamedResponse`]: body produced step by step, skipped for cancelled requests
//! - [`HtmlResponse`]: a [`template`] rendered against a key/value model
//! - [`HandlerAdapter`]: an external [`Handler`](micro_reply_http::handler::Handler)
//!   behind the same [`Responder`] surface
//!
//! # Errors
//!
//! Mutations fail with [`ResponseError`]. Anything going wrong during emission is a
//! fatal [`EmitError`] that aborts the in-flight response; the only failure that is
//! recovered locally is a template render error, which becomes a `500` response.

mod adapter;
mod content;
mod error;
mod responder;
mod response;

pub mod sniff;
pub mod template;

pub use adapter::HandlerAdapter;
pub use content::Content;
pub use cookie::Cookie;
pub use error::EmitError;
pub use error::ResponseError;
pub use responder::Responder;
pub use response::COPY_BUF_SIZE;
pub use response::FileResponse;
pub use response::HtmlResponse;
pub use response::JsonResponse;
pub use response::ReaderResponse;
pub use response::ReaderSource;
pub use response::RedirectResponse;
pub use response::Response;
pub use response::SeekableSource;
pub use response::Step;
pub use response::StreamedResponse;
pub use response::XmlResponse;

#[cfg(test)]
mod test_util;
