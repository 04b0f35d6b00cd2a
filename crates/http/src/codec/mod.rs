//! Response encoding.
//!
//! The encoders serialize a response into raw HTTP/1.1 bytes:
//!
//! - [`ResponseEncoder`]: drives a whole response, head first then payload items
//! - [`HeaderEncoder`]: status line plus header block, fixing up framing headers
//! - [`PayloadEncoder`]: content-length, chunked or empty payload framing
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use http::Response;
//! use micro_reply_http::codec::ResponseEncoder;
//! use micro_reply_http::protocol::{Message, PayloadItem, PayloadSize};
//! use tokio_util::codec::Encoder;
//!
//! let mut encoder = ResponseEncoder::new();
//! let mut dst = BytesMut::new();
//!
//! let head = Response::new(());
//! encoder.encode(Message::<_, &[u8]>::Header((head, PayloadSize::Length(2))), &mut dst).unwrap();
//! encoder.encode(Message::<_, &[u8]>::Payload(PayloadItem::Chunk(&b"ok"[..])), &mut dst).unwrap();
//!
//! assert!(dst.ends_with(b"\r\n\r\nok"));
//! ```

mod body;
mod header;
mod response_encoder;

pub use body::PayloadEncoder;
pub use header::HeaderEncoder;
pub use response_encoder::ResponseEncoder;
