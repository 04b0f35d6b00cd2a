//! Response payload framing.
//!
//! ## Encoders
//! - [`ChunkedEncoder`](chunked_encoder::ChunkedEncoder): chunked transfer encoding (RFC 9112)
//! - [`LengthEncoder`](length_encoder::LengthEncoder): content-length bounded payloads
//! - [`PayloadEncoder`]: selects one of the above, or none for bodiless statuses

mod chunked_encoder;
mod length_encoder;
mod payload_encoder;

pub use payload_encoder::PayloadEncoder;
