//! Response head encoding.
//!
//! - [`HeaderEncoder`]: Encodes the status line and header block to bytes
//!   - Implements standard HTTP/1.1 header formatting
//!   - Manages content-length and transfer-encoding headers

mod header_encoder;

pub use header_encoder::HeaderEncoder;
