//! HTTP response head type.
//!
//! It uses the standard `http::Response` type with an empty body placeholder
//! to represent the status line and headers before any body bytes are written.

use http::Response;

/// Type alias for the status line and headers of a response.
pub type ResponseHead = Response<()>;
