//! Core protocol types shared by the writers and encoders.
//!
//! - **Message Handling** (`message`): header/payload messages fed to the encoders
//!   - [`Message`]: Represents either a response head or a payload chunk
//!   - [`PayloadItem`]: A single payload chunk or the EOF marker
//!   - [`PayloadSize`]: How the payload is framed on the wire
//!
//! - **Request** (`request`): the request a response is emitted for
//!   - [`IncomingRequest`]: request head plus its cancellation signal
//!
//! - **Response** (`response`): [`ResponseHead`], the status line and headers
//!
//! - **Error Handling** (`error`): [`SendError`]

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod request;
pub use request::IncomingRequest;

mod response;
pub use response::ResponseHead;

mod error;
pub use error::SendError;
