use bytes::{Buf, Bytes};

/// A response message fed to the response encoder: either the head or a payload item.
///
/// The generic parameter `T` is the head type, while `Data` is the type of the
/// payload data (defaults to `Bytes`).
pub enum Message<T, Data: Buf = Bytes> {
    /// Contains the head of the response
    Header(T),
    /// Contains a chunk of payload data or EOF marker
    Payload(PayloadItem<Data>),
}

/// Represents an item in the HTTP message payload stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf = Bytes> {
    /// A chunk of payload data
    Chunk(Data),
    /// Marks the end of the payload stream
    Eof,
}

/// How the payload of a response is framed on the wire.
///
/// - Known length: exactly `n` bytes follow the head
/// - Chunked: chunked transfer encoding
/// - Empty: the status forbids a body
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadSize {
    /// Payload with known length in bytes
    Length(u64),
    /// Payload using chunked transfer encoding
    Chunked,
    /// Empty payload (no body)
    Empty,
}
