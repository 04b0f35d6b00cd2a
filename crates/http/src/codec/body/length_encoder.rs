use crate::ensure;
use crate::protocol::{PayloadItem, SendError};
use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthEncoder {
    length: u64,
}

impl LengthEncoder {
    pub fn new(length: u64) -> Self {
        Self { length }
    }

    pub fn is_finish(&self) -> bool {
        self.length == 0
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for LengthEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            PayloadItem::Chunk(bytes) => {
                if !bytes.has_remaining() {
                    return Ok(());
                }
                let size = bytes.remaining() as u64;
                ensure!(
                    size <= self.length,
                    SendError::invalid_body(format!("{size} bytes exceed the remaining content-length {}", self.length))
                );
                dst.extend_from_slice(bytes.chunk());
                self.length -= size;
                Ok(())
            }
            PayloadItem::Eof => {
                if self.length != 0 {
                    warn!(missing = self.length, "payload finished before reaching content-length");
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_up_to_length() {
        let mut encoder = LengthEncoder::new(5);
        let mut dst = BytesMut::new();

        encoder.encode(PayloadItem::Chunk(&b"Hel"[..]), &mut dst).unwrap();
        assert!(!encoder.is_finish());
        encoder.encode(PayloadItem::Chunk(&b"lo"[..]), &mut dst).unwrap();
        assert!(encoder.is_finish());

        assert_eq!(&dst[..], b"Hello");
    }

    #[test]
    fn rejects_overflowing_chunk() {
        let mut encoder = LengthEncoder::new(2);
        let mut dst = BytesMut::new();

        let result = encoder.encode(PayloadItem::Chunk(&b"Hello"[..]), &mut dst);
        assert!(matches!(result, Err(SendError::InvalidBody { .. })));
        assert!(dst.is_empty());
    }
}
