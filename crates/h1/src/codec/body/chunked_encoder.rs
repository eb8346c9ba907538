use std::io::Write;

use bytes::BytesMut;
use tokio_util::codec::Encoder;
use tracing::trace;

use crate::codec::header::FastWrite;
use crate::protocol::SendError;

/// Frames body bytes as `transfer-encoding: chunked` chunks.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChunkedEncoder {
    send_size: usize,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total payload bytes framed so far, excluding chunk-size lines.
    pub fn send_size(&self) -> usize {
        self.send_size
    }

    /// Writes the zero-length last chunk, `0\r\n`.
    ///
    /// The empty line that ends the chunked body follows the trailer section, if any.
    pub fn encode_last(&mut self, dst: &mut BytesMut) {
        trace!(send_size = self.send_size, "finished chunked body");
        dst.extend_from_slice(b"0\r\n");
    }
}

impl<'a> Encoder<&'a [u8]> for ChunkedEncoder {
    type Error = SendError;

    fn encode(&mut self, bytes: &'a [u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        // an empty chunk would read as the last chunk
        if bytes.is_empty() {
            return Ok(());
        }

        write!(FastWrite(dst), "{:x}\r\n", bytes.len())?;
        dst.reserve(bytes.len() + 2);
        dst.extend_from_slice(bytes);
        dst.extend_from_slice(b"\r\n");
        self.send_size += bytes.len();
        Ok(())
    }
}
