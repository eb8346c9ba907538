//! Response encoder enforcing HTTP/1.1 section order.
//!
//! Every [`ResponsePart`] may only be encoded in one [`WriterState`]. A part fed out
//! of order is rejected with a [`SendError`] naming the section involved, and neither
//! the state nor the destination buffer is touched.
//!
//! ```text
//! Status --StatusLine--> Headers --Headers--> Body --Body--------------------------> Done
//!                                              |--Chunk (repeatable)--> Body
//!                                              \--LastChunk--> Trailers --Trailers|End--> Done
//! ```

use bytes::BytesMut;
use tokio_util::codec::Encoder;
use tracing::warn;

use crate::codec::body::ChunkedEncoder;
use crate::codec::header::HeaderEncoder;
use crate::protocol::{ResponsePart, SendError, WriterState};

#[derive(Debug)]
pub struct ResponseEncoder {
    state: WriterState,
    header_encoder: HeaderEncoder,
    chunked_encoder: ChunkedEncoder,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn state(&self) -> WriterState {
        self.state
    }
}

impl Default for ResponseEncoder {
    fn default() -> Self {
        Self { state: WriterState::Status, header_encoder: HeaderEncoder, chunked_encoder: ChunkedEncoder::new() }
    }
}

impl<'a> Encoder<ResponsePart<'a>> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: ResponsePart<'a>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let required = item.required_state();
        if self.state != required {
            warn!(current = %self.state, required = %required, "response part out of order");
            return Err(SendError::out_of_order(required, self.state));
        }

        match item {
            ResponsePart::StatusLine(status) => self.header_encoder.encode(status, dst)?,
            ResponsePart::Headers(headers) | ResponsePart::Trailers(headers) => self.header_encoder.encode(headers, dst)?,
            ResponsePart::Body(bytes) => dst.extend_from_slice(bytes),
            ResponsePart::Chunk(bytes) => self.chunked_encoder.encode(bytes, dst)?,
            ResponsePart::LastChunk => self.chunked_encoder.encode_last(dst),
            ResponsePart::End => dst.extend_from_slice(b"\r\n"),
        }

        self.state = item.next_state();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Headers;
    use http::StatusCode;

    fn headers(pairs: &[(&str, &str)]) -> Headers {
        let mut headers = Headers::new();
        for (name, value) in pairs {
            headers.set(name, value);
        }
        headers
    }

    /// Reassembles a chunked body, returning the payload and the bytes after the last chunk.
    fn dechunk(mut wire: &[u8]) -> (Vec<u8>, &[u8]) {
        let mut payload = Vec::new();
        loop {
            let line_end = wire.windows(2).position(|w| w == b"\r\n").unwrap();
            let size = usize::from_str_radix(std::str::from_utf8(&wire[..line_end]).unwrap(), 16).unwrap();
            wire = &wire[line_end + 2..];
            if size == 0 {
                return (payload, wire);
            }
            payload.extend_from_slice(&wire[..size]);
            assert_eq!(&wire[size..size + 2], b"\r\n");
            wire = &wire[size + 2..];
        }
    }

    #[test]
    fn full_body_response() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();

        encoder.encode(ResponsePart::StatusLine(StatusCode::OK), &mut dst).unwrap();
        encoder.encode(ResponsePart::Headers(&headers(&[("Content-Length", "5")])), &mut dst).unwrap();
        encoder.encode(ResponsePart::Body(b"hello"), &mut dst).unwrap();

        assert_eq!(&dst[..], b"HTTP/1.1 200 OK\r\ncontent-length: 5\r\n\r\nhello");
        assert_eq!(encoder.state(), WriterState::Done);
    }

    #[test]
    fn distinct_ordering_errors() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();

        let headers_first = encoder.encode(ResponsePart::Headers(&Headers::new()), &mut dst).unwrap_err();
        assert!(matches!(headers_first, SendError::Missing(WriterState::Status)));
        assert_eq!(headers_first.to_string(), "missing status line");

        encoder.encode(ResponsePart::StatusLine(StatusCode::OK), &mut dst).unwrap();

        let body_first = encoder.encode(ResponsePart::Body(b"x"), &mut dst).unwrap_err();
        assert!(matches!(body_first, SendError::Missing(WriterState::Headers)));
        assert_eq!(body_first.to_string(), "missing headers");

        let second_status = encoder.encode(ResponsePart::StatusLine(StatusCode::OK), &mut dst).unwrap_err();
        assert!(matches!(second_status, SendError::AlreadyWritten(WriterState::Status)));
        assert_eq!(second_status.to_string(), "status line already written");
    }

    #[test]
    fn rejected_parts_change_nothing() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();

        assert!(encoder.encode(ResponsePart::Chunk(b"abc"), &mut dst).is_err());
        assert!(encoder.encode(ResponsePart::Trailers(&Headers::new()), &mut dst).is_err());

        assert!(dst.is_empty());
        assert_eq!(encoder.state(), WriterState::Status);
    }

    #[test]
    fn chunks_then_last_chunk() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();
        encoder.encode(ResponsePart::StatusLine(StatusCode::OK), &mut dst).unwrap();
        encoder.encode(ResponsePart::Headers(&headers(&[("Transfer-Encoding", "chunked")])), &mut dst).unwrap();
        dst.clear();

        encoder.encode(ResponsePart::Chunk(b"abc"), &mut dst).unwrap();
        encoder.encode(ResponsePart::Chunk(b"de"), &mut dst).unwrap();
        assert_eq!(encoder.state(), WriterState::Body);

        encoder.encode(ResponsePart::LastChunk, &mut dst).unwrap();
        assert_eq!(encoder.state(), WriterState::Trailers);
        encoder.encode(ResponsePart::End, &mut dst).unwrap();

        assert_eq!(&dst[..], b"3\r\nabc\r\n2\r\nde\r\n0\r\n\r\n");
        assert_eq!(encoder.state(), WriterState::Done);

        let (payload, rest) = dechunk(&dst);
        assert_eq!(payload, b"abcde");
        assert_eq!(rest, b"\r\n");
    }

    #[test]
    fn trailers_follow_the_last_chunk() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();
        encoder.encode(ResponsePart::StatusLine(StatusCode::OK), &mut dst).unwrap();
        encoder.encode(ResponsePart::Headers(&headers(&[("Trailer", "X-Content-Length")])), &mut dst).unwrap();
        dst.clear();

        let chunks: [&[u8]; 3] = [b"The quick brown fox ", b"jumps over ", b"the lazy dog"];
        for chunk in chunks {
            encoder.encode(ResponsePart::Chunk(chunk), &mut dst).unwrap();
        }
        encoder.encode(ResponsePart::LastChunk, &mut dst).unwrap();
        encoder.encode(ResponsePart::Trailers(&headers(&[("X-Content-Length", "43")])), &mut dst).unwrap();

        let (payload, rest) = dechunk(&dst);
        assert_eq!(payload, chunks.concat());
        assert_eq!(rest, b"x-content-length: 43\r\n\r\n");

        let late = encoder.encode(ResponsePart::Chunk(b"more"), &mut dst).unwrap_err();
        assert!(matches!(late, SendError::AlreadyWritten(WriterState::Body)));
    }

    #[test]
    fn trailers_need_a_finished_chunked_body() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();
        encoder.encode(ResponsePart::StatusLine(StatusCode::OK), &mut dst).unwrap();
        encoder.encode(ResponsePart::Headers(&Headers::new()), &mut dst).unwrap();

        let result = encoder.encode(ResponsePart::Trailers(&Headers::new()), &mut dst);

        assert!(matches!(result, Err(SendError::Missing(WriterState::Body))));
    }
}
