//! HTTP request decoder module
//!
//! [`RequestDecoder`] plugs the [`RequestParser`] into `tokio_util`'s framing: a
//! `FramedRead` owns the read buffer, fills it from the socket, and calls
//! [`Decoder::decode`] on the filled region. The decoder advances the buffer by the
//! number of bytes the parser consumed, so the unconsumed tail is compacted to the
//! front before the next read.
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use micro_h1::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from(&b"GET / HTTP/1.1\r\nHo"[..]);
//! assert!(decoder.decode(&mut buffer).unwrap().is_none());
//!
//! buffer.extend_from_slice(b"st: localhost\r\n\r\n");
//! let request = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(request.headers().get("host"), "localhost");
//! ```

use std::io;
use std::io::ErrorKind;
use std::mem;

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::{ParserLimits, ParserState, RequestParser};
use crate::protocol::{ParseError, Request};

/// A decoder yielding one [`Request`] per complete message in the buffer.
///
/// After a request is yielded the decoder starts over with a fresh parser, so a
/// second message in the same buffer would be decoded as a new request.
#[derive(Debug, Default)]
pub struct RequestDecoder {
    parser: RequestParser,
    limits: ParserLimits,
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` instance
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_limits(limits: ParserLimits) -> Self {
        Self { parser: RequestParser::with_limits(limits), limits }
    }

    pub fn state(&self) -> ParserState {
        self.parser.state()
    }
}

impl Decoder for RequestDecoder {
    type Item = Request;
    type Error = ParseError;

    /// Attempts to decode an HTTP request from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(request))`: the request line, headers and body are complete
    /// - `Ok(None)`: need more data to proceed
    /// - `Err(_)`: encountered a parsing error
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let consumed = self.parser.parse(src)?;
        src.advance(consumed);
        trace!(consumed, remaining = src.len(), state = ?self.parser.state(), "decode request");

        if !self.parser.is_done() {
            return Ok(None);
        }

        let parser = mem::replace(&mut self.parser, RequestParser::with_limits(self.limits));
        Ok(parser.into_request())
    }

    /// Like [`decode`](Self::decode), but the stream has ended: a partially read
    /// request is an unexpected EOF.
    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(request) => Ok(Some(request)),
            None if buf.is_empty() && self.parser.state() == ParserState::Init => Ok(None),
            None => Err(ParseError::io(io::Error::from(ErrorKind::UnexpectedEof))),
        }
    }
}
