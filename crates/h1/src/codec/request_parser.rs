//! Incremental request parser.
//!
//! [`RequestParser::parse`] is fed the unconsumed part of a read buffer and reports how
//! many bytes it consumed. It never waits for input: when a line is incomplete it simply
//! consumes nothing, and the caller reads more bytes, slides its buffer by the consumed
//! count and calls `parse` again. Feeding a request one byte per call produces the same
//! [`Request`] as feeding it all at once.
//!
//! # States
//!
//! ```text
//! Init --request line--> Headers --empty line--> Body --Content-Length bytes--> Done
//!                                           \--(no Content-Length)------------> Done
//! any state --malformed input--> Error
//! ```
//!
//! Each stage owns the data gathered so far, so a request can only be observed once it
//! is complete. Transitions never go backwards; a parser in `Error` answers every later
//! call with [`ParseError::InErrorState`].

use std::mem;

use bytes::{Bytes, BytesMut};
use http::Method;
use tracing::trace;

use crate::ensure;
use crate::protocol::{Headers, ParseError, Request, RequestLine, find_crlf, is_token_char};

/// Maximum size in bytes of the request line plus header section
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Maximum accepted `Content-Length`
const MAX_BODY_BYTES: usize = 1024 * 1024;

const CRLF_LEN: usize = 2;

/// Size limits applied while parsing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParserLimits {
    pub max_header_bytes: usize,
    pub max_body_bytes: usize,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self { max_header_bytes: MAX_HEADER_BYTES, max_body_bytes: MAX_BODY_BYTES }
    }
}

/// Observable parser state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParserState {
    Init,
    Headers,
    Body,
    Done,
    Error,
}

#[derive(Debug)]
enum Stage {
    RequestLine,
    Headers { line: RequestLine, headers: Headers },
    Body { line: RequestLine, headers: Headers, body: BytesMut, remaining: usize },
    Done(Request),
    Error,
}

#[derive(Debug)]
pub struct RequestParser {
    stage: Stage,
    limits: ParserLimits,
    /// bytes consumed by the request line and header section so far
    head_bytes: usize,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    pub fn new() -> Self {
        Self::with_limits(ParserLimits::default())
    }

    pub fn with_limits(limits: ParserLimits) -> Self {
        Self { stage: Stage::RequestLine, limits, head_bytes: 0 }
    }

    pub fn state(&self) -> ParserState {
        match self.stage {
            Stage::RequestLine => ParserState::Init,
            Stage::Headers { .. } => ParserState::Headers,
            Stage::Body { .. } => ParserState::Body,
            Stage::Done(_) => ParserState::Done,
            Stage::Error => ParserState::Error,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.stage, Stage::Done(_))
    }

    /// Returns the request once parsing reached `Done`.
    pub fn request(&self) -> Option<&Request> {
        match &self.stage {
            Stage::Done(request) => Some(request),
            _ => None,
        }
    }

    /// Consumes the parser, returning the request if parsing reached `Done`.
    pub fn into_request(self) -> Option<Request> {
        match self.stage {
            Stage::Done(request) => Some(request),
            _ => None,
        }
    }

    /// Advances the state machine over `buf`, returning how many leading bytes were consumed.
    ///
    /// `buf` must start at the first byte not consumed by the previous call. A return of `0`
    /// means more input is needed (or the request is already done).
    ///
    /// # Errors
    ///
    /// Any [`ParseError`] moves the parser to [`ParserState::Error`] for good.
    pub fn parse(&mut self, buf: &[u8]) -> Result<usize, ParseError> {
        let mut consumed = 0;

        loop {
            let rest = &buf[consumed..];
            // a failing step leaves `Stage::Error` behind
            let (next, step) = match mem::replace(&mut self.stage, Stage::Error) {
                Stage::Error => return Err(ParseError::InErrorState),
                done @ Stage::Done(_) => (done, 0),
                Stage::RequestLine => self.parse_request_line(rest)?,
                Stage::Headers { line, headers } => self.parse_header_line(rest, line, headers)?,
                Stage::Body { line, headers, body, remaining } => read_body(rest, line, headers, body, remaining),
            };

            self.stage = next;
            consumed += step;

            if step == 0 || self.is_done() {
                return Ok(consumed);
            }
        }
    }

    fn parse_request_line(&mut self, buf: &[u8]) -> Result<(Stage, usize), ParseError> {
        let Some(line_end) = find_crlf(buf) else {
            ensure!(buf.len() <= self.limits.max_header_bytes, ParseError::too_large_header(buf.len(), self.limits.max_header_bytes));
            return Ok((Stage::RequestLine, 0));
        };

        let line = request_line(&buf[..line_end])?;
        trace!(method = %line.method(), target = line.target(), "parsed request line");

        let step = line_end + CRLF_LEN;
        self.count_head_bytes(step)?;
        Ok((Stage::Headers { line, headers: Headers::new() }, step))
    }

    fn parse_header_line(&mut self, buf: &[u8], line: RequestLine, mut headers: Headers) -> Result<(Stage, usize), ParseError> {
        let (step, done) = headers.parse(buf)?;
        if step == 0 {
            let pending = self.head_bytes + buf.len();
            ensure!(pending <= self.limits.max_header_bytes, ParseError::too_large_header(pending, self.limits.max_header_bytes));
            return Ok((Stage::Headers { line, headers }, 0));
        }

        self.count_head_bytes(step)?;
        if !done {
            return Ok((Stage::Headers { line, headers }, step));
        }

        trace!(header_count = headers.len(), head_bytes = self.head_bytes, "parsed header section");
        let next = match body_length(&headers, self.limits.max_body_bytes)? {
            0 => Stage::Done(Request::new(line, headers, Bytes::new())),
            length => Stage::Body { line, headers, body: BytesMut::with_capacity(length), remaining: length },
        };
        Ok((next, step))
    }

    fn count_head_bytes(&mut self, step: usize) -> Result<(), ParseError> {
        self.head_bytes += step;
        ensure!(
            self.head_bytes <= self.limits.max_header_bytes,
            ParseError::too_large_header(self.head_bytes, self.limits.max_header_bytes)
        );
        Ok(())
    }
}

/// Splits `METHOD SP target SP HTTP/1.1` on single spaces.
fn request_line(line: &[u8]) -> Result<RequestLine, ParseError> {
    let mut fields = line.split(|b| *b == b' ');
    let (Some(method), Some(target), Some(protocol), None) = (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(ParseError::MalformedRequestLine);
    };

    ensure!(!method.is_empty() && method.iter().copied().all(is_token_char), ParseError::MalformedRequestLine);
    ensure!(!target.is_empty(), ParseError::MalformedRequestLine);

    let version = protocol.strip_prefix(b"HTTP/").ok_or(ParseError::MalformedRequestLine)?;
    // HTTP/1.0 and HTTP/2 semantics are not supported
    ensure!(version == b"1.1", ParseError::MalformedRequestLine);

    let method = Method::from_bytes(method).map_err(|_| ParseError::MalformedRequestLine)?;
    let target = String::from_utf8(target.to_vec()).map_err(|_| ParseError::MalformedRequestLine)?;

    Ok(RequestLine::new(method, target))
}

/// Number of body bytes announced by the header section.
fn body_length(headers: &Headers, max_body_bytes: usize) -> Result<usize, ParseError> {
    if headers.contains("transfer-encoding") {
        return Err(ParseError::unsupported_transfer_encoding(headers.get("transfer-encoding")));
    }

    if !headers.contains("content-length") {
        return Ok(0);
    }

    let value = headers.get("content-length");
    let length = value.parse::<usize>().map_err(|_| ParseError::invalid_content_length(format!("value {value} is not usize")))?;
    ensure!(length <= max_body_bytes, ParseError::too_large_body(length, max_body_bytes));

    Ok(length)
}

fn read_body(buf: &[u8], line: RequestLine, headers: Headers, mut body: BytesMut, remaining: usize) -> (Stage, usize) {
    let step = remaining.min(buf.len());
    body.extend_from_slice(&buf[..step]);

    let remaining = remaining - step;
    if remaining == 0 {
        trace!(body_size = body.len(), "read request body");
        return (Stage::Done(Request::new(line, headers, body.freeze())), step);
    }

    (Stage::Body { line, headers, body, remaining }, step)
}
