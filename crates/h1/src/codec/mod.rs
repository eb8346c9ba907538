//! HTTP codec module for decoding requests and encoding responses
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`RequestParser`]: the incremental request state machine over a byte slice
//!   - [`RequestDecoder`]: drives the parser from a `tokio_util` framed read buffer
//!
//! - Response handling:
//!   - [`ResponseEncoder`]: encodes response sections, rejecting out-of-order ones
//!   - Status line and header encoding via the `header` module
//!   - Chunked body framing via the `body` module
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use http::StatusCode;
//! use micro_h1::codec::ResponseEncoder;
//! use micro_h1::protocol::{Headers, ResponsePart};
//! use tokio_util::codec::Encoder;
//!
//! let mut encoder = ResponseEncoder::new();
//! let mut buffer = BytesMut::new();
//! encoder.encode(ResponsePart::StatusLine(StatusCode::OK), &mut buffer).unwrap();
//! encoder.encode(ResponsePart::Headers(&Headers::new()), &mut buffer).unwrap();
//! encoder.encode(ResponsePart::Body(b"hi"), &mut buffer).unwrap();
//! assert_eq!(&buffer[..], b"HTTP/1.1 200 OK\r\n\r\nhi");
//! ```

mod body;
mod header;
mod request_decoder;
mod request_parser;
mod response_encoder;

pub use body::ChunkedEncoder;
pub use header::HeaderEncoder;
pub use request_decoder::RequestDecoder;
pub use request_parser::{ParserLimits, ParserState, RequestParser};
pub use response_encoder::ResponseEncoder;
