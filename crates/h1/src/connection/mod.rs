//! HTTP connection handling module
//!
//! Every connection carries exactly one request and one response. The read side is
//! framed by a [`RequestDecoder`](crate::codec::RequestDecoder); the write side is
//! driven through a [`ResponseWriter`], which rejects response sections written out
//! of order.
//!
//! # Components
//!
//! - [`HttpConnection`]: reads the request, runs the handler, answers parse failures
//!   with `400 Bad Request`, and closes the stream
//! - [`ResponseWriter`]: ordered, section-by-section response output, including
//!   chunked bodies with trailers
//! - [`ResponseSink`]: what a handler writes into; buffers a plain body or hands out
//!   the writer for full control

mod http_connection;
mod response_sink;
mod response_writer;

pub use http_connection::{ConnectionConfig, HttpConnection};
pub use response_sink::{Outbound, ResponseSink};
pub use response_writer::{ResponseWriter, default_headers};
