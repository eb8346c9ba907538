//! A small HTTP/1.1 message engine built on tokio
//!
//! `micro-h1` parses requests incrementally from raw bytes, writes responses in
//! strict section order, and serves one request per TCP connection.
//!
//! # Features
//!
//! - Incremental request parsing: request line, header fields and a
//!   `Content-Length` body, fed in arbitrarily small pieces
//! - Ordered response writing: status line, headers, then a full body or a chunked
//!   body with trailers; out-of-order writes are rejected
//! - One task per connection, with a read timeout and graceful shutdown
//!
//! # Example
//!
//! ```no_run
//! use micro_h1::connection::{ResponseSink, default_headers};
//! use micro_h1::handler::{Handler, HandlerError};
//! use micro_h1::protocol::Request;
//! use micro_h1::server::serve;
//! use http::StatusCode;
//!
//! struct HelloWorld;
//!
//! #[async_trait::async_trait]
//! impl Handler for HelloWorld {
//!     async fn call(&self, request: Request, sink: &mut ResponseSink<'_>) -> Result<(), HandlerError> {
//!         if request.target() == "/hidden" {
//!             return Err(HandlerError::new(StatusCode::NOT_FOUND, "nothing here"));
//!         }
//!
//!         let body = b"<h1>Hello World!</h1>";
//!         let mut headers = default_headers(body.len());
//!         headers.replace("Content-Type", "text/html");
//!
//!         let writer = sink.writer();
//!         writer.write_status_line(StatusCode::OK).await?;
//!         writer.write_headers(&headers).await?;
//!         writer.write_body(body).await?;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = serve(8888, HelloWorld).await?;
//!     tokio::signal::ctrl_c().await?;
//!     server.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: [`Headers`](protocol::Headers), [`Request`](protocol::Request),
//!   writer states and error types
//! - [`codec`]: the request parser and decoder, the response encoder
//! - [`connection`]: the per-connection unit, [`ResponseWriter`](connection::ResponseWriter)
//!   and [`ResponseSink`](connection::ResponseSink)
//! - [`handler`]: the [`Handler`](handler::Handler) trait and [`make_handler`](handler::make_handler)
//! - [`server`]: the accept loop, configuration and shutdown
//!
//! # Error Handling
//!
//! - [`protocol::ParseError`]: the request bytes could not be parsed; answered with `400 Bad Request`
//! - [`protocol::SendError`]: a response section was written out of order, or the write failed
//! - [`protocol::HttpError`]: either of the above, as returned by a connection
//! - [`handler::HandlerError`]: a status and message chosen by the handler
//! - [`server::ServerError`]: the listening socket could not be bound
//!
//! # Limitations
//!
//! - HTTP/1.1 only, one request per connection, no keep-alive or pipelining
//! - Request bodies need `Content-Length`; chunked request bodies are rejected
//! - No TLS
//! - Header values are merged with a bare `,`, without regard for quoted strings

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod server;

mod utils;
pub(crate) use utils::ensure;
