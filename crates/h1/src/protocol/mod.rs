//! Core HTTP/1.1 protocol types.
//!
//! - **Headers**: the case-insensitive [`Headers`] collection and its
//!   one-line-at-a-time field parser
//! - **Requests**: [`RequestLine`] and [`Request`] as handed to handlers
//! - **Response sections**: [`ResponsePart`] and the [`WriterState`]
//!   order they must follow
//! - **Errors**: [`ParseError`] for inbound bytes, [`SendError`] for
//!   outbound sections and [`HttpError`] wrapping both

mod headers;
pub use headers::Headers;
pub(crate) use headers::{find_crlf, is_token_char};

mod message;
pub use message::ResponsePart;
pub use message::WriterState;

mod request;
pub use request::Request;
pub use request::RequestLine;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
