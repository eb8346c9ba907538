//! Response header encoding.
//!
//! - [`HeaderEncoder`]: encodes the status line, and header or trailer sections,
//!   from a [`Headers`](crate::protocol::Headers) collection

mod header_encoder;

pub(crate) use header_encoder::FastWrite;
pub use header_encoder::HeaderEncoder;
