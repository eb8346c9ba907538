//! Response body framing.
//!
//! - [`ChunkedEncoder`]: `<hex-size>\r\n<bytes>\r\n` chunks and the `0\r\n` last chunk
//!
//! Fixed-length bodies need no framing and are copied through by
//! [`ResponseEncoder`](crate::codec::ResponseEncoder).

mod chunked_encoder;

pub use chunked_encoder::ChunkedEncoder;
