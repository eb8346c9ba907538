//! Serializes the status line and header-like sections of a response.
//!
//! Header and trailer sections share one wire form: `name: value\r\n` per field in
//! collection order, then an empty line.

use std::io;
use std::io::Write;

use bytes::{BufMut, BytesMut};
use http::StatusCode;
use tokio_util::codec::Encoder;

use crate::protocol::{Headers, SendError};

/// Initial buffer size reserved for a header section
const INIT_HEADER_SIZE: usize = 1024;

#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderEncoder;

impl Encoder<StatusCode> for HeaderEncoder {
    type Error = SendError;

    /// Writes `HTTP/1.1 <code> <reason>\r\n`; codes without a canonical reason get an empty one.
    fn encode(&mut self, status: StatusCode, dst: &mut BytesMut) -> Result<(), Self::Error> {
        write!(FastWrite(dst), "HTTP/1.1 {} {}\r\n", status.as_str(), status.canonical_reason().unwrap_or_default())?;
        Ok(())
    }
}

impl<'a> Encoder<&'a Headers> for HeaderEncoder {
    type Error = SendError;

    fn encode(&mut self, headers: &'a Headers, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEADER_SIZE);
        for (name, value) in headers.iter() {
            dst.put_slice(name.as_bytes());
            dst.put_slice(b": ");
            dst.put_slice(value.as_bytes());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

/// Fast writer implementation for writing to BytesMut.
pub(crate) struct FastWrite<'a>(pub(crate) &'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line() {
        let mut dst = BytesMut::new();

        HeaderEncoder.encode(StatusCode::OK, &mut dst).unwrap();
        HeaderEncoder.encode(StatusCode::BAD_REQUEST, &mut dst).unwrap();

        assert_eq!(&dst[..], b"HTTP/1.1 200 OK\r\nHTTP/1.1 400 Bad Request\r\n");
    }

    #[test]
    fn unknown_reason_is_empty() {
        let mut dst = BytesMut::new();
        HeaderEncoder.encode(StatusCode::from_u16(599).unwrap(), &mut dst).unwrap();
        assert_eq!(&dst[..], b"HTTP/1.1 599 \r\n");
    }

    #[test]
    fn fields_in_insertion_order() {
        let mut headers = Headers::new();
        headers.set("Content-Length", "5");
        headers.set("Connection", "close");
        headers.set("X-Tag", "a");
        headers.set("x-tag", "b");

        let mut dst = BytesMut::new();
        HeaderEncoder.encode(&headers, &mut dst).unwrap();

        assert_eq!(&dst[..], b"content-length: 5\r\nconnection: close\r\nx-tag: a,b\r\n\r\n");
    }

    #[test]
    fn empty_section_is_just_the_blank_line() {
        let mut dst = BytesMut::new();
        HeaderEncoder.encode(&Headers::new(), &mut dst).unwrap();
        assert_eq!(&dst[..], b"\r\n");
    }
}
