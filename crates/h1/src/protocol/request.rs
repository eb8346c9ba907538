//! Parsed HTTP request types.
//!
//! A [`Request`] is produced by [`RequestParser`](crate::codec::RequestParser) once the
//! request line, the header section and any `Content-Length` body have been read.

use bytes::Bytes;
use http::{Method, Version};

use crate::protocol::Headers;

/// The first line of a request: `METHOD target HTTP/1.1`.
///
/// The target is kept as an opaque string; it is not split into path and query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: Method,
    target: String,
    version: Version,
}

impl RequestLine {
    pub(crate) fn new(method: Method, target: String) -> Self {
        // only HTTP/1.1 request lines are ever accepted
        Self { method, target, version: Version::HTTP_11 }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn version(&self) -> Version {
        self.version
    }
}

/// A fully read request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    line: RequestLine,
    headers: Headers,
    body: Bytes,
}

impl Request {
    pub(crate) fn new(line: RequestLine, headers: Headers, body: Bytes) -> Self {
        Self { line, headers, body }
    }

    pub fn request_line(&self) -> &RequestLine {
        &self.line
    }

    pub fn method(&self) -> &Method {
        self.line.method()
    }

    pub fn target(&self) -> &str {
        self.line.target()
    }

    pub fn version(&self) -> Version {
        self.line.version()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The request body, empty unless the request carried `Content-Length`.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_parts(self) -> (RequestLine, Headers, Bytes) {
        (self.line, self.headers, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_and_parts() {
        let mut headers = Headers::new();
        headers.set("Content-Length", "2");
        let request = Request::new(RequestLine::new(Method::PUT, "/items/7".to_string()), headers, Bytes::from_static(b"{}"));

        assert_eq!(request.request_line().method(), &Method::PUT);
        assert_eq!(request.request_line().version(), Version::HTTP_11);
        assert_eq!(request.target(), "/items/7");

        let (line, headers, body) = request.into_parts();
        assert_eq!(line.target(), "/items/7");
        assert_eq!(headers.get("content-length"), "2");
        assert_eq!(&body[..], b"{}");
    }
}
