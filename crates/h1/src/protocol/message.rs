use std::fmt;

use http::StatusCode;

use crate::protocol::Headers;

/// Position of a response in its section order.
///
/// States only move forward: `Status -> Headers -> Body -> (Trailers ->) Done`.
/// A plain body goes from `Body` straight to `Done`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WriterState {
    Status,
    Headers,
    Body,
    Trailers,
    Done,
}

impl fmt::Display for WriterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let section = match self {
            WriterState::Status => "status line",
            WriterState::Headers => "headers",
            WriterState::Body => "body",
            WriterState::Trailers => "trailers",
            WriterState::Done => "response",
        };
        f.write_str(section)
    }
}

/// One section of a response, as fed to [`ResponseEncoder`](crate::codec::ResponseEncoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponsePart<'a> {
    /// `HTTP/1.1 <code> <reason>\r\n`
    StatusLine(StatusCode),
    /// Field lines followed by the empty line
    Headers(&'a Headers),
    /// The whole body in one write
    Body(&'a [u8]),
    /// One `<hex-size>\r\n<bytes>\r\n` chunk; may repeat
    Chunk(&'a [u8]),
    /// The `0\r\n` last chunk
    LastChunk,
    /// Trailer field lines followed by the empty line
    Trailers(&'a Headers),
    /// The empty line closing a chunked body sent without trailers
    End,
}

impl ResponsePart<'_> {
    /// The writer state this part may be written in.
    pub fn required_state(&self) -> WriterState {
        match self {
            ResponsePart::StatusLine(_) => WriterState::Status,
            ResponsePart::Headers(_) => WriterState::Headers,
            ResponsePart::Body(_) | ResponsePart::Chunk(_) | ResponsePart::LastChunk => WriterState::Body,
            ResponsePart::Trailers(_) | ResponsePart::End => WriterState::Trailers,
        }
    }

    /// The writer state after this part has been written.
    pub fn next_state(&self) -> WriterState {
        match self {
            ResponsePart::StatusLine(_) => WriterState::Headers,
            ResponsePart::Headers(_) => WriterState::Body,
            ResponsePart::Chunk(_) => WriterState::Body,
            ResponsePart::LastChunk => WriterState::Trailers,
            ResponsePart::Body(_) | ResponsePart::Trailers(_) | ResponsePart::End => WriterState::Done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_are_ordered() {
        assert!(WriterState::Status < WriterState::Headers);
        assert!(WriterState::Headers < WriterState::Body);
        assert!(WriterState::Body < WriterState::Trailers);
        assert!(WriterState::Trailers < WriterState::Done);
    }

    #[test]
    fn chunks_keep_the_body_state() {
        let chunk = ResponsePart::Chunk(b"abc");
        assert_eq!(chunk.required_state(), chunk.next_state());

        let body = ResponsePart::Body(b"abc");
        assert_eq!(body.required_state(), WriterState::Body);
        assert_eq!(body.next_state(), WriterState::Done);
    }
}
