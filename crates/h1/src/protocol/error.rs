use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::protocol::WriterState;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed request line")]
    MalformedRequestLine,

    #[error("malformed field line")]
    MalformedFieldLine,

    #[error("malformed field name")]
    MalformedFieldName,

    #[error("parser is in error state")]
    InErrorState,

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("body size too large, current: {size} exceed the limit {max_size}")]
    TooLargeBody { size: usize, max_size: usize },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("unsupported transfer-encoding: {value}")]
    UnsupportedTransferEncoding { value: String },

    #[error("no complete request within {0:?}")]
    Timeout(Duration),

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_large_body(size: usize, max_size: usize) -> Self {
        Self::TooLargeBody { size, max_size }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn unsupported_transfer_encoding<S: ToString>(str: S) -> Self {
        Self::UnsupportedTransferEncoding { value: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// Whether the failure came from the transport rather than from the request bytes.
    ///
    /// Transport failures close the connection without a response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Timeout(_))
    }
}

/// Errors raised while writing a response.
///
/// The two ordering variants name the section involved, so writing headers before the
/// status line (`Missing(Status)`), writing the body before the headers (`Missing(Headers)`)
/// and writing the status line twice (`AlreadyWritten(Status)`) are distinct values.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("missing {0}")]
    Missing(WriterState),

    #[error("{0} already written")]
    AlreadyWritten(WriterState),

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    /// Builds the ordering error for an operation that needs `required` while the writer is at `current`.
    pub(crate) fn out_of_order(required: WriterState, current: WriterState) -> Self {
        if current < required { Self::Missing(current) } else { Self::AlreadyWritten(required) }
    }
}
