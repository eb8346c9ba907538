use http::StatusCode;
use thiserror::Error;

use crate::protocol::SendError;

/// A failure reported by a handler, sent to the client as `status` with `message` as body.
#[derive(Debug, Clone, Error)]
#[error("{status}: {message}")]
pub struct HandlerError {
    status: StatusCode,
    message: String,
}

impl HandlerError {
    pub fn new<S: Into<String>>(status: StatusCode, message: S) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A failed write while streaming the response; reported as a server error.
impl From<SendError> for HandlerError {
    fn from(e: SendError) -> Self {
        Self::internal(e.to_string())
    }
}
