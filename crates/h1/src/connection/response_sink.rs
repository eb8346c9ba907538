use std::fmt;

use bytes::BytesMut;
use http::StatusCode;
use tokio::io::AsyncWrite;
use tracing::{info, warn};

use crate::connection::ResponseWriter;
use crate::handler::HandlerError;
use crate::protocol::{SendError, WriterState};

/// The outbound half of a connection as seen by a handler.
pub type Outbound<'a> = &'a mut (dyn AsyncWrite + Send + Unpin);

/// Where a [`Handler`](crate::handler::Handler) puts its response.
///
/// Bytes passed to [`write`](Self::write) are buffered and sent as a `200 OK` body
/// once the handler returns. A handler that needs another status, custom headers or a
/// chunked body drives the [`ResponseWriter`] from [`writer`](Self::writer) instead.
pub struct ResponseSink<'a> {
    writer: ResponseWriter<Outbound<'a>>,
    body: BytesMut,
}

impl<'a> ResponseSink<'a> {
    pub fn new(outbound: Outbound<'a>) -> Self {
        Self { writer: ResponseWriter::new(outbound), body: BytesMut::new() }
    }

    /// Appends `bytes` to the buffered body.
    pub fn write(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    pub fn buffered(&self) -> &[u8] {
        &self.body
    }

    pub fn writer(&mut self) -> &mut ResponseWriter<Outbound<'a>> {
        &mut self.writer
    }

    /// Sends whatever the handler left unsent, then finishes the message.
    pub(crate) async fn complete(mut self, result: Result<(), HandlerError>) -> Result<(), SendError> {
        let state = self.writer.state();
        match result {
            Err(e) if state == WriterState::Status => {
                info!(status = %e.status(), message = e.message(), "handler rejected request");
                self.writer.write_response(e.status(), e.message().as_bytes()).await?;
            }
            Err(e) => {
                warn!(cause = %e, %state, "handler failed after the response was started");
            }
            Ok(()) if state == WriterState::Status => {
                self.writer.write_response(StatusCode::OK, &self.body).await?;
            }
            Ok(()) => {
                if !self.body.is_empty() {
                    warn!(size = self.body.len(), "dropping buffered body, response was written directly");
                }
            }
        }

        self.writer.finish().await
    }
}

impl fmt::Debug for ResponseSink<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseSink").field("state", &self.writer.state()).field("buffered", &self.body.len()).finish()
    }
}
