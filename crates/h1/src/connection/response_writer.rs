use bytes::BytesMut;
use http::StatusCode;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;
use tracing::trace;

use crate::codec::ResponseEncoder;
use crate::protocol::{Headers, ResponsePart, SendError, WriterState};

const INIT_BUFFER_SIZE: usize = 4 * 1024;

/// Baseline response headers: `Content-Length`, `Connection: close`, `Content-Type: text/plain`.
///
/// Callers adjust the returned collection (for example swapping `Content-Length` for
/// `Transfer-Encoding: chunked`) before passing it to [`ResponseWriter::write_headers`].
pub fn default_headers(content_length: usize) -> Headers {
    let mut headers = Headers::new();
    headers.set("Content-Length", &content_length.to_string());
    headers.set("Connection", "close");
    headers.set("Content-Type", mime::TEXT_PLAIN.as_ref());
    headers
}

/// Writes one response to an outbound stream, section by section.
///
/// Each call is checked against the [`WriterState`] order by a [`ResponseEncoder`],
/// then written through to the stream before returning. A call made out of order
/// fails with [`SendError::Missing`] or [`SendError::AlreadyWritten`] and writes nothing.
///
/// A chunked body is closed in two steps: [`write_chunked_body_done`](Self::write_chunked_body_done)
/// writes the last chunk `0\r\n`, then either [`write_trailers`](Self::write_trailers) or
/// [`finish`](Self::finish) writes the empty line that ends the message.
///
/// Handlers get their writer from a [`ResponseSink`](crate::connection::ResponseSink),
/// which calls `finish` once they return. Code driving a `ResponseWriter` directly must
/// call [`finish`](Self::finish) itself; without it a chunked body sent without trailers
/// lacks its final empty line.
#[derive(Debug)]
pub struct ResponseWriter<W> {
    writer: W,
    buffer: BytesMut,
    encoder: ResponseEncoder,
}

impl<W> ResponseWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, buffer: BytesMut::with_capacity(INIT_BUFFER_SIZE), encoder: ResponseEncoder::new() }
    }

    #[inline]
    pub fn state(&self) -> WriterState {
        self.encoder.state()
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), SendError> {
        self.send(ResponsePart::StatusLine(status)).await
    }

    pub async fn write_headers(&mut self, headers: &Headers) -> Result<(), SendError> {
        self.send(ResponsePart::Headers(headers)).await
    }

    /// Writes the complete body; the response is done afterwards.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<(), SendError> {
        self.send(ResponsePart::Body(body)).await
    }

    /// Writes one chunk. May be called any number of times; empty chunks are skipped.
    pub async fn write_chunked_body(&mut self, chunk: &[u8]) -> Result<(), SendError> {
        self.send(ResponsePart::Chunk(chunk)).await
    }

    /// Writes the zero-length last chunk and moves on to the trailer section.
    pub async fn write_chunked_body_done(&mut self) -> Result<(), SendError> {
        self.send(ResponsePart::LastChunk).await
    }

    /// Writes the trailer fields and the empty line ending the chunked message.
    pub async fn write_trailers(&mut self, trailers: &Headers) -> Result<(), SendError> {
        self.send(ResponsePart::Trailers(trailers)).await
    }

    /// Writes a whole response: status line, [`default_headers`] for `body`, then `body`.
    pub async fn write_response(&mut self, status: StatusCode, body: &[u8]) -> Result<(), SendError> {
        self.write_status_line(status).await?;
        self.write_headers(&default_headers(body.len())).await?;
        self.write_body(body).await
    }

    /// Completes the message and flushes the stream.
    ///
    /// After the last chunk with no trailers, this writes the closing empty line.
    ///
    /// # Errors
    ///
    /// [`SendError::Missing`] when the response stopped before its body was complete.
    pub async fn finish(&mut self) -> Result<(), SendError> {
        match self.state() {
            WriterState::Trailers => self.send(ResponsePart::End).await?,
            WriterState::Done => {}
            unfinished => return Err(SendError::Missing(unfinished)),
        }
        self.flush().await
    }

    pub async fn flush(&mut self) -> Result<(), SendError> {
        Ok(self.writer.flush().await?)
    }

    async fn send(&mut self, part: ResponsePart<'_>) -> Result<(), SendError> {
        self.encoder.encode(part, &mut self.buffer)?;
        trace!(size = self.buffer.len(), state = %self.state(), "write response part");

        let written = self.writer.write_all(&self.buffer).await;
        self.buffer.clear();
        Ok(written?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plain_response() {
        let mut writer = ResponseWriter::new(Vec::new());

        writer.write_response(StatusCode::OK, b"Hello World!").await.unwrap();
        writer.finish().await.unwrap();

        let expected = b"HTTP/1.1 200 OK\r\ncontent-length: 12\r\nconnection: close\r\ncontent-type: text/plain\r\n\r\nHello World!";
        assert_eq!(writer.into_inner(), expected);
    }

    #[tokio::test]
    async fn overriding_default_headers() {
        let mut writer = ResponseWriter::new(Vec::new());
        let mut headers = default_headers(0);
        headers.remove("Content-Length");
        headers.set("Transfer-Encoding", "chunked");
        headers.replace("Content-Type", "text/html");

        writer.write_status_line(StatusCode::OK).await.unwrap();
        writer.write_headers(&headers).await.unwrap();

        let expected = b"HTTP/1.1 200 OK\r\nconnection: close\r\ncontent-type: text/html\r\ntransfer-encoding: chunked\r\n\r\n";
        assert_eq!(writer.get_mut(), expected);
    }

    #[tokio::test]
    async fn chunked_without_trailers() {
        let mut writer = ResponseWriter::new(Vec::new());
        writer.write_status_line(StatusCode::OK).await.unwrap();
        writer.write_headers(&Headers::new()).await.unwrap();
        writer.get_mut().clear();

        writer.write_chunked_body(b"abc").await.unwrap();
        writer.write_chunked_body(b"").await.unwrap();
        writer.write_chunked_body(b"de").await.unwrap();
        writer.write_chunked_body_done().await.unwrap();
        writer.finish().await.unwrap();

        assert_eq!(writer.state(), WriterState::Done);
        assert_eq!(writer.into_inner(), b"3\r\nabc\r\n2\r\nde\r\n0\r\n\r\n");
    }

    #[tokio::test]
    async fn last_chunk_needs_finish() {
        let mut writer = ResponseWriter::new(Vec::new());
        writer.write_status_line(StatusCode::OK).await.unwrap();
        writer.write_headers(&Headers::new()).await.unwrap();
        writer.get_mut().clear();

        writer.write_chunked_body(b"abc").await.unwrap();
        writer.write_chunked_body(b"de").await.unwrap();
        writer.write_chunked_body_done().await.unwrap();

        assert_eq!(writer.state(), WriterState::Trailers);
        assert_eq!(writer.get_mut(), b"3\r\nabc\r\n2\r\nde\r\n0\r\n");

        writer.finish().await.unwrap();
        assert_eq!(writer.get_mut(), b"3\r\nabc\r\n2\r\nde\r\n0\r\n\r\n");

        // finishing twice writes nothing more
        writer.finish().await.unwrap();
        assert!(writer.get_mut().ends_with(b"0\r\n\r\n"));
        assert_eq!(writer.into_inner().len(), 20);
    }

    #[tokio::test]
    async fn chunked_with_trailers() {
        let mut writer = ResponseWriter::new(Vec::new());
        writer.write_status_line(StatusCode::OK).await.unwrap();
        writer.write_headers(&Headers::new()).await.unwrap();
        writer.get_mut().clear();

        let mut trailers = Headers::new();
        trailers.set("X-Content-Length", "5");

        writer.write_chunked_body(b"hello").await.unwrap();
        writer.write_chunked_body_done().await.unwrap();
        writer.write_trailers(&trailers).await.unwrap();
        writer.finish().await.unwrap();

        assert_eq!(writer.into_inner(), b"5\r\nhello\r\n0\r\nx-content-length: 5\r\n\r\n");
    }

    #[tokio::test]
    async fn out_of_order_writes_nothing() {
        let mut writer = ResponseWriter::new(Vec::new());

        let result = writer.write_body(b"early").await;
        assert!(matches!(result, Err(SendError::Missing(WriterState::Status))));

        let result = writer.finish().await;
        assert!(matches!(result, Err(SendError::Missing(WriterState::Status))));

        assert!(writer.into_inner().is_empty());
    }
}
