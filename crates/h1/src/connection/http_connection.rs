use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use http::StatusCode;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tokio_util::codec::FramedRead;
use tracing::{debug, info, warn};

use crate::codec::{ParserLimits, RequestDecoder};
use crate::connection::{ResponseSink, ResponseWriter};
use crate::handler::Handler;
use crate::protocol::{HttpError, ParseError, Request};

/// Per-connection settings.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionConfig {
    /// Initial capacity of the read buffer.
    pub read_buffer_size: usize,
    pub limits: ParserLimits,
    /// How long to wait for a complete request. `None` waits forever.
    pub read_timeout: Option<Duration>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self { read_buffer_size: 8 * 1024, limits: ParserLimits::default(), read_timeout: Some(Duration::from_secs(30)) }
    }
}

/// One request, one response, then close.
///
/// `HttpConnection` reads bytes until a complete request is parsed, runs the handler,
/// sends the response and shuts the write side down. A request that fails to parse is
/// answered with `400 Bad Request` carrying the parse error as body; a transport
/// failure or read timeout closes the connection without a response.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    writer: W,
    read_timeout: Option<Duration>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Send + Unpin,
{
    pub fn with_config(reader: R, writer: W, config: &ConnectionConfig) -> Self {
        let decoder = RequestDecoder::with_limits(config.limits);
        Self {
            framed_read: FramedRead::with_capacity(reader, decoder, config.read_buffer_size),
            writer,
            read_timeout: config.read_timeout,
        }
    }

    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler + ?Sized,
    {
        let request = match self.read_request().await {
            Ok(Some(request)) => request,

            Ok(None) => {
                info!("cant read more request, break this connection down");
                return Ok(());
            }

            Err(e) if e.is_transport() => {
                warn!(cause = %e, "can't receive request, closing connection");
                return Err(e.into());
            }

            Err(e) => {
                warn!(cause = %e, "can't parse request");
                let mut writer = ResponseWriter::new(&mut self.writer);
                writer.write_response(StatusCode::BAD_REQUEST, e.to_string().as_bytes()).await?;
                writer.finish().await?;
                self.shutdown().await;
                return Err(e.into());
            }
        };

        debug!(method = %request.method(), target = request.target(), body_size = request.body().len(), "received request");

        let mut sink = ResponseSink::new(&mut self.writer);
        let result = handler.call(request, &mut sink).await;
        sink.complete(result).await?;

        self.shutdown().await;
        Ok(())
    }

    async fn read_request(&mut self) -> Result<Option<Request>, ParseError> {
        let next = self.framed_read.next();
        let item = match self.read_timeout {
            Some(limit) => timeout(limit, next).await.map_err(|_| ParseError::Timeout(limit))?,
            None => next.await,
        };
        item.transpose()
    }

    async fn shutdown(&mut self) {
        if let Err(e) = self.writer.shutdown().await {
            debug!(cause = %e, "shutdown writer failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{HandlerError, make_handler};
    use indoc::indoc;
    use tokio::io::{AsyncReadExt, duplex, split};

    async fn exchange<H: Handler>(connection_config: ConnectionConfig, handler: H, request: &[u8]) -> (Result<(), HttpError>, Vec<u8>) {
        let (mut client, server) = duplex(64 * 1024);
        let (reader, writer) = split(server);
        let connection = HttpConnection::with_config(reader, writer, &connection_config);

        let client_side = async {
            client.write_all(request).await.unwrap();
            client.shutdown().await.unwrap();
            let mut response = Vec::new();
            client.read_to_end(&mut response).await.unwrap();
            response
        };

        tokio::join!(connection.process(Arc::new(handler)), client_side)
    }

    fn hello() -> impl Handler {
        make_handler(|request: Request| async move { Ok::<_, HandlerError>(format!("hello {}", request.target())) })
    }

    fn crlf(text: &str) -> Vec<u8> {
        text.replace('\n', "\r\n").into_bytes()
    }

    #[tokio::test]
    async fn serves_one_request() {
        let request = crlf(indoc! {"
            GET /world HTTP/1.1
            Host: localhost:8888

        "});

        let (result, response) = exchange(ConnectionConfig::default(), hello(), &request).await;

        assert!(result.is_ok());
        let response = String::from_utf8(response).unwrap();
        assert_eq!(
            response,
            "HTTP/1.1 200 OK\r\ncontent-length: 12\r\nconnection: close\r\ncontent-type: text/plain\r\n\r\nhello /world"
        );
    }

    #[tokio::test]
    async fn malformed_request_gets_bad_request() {
        let (result, response) = exchange(ConnectionConfig::default(), hello(), b"GET /world HTTP/1.0\r\n\r\n").await;

        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::MalformedRequestLine })));
        let response = String::from_utf8(response).unwrap();
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(response.ends_with("\r\n\r\nmalformed request line"));
    }

    #[tokio::test]
    async fn oversized_body_gets_bad_request() {
        let config = ConnectionConfig { limits: ParserLimits { max_header_bytes: 1024, max_body_bytes: 4 }, ..Default::default() };

        let (result, response) = exchange(config, hello(), b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello").await;

        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::TooLargeBody { .. } })));
        assert!(response.starts_with(b"HTTP/1.1 400 Bad Request\r\n"));
    }

    #[tokio::test]
    async fn handler_error_status_is_sent() {
        let handler = make_handler(|_: Request| async { Err::<&'static str, _>(HandlerError::bad_request("Your problem is not my problem")) });

        let (result, response) = exchange(ConnectionConfig::default(), handler, b"GET /yourproblem HTTP/1.1\r\n\r\n").await;

        assert!(result.is_ok());
        let response = String::from_utf8(response).unwrap();
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(response.ends_with("Your problem is not my problem"));
    }

    #[tokio::test]
    async fn empty_connection_closes_quietly() {
        let (result, response) = exchange(ConnectionConfig::default(), hello(), b"").await;

        assert!(result.is_ok());
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn stalled_request_times_out_without_response() {
        let (mut client, server) = duplex(1024);
        client.write_all(b"GET / HTTP/1.1\r\n").await.unwrap();
        let (reader, writer) = split(server);
        let config = ConnectionConfig { read_timeout: Some(Duration::from_millis(50)), ..Default::default() };
        let connection = HttpConnection::with_config(reader, writer, &config);

        let result = connection.process(Arc::new(hello())).await;

        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::Timeout(_) })));
        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        assert!(response.is_empty());
    }
}
