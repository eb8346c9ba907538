//! A demo server on port 8888.
//!
//! - `/yourproblem` answers 400, `/myproblem` answers 500, both as HTML
//! - `/chunked/<n>` streams `n` chunks followed by `X-Content-Crc32` and
//!   `X-Content-Length` trailers
//! - anything else answers 200
//!
//! ```text
//! cargo run --example demo_server
//! curl -v --raw http://localhost:8888/chunked/5
//! ```

use std::error::Error;

use async_trait::async_trait;
use flate2::Crc;
use http::StatusCode;
use micro_h1::connection::{ResponseSink, default_headers};
use micro_h1::handler::{Handler, HandlerError};
use micro_h1::protocol::{Headers, Request};
use micro_h1::server::serve;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

const BAD_REQUEST_HTML: &str = "<html>
  <head><title>400 Bad Request</title></head>
  <body>
    <h1>Bad Request</h1>
    <p>Your request honestly kinda sucked.</p>
  </body>
</html>
";

const INTERNAL_ERROR_HTML: &str = "<html>
  <head><title>500 Internal Server Error</title></head>
  <body>
    <h1>Internal Server Error</h1>
    <p>Okay, you know what? This one is on me.</p>
  </body>
</html>
";

const OK_HTML: &str = "<html>
  <head><title>200 OK</title></head>
  <body>
    <h1>Success!</h1>
    <p>Your request was an absolute banger.</p>
  </body>
</html>
";

const MAX_CHUNKS: usize = 1024;

struct DemoHandler;

#[async_trait]
impl Handler for DemoHandler {
    async fn call(&self, request: Request, sink: &mut ResponseSink<'_>) -> Result<(), HandlerError> {
        let target = request.target();
        info!(method = %request.method(), target, "handling request");

        if let Some(count) = target.strip_prefix("/chunked/") {
            let count = count.parse::<usize>().map_err(|e| HandlerError::bad_request(format!("invalid chunk count: {e}")))?;
            if count > MAX_CHUNKS {
                return Err(HandlerError::bad_request(format!("at most {MAX_CHUNKS} chunks")));
            }
            return stream_chunks(sink, count).await;
        }

        match target {
            "/yourproblem" => write_html(sink, StatusCode::BAD_REQUEST, BAD_REQUEST_HTML).await,
            "/myproblem" => write_html(sink, StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_HTML).await,
            _ => write_html(sink, StatusCode::OK, OK_HTML).await,
        }
    }
}

async fn write_html(sink: &mut ResponseSink<'_>, status: StatusCode, html: &str) -> Result<(), HandlerError> {
    let mut headers = default_headers(html.len());
    headers.replace("Content-Type", "text/html");

    let writer = sink.writer();
    writer.write_status_line(status).await?;
    writer.write_headers(&headers).await?;
    writer.write_body(html.as_bytes()).await?;
    Ok(())
}

async fn stream_chunks(sink: &mut ResponseSink<'_>, count: usize) -> Result<(), HandlerError> {
    let mut headers = default_headers(0);
    headers.remove("Content-Length");
    headers.set("Transfer-Encoding", "chunked");
    headers.set("Trailer", "X-Content-Crc32");
    headers.set("Trailer", "X-Content-Length");

    let writer = sink.writer();
    writer.write_status_line(StatusCode::OK).await?;
    writer.write_headers(&headers).await?;

    let mut crc = Crc::new();
    for i in 0..count {
        let chunk = format!("{{\"chunk\": {i}}}\n");
        crc.update(chunk.as_bytes());
        writer.write_chunked_body(chunk.as_bytes()).await?;
    }
    writer.write_chunked_body_done().await?;

    let mut trailers = Headers::new();
    trailers.set("X-Content-Crc32", &format!("{:08x}", crc.sum()));
    trailers.set("X-Content-Length", &crc.amount().to_string());
    writer.write_trailers(&trailers).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let server = serve(8888, DemoHandler).await?;
    info!(local_addr = %server.local_addr(), "demo server started, press ctrl-c to stop");

    tokio::signal::ctrl_c().await?;
    info!("received ctrl-c, shutting down");
    server.close().await?;
    Ok(())
}
