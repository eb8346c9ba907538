//! The connection server.
//!
//! A [`Server`] owns the listening socket. Its accept loop runs as a background task
//! and spawns one task per accepted connection into a [`JoinSet`]; each task runs an
//! [`HttpConnection`] to completion. Accept errors are logged and skipped.
//!
//! [`Server::close`] stops accepting, drops the listener and gives in-flight
//! connections [`ServerConfig::shutdown_timeout`] to finish before aborting them.
//!
//! # Example
//!
//! ```no_run
//! use micro_h1::handler::{HandlerError, make_handler};
//! use micro_h1::protocol::Request;
//! use micro_h1::server::serve;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let handler = make_handler(|request: Request| async move {
//!     Ok::<_, HandlerError>(format!("you asked for {}", request.target()))
//! });
//! let server = serve(8888, handler).await?;
//! tokio::signal::ctrl_c().await?;
//! server.close().await?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod error;

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::net::TcpListener;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::connection::{ConnectionConfig, HttpConnection};
use crate::handler::Handler;
use crate::protocol::HttpError;

pub use builder::{DEFAULT_PORT, ServerBuilder, ServerConfig};
pub use error::ServerError;

/// Binds `0.0.0.0:port` with default settings and starts serving `handler`.
pub async fn serve<H>(port: u16, handler: H) -> Result<Server, ServerError>
where
    H: Handler + 'static,
{
    ServerBuilder::new().port(port).bind(handler).await
}

/// A running server. Dropping it without [`close`](Self::close) leaves the accept loop running.
#[derive(Debug)]
pub struct Server {
    local_addr: SocketAddr,
    closed: Arc<AtomicBool>,
    shutdown: CancellationToken,
    accept_loop: JoinHandle<()>,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub(crate) async fn start<H>(config: ServerConfig, handler: H) -> Result<Self, ServerError>
    where
        H: Handler + 'static,
    {
        let address = config.address;
        let listener = TcpListener::bind(address).await.map_err(|source| ServerError::Bind { address, source })?;
        let local_addr = listener.local_addr().map_err(|source| ServerError::Bind { address, source })?;
        info!(%local_addr, "start listening");

        let closed = Arc::new(AtomicBool::new(false));
        let shutdown = CancellationToken::new();
        let accept_loop = AcceptLoop {
            listener,
            handler: Arc::new(handler),
            connection_config: config.connection_config(),
            closed: Arc::clone(&closed),
            shutdown: shutdown.clone(),
        };
        let accept_loop = tokio::spawn(accept_loop.run(config));

        Ok(Self { local_addr, closed, shutdown, accept_loop })
    }

    /// The bound address; useful when the configured port was `0`.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting and waits for in-flight connections, aborting those still
    /// running after the shutdown timeout.
    pub async fn close(self) -> Result<(), ServerError> {
        self.closed.store(true, Ordering::Release);
        self.shutdown.cancel();
        self.accept_loop.await?;
        info!(local_addr = %self.local_addr, "server closed");
        Ok(())
    }
}

struct AcceptLoop<H: ?Sized> {
    listener: TcpListener,
    handler: Arc<H>,
    connection_config: ConnectionConfig,
    closed: Arc<AtomicBool>,
    shutdown: CancellationToken,
}

impl<H> AcceptLoop<H>
where
    H: Handler + ?Sized + 'static,
{
    async fn run(self, config: ServerConfig) {
        let Self { listener, handler, connection_config, closed, shutdown } = self;
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                biased;

                () = shutdown.cancelled() => break,

                Some(joined) = connections.join_next(), if !connections.is_empty() => log_finished(joined),

                accepted = listener.accept() => {
                    let (tcp_stream, remote_addr) = match accepted {
                        Ok(stream_and_addr) => stream_and_addr,
                        Err(e) => {
                            if closed.load(Ordering::Acquire) {
                                break;
                            }
                            warn!(cause = %e, "failed to accept");
                            continue;
                        }
                    };

                    let handler = Arc::clone(&handler);
                    let span = info_span!("connection", %remote_addr);
                    connections.spawn(
                        async move {
                            let (reader, writer) = tcp_stream.into_split();
                            HttpConnection::with_config(reader, writer, &connection_config).process(handler).await
                        }
                        .instrument(span),
                    );
                }
            }
        }

        drop(listener);
        info!(in_flight = connections.len(), "stop accepting, waiting for in-flight connections");

        let drain = async {
            while let Some(joined) = connections.join_next().await {
                log_finished(joined);
            }
        };
        if timeout(config.shutdown_timeout, drain).await.is_err() {
            warn!(aborted = connections.len(), "shutdown timeout elapsed, aborting connections");
            connections.shutdown().await;
        }
    }
}

fn log_finished(joined: Result<Result<(), HttpError>, JoinError>) {
    match joined {
        Ok(Ok(())) => debug!("finished process, connection shutdown"),
        Ok(Err(e)) => info!(cause = %e, "connection closed with error"),
        Err(e) => error!(cause = %e, "connection task failed"),
    }
}
