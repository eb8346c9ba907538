use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::codec::ParserLimits;
use crate::connection::ConnectionConfig;
use crate::handler::Handler;
use crate::server::{Server, ServerError};

pub const DEFAULT_PORT: u16 = 8888;

/// Settings for a [`Server`]. There are no environment variables or config files;
/// everything is set here or through [`ServerBuilder`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub address: SocketAddr,
    pub read_buffer_size: usize,
    pub limits: ParserLimits,
    /// Time allowed for a client to send a complete request.
    pub read_timeout: Option<Duration>,
    /// Grace period for in-flight connections once the server is closed.
    pub shutdown_timeout: Duration,
}

impl ServerConfig {
    pub(crate) fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig { read_buffer_size: self.read_buffer_size, limits: self.limits, read_timeout: self.read_timeout }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        let connection = ConnectionConfig::default();
        Self {
            address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            read_buffer_size: connection.read_buffer_size,
            limits: connection.limits,
            read_timeout: connection.read_timeout,
            shutdown_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServerBuilder {
    config: ServerConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn address<A: Into<SocketAddr>>(mut self, address: A) -> Self {
        self.config.address = address.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.address.set_port(port);
        self
    }

    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    pub fn max_header_bytes(mut self, max: usize) -> Self {
        self.config.limits.max_header_bytes = max;
        self
    }

    pub fn max_body_bytes(mut self, max: usize) -> Self {
        self.config.limits.max_body_bytes = max;
        self
    }

    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout = timeout;
        self
    }

    /// Binds the listening socket and starts accepting connections in the background.
    ///
    /// # Errors
    ///
    /// [`ServerError::Bind`] when the address cannot be bound. This is the only
    /// failure that stops a server from starting.
    pub async fn bind<H>(self, handler: H) -> Result<Server, ServerError>
    where
        H: Handler + 'static,
    {
        Server::start(self.config, handler).await
    }
}
