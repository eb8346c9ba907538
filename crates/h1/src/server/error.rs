use std::io;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::task::JoinError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("can't bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("accept loop failed: {source}")]
    Join {
        #[from]
        source: JoinError,
    },
}
