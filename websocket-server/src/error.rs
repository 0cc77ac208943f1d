// websocket-server/src/error.rs
use thiserror::Error;

/// Failures inside the chat fan-out layer
#[derive(Debug, Error)]
pub enum ChatError {
    /// No live connection is registered under this client id
    #[error("no connection registered for client {0}")]
    NotFound(String),

    /// The connection behind a handle has already gone away
    #[error("connection for client {0} is closed")]
    TransportClosed(String),

    /// A frame could not be encoded for delivery
    #[error("failed to serialize chat frame: {0}")]
    Serialization(#[from] serde_json::Error),
}
