//! Live chat fan-out: the connection registry, one session actor per
//! connection, and the `/ws/{client_id}` route that ties them together.

pub mod actors;
pub mod error;
pub mod registry;
pub mod routing;

use common::store::MessageLog;
use std::sync::Arc;

pub use actors::chat_session_actor::{ChatSessionActor, SessionState};
pub use error::ChatError;
pub use registry::{BroadcastReport, ChannelHandle, ChatChannel, ConnectionRegistry, SessionCommand};
pub use routing::routes;

/// Everything a chat route needs, shared across workers
#[derive(Clone)]
pub struct ChatState {
    pub registry: Arc<ConnectionRegistry>,
    pub message_log: Arc<dyn MessageLog>,
}

impl ChatState {
    pub fn new(registry: Arc<ConnectionRegistry>, message_log: Arc<dyn MessageLog>) -> Self {
        Self {
            registry,
            message_log,
        }
    }
}
