// common/src/messages.rs
use serde::{Deserialize, Serialize};

/// One inbound chat message as it is persisted in the message log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    pub client_id: String,
    pub data: String,
}

impl ChatEvent {
    pub fn new(client_id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            data: data.into(),
        }
    }
}

/// Frame relayed to every peer other than the sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastFrame {
    pub id: String,
    pub data: String,
}

impl From<&ChatEvent> for BroadcastFrame {
    fn from(event: &ChatEvent) -> Self {
        Self {
            id: event.client_id.clone(),
            data: event.data.clone(),
        }
    }
}
