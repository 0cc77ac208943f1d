// websocket-server/src/actors/chat_session_actor.rs
use actix::{Actor, ActorContext, Handler, StreamHandler};
use actix_web_actors::ws;
use common::store::MessageLog;
use common::{BroadcastFrame, ChatEvent};
use std::sync::Arc;
use uuid::Uuid;

use crate::registry::{ChannelHandle, ConnectionRegistry, SessionCommand};

/// Lifecycle of one chat connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Handshake accepted, registered, actor not yet running
    Connecting,
    Open,
    Closed,
}

/// Actor driving one client's chat connection.
///
/// Inbound text frames are processed strictly in arrival order: echoed to the
/// sender, appended to the message log in the background, then relayed to
/// every other registered connection.
pub struct ChatSessionActor {
    client_id: String,
    connection_id: Uuid,
    state: SessionState,
    registry: Arc<ConnectionRegistry>,
    message_log: Arc<dyn MessageLog>,
}

impl ChatSessionActor {
    pub fn new(
        client_id: String,
        registry: Arc<ConnectionRegistry>,
        message_log: Arc<dyn MessageLog>,
    ) -> Self {
        Self {
            client_id,
            connection_id: Uuid::new_v4(),
            state: SessionState::Connecting,
            registry,
            message_log,
        }
    }

    pub fn connection_id(&self) -> Uuid {
        self.connection_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn on_text(&mut self, text: String, ctx: &mut ws::WebsocketContext<Self>) {
        tracing::debug!("Received message from client {}: {}", self.client_id, text);

        relay_text(
            &*self.registry,
            &self.client_id,
            text,
            |echo| ctx.text(echo),
            |event| self.persist(event),
        );
    }

    // Fire-and-forget: a logging failure never holds up delivery
    fn persist(&self, event: ChatEvent) {
        let log = Arc::clone(&self.message_log);
        actix::spawn(async move {
            let client_id = event.client_id.clone();
            if let Err(e) = log.append(event).await {
                tracing::error!("Failed to persist message from client {}: {}", client_id, e);
            }
        });
    }
}

/// Handle one inbound text message from `client_id`.
///
/// The raw text goes back to the sender through `echo` before the event is
/// handed to `persist` and relayed to every other registered client, so the
/// sender's acknowledgment always precedes the relay.
pub(crate) fn relay_text<H: ChannelHandle>(
    registry: &ConnectionRegistry<H>,
    client_id: &str,
    text: String,
    echo: impl FnOnce(String),
    persist: impl FnOnce(ChatEvent),
) {
    echo(text.clone());

    let event = ChatEvent::new(client_id, text);
    persist(event.clone());

    if let Err(e) = registry.broadcast(&BroadcastFrame::from(&event), Some(client_id)) {
        tracing::error!("Broadcast from client {} failed: {}", client_id, e);
    }
}

impl Actor for ChatSessionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        self.state = SessionState::Open;
        tracing::info!("Client connected: {} ({})", self.client_id, self.connection_id);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.state = SessionState::Closed;
        self.registry
            .deregister_connection(&self.client_id, self.connection_id);
        tracing::info!("Client disconnected: {} ({})", self.client_id, self.connection_id);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ChatSessionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                ctx.pong(&msg);
            },
            Ok(ws::Message::Pong(_)) => (),
            Ok(ws::Message::Text(text)) => {
                self.on_text(text.to_string(), ctx);
            },
            Ok(ws::Message::Binary(bin)) => {
                tracing::warn!(
                    "Ignoring {} byte binary frame from client {}",
                    bin.len(),
                    self.client_id
                );
            },
            Ok(ws::Message::Close(reason)) => {
                tracing::info!("Client {} closing connection: {:?}", self.client_id, reason);
                self.state = SessionState::Closed;
                ctx.close(reason);
                ctx.stop();
            },
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => (),
            Err(e) => {
                tracing::warn!("Protocol error from client {}: {}", self.client_id, e);
                self.state = SessionState::Closed;
                ctx.stop();
            }
        }
    }
}

impl Handler<SessionCommand> for ChatSessionActor {
    type Result = ();

    fn handle(&mut self, msg: SessionCommand, ctx: &mut Self::Context) -> Self::Result {
        match msg {
            SessionCommand::Deliver(frame) => {
                if self.state != SessionState::Closed {
                    ctx.text(frame);
                }
            },
            SessionCommand::Supersede => {
                tracing::info!(
                    "Closing connection {} of client {}: superseded",
                    self.connection_id,
                    self.client_id
                );
                self.state = SessionState::Closed;
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Policy,
                    description: Some("client id taken over by a newer connection".to_string()),
                }));
                ctx.stop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;
    use std::sync::Mutex;

    type Timeline = Arc<Mutex<Vec<String>>>;

    #[derive(Clone)]
    struct RecordingHandle {
        client_id: &'static str,
        id: Uuid,
        timeline: Timeline,
    }

    impl ChannelHandle for RecordingHandle {
        fn connection_id(&self) -> Uuid {
            self.id
        }

        fn deliver(&self, frame: &str) -> Result<(), ChatError> {
            self.timeline
                .lock()
                .unwrap()
                .push(format!("relay to {}: {}", self.client_id, frame));
            Ok(())
        }

        fn close(&self) {}
    }

    fn registry_with(clients: &[&'static str], timeline: &Timeline) -> ConnectionRegistry<RecordingHandle> {
        let registry = ConnectionRegistry::new();
        for &client_id in clients {
            registry.register(
                client_id,
                RecordingHandle {
                    client_id,
                    id: Uuid::new_v4(),
                    timeline: timeline.clone(),
                },
            );
        }
        registry
    }

    #[test]
    fn echo_precedes_persist_and_relay() {
        let timeline = Timeline::default();
        let registry = registry_with(&["u1", "u2"], &timeline);

        relay_text(
            &registry,
            "u1",
            "hello".to_string(),
            |echo| timeline.lock().unwrap().push(format!("echo: {}", echo)),
            |event| timeline.lock().unwrap().push(format!("persist: {}", event.data)),
        );

        assert_eq!(
            *timeline.lock().unwrap(),
            vec![
                "echo: hello".to_string(),
                "persist: hello".to_string(),
                r#"relay to u2: {"id":"u1","data":"hello"}"#.to_string(),
            ]
        );
    }

    #[test]
    fn lone_client_only_gets_its_echo() {
        let timeline = Timeline::default();
        let registry = registry_with(&["u1"], &timeline);

        relay_text(
            &registry,
            "u1",
            "anyone?".to_string(),
            |echo| timeline.lock().unwrap().push(format!("echo: {}", echo)),
            |_| (),
        );

        assert_eq!(*timeline.lock().unwrap(), vec!["echo: anyone?".to_string()]);
    }
}
