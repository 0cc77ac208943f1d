// websocket-server/src/registry.rs
//! Registry of live chat connections.
//!
//! The registry is the single source of truth for "who is connected". Each
//! entry is keyed by the client identifier taken from the connection path and
//! remembers which physical connection owns it, so that teardown of a replaced
//! connection can never evict the connection that replaced it.
use actix::{Message, Recipient};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ChatError;

/// Commands a session actor accepts from the rest of the server
#[derive(Message, Debug, Clone, PartialEq, Eq)]
#[rtype(result = "()")]
pub enum SessionCommand {
    /// Write one text frame to the client
    Deliver(String),
    /// Close the connection; the client id has been taken over
    Supersede,
}

/// Something the registry can push frames into
pub trait ChannelHandle: Clone + Send + Sync + 'static {
    /// Identity of the physical connection behind this handle
    fn connection_id(&self) -> Uuid;

    /// Push one frame. Fails once the connection is gone.
    fn deliver(&self, frame: &str) -> Result<(), ChatError>;

    /// Ask the connection to shut down
    fn close(&self);
}

/// Handle onto a running chat session actor
#[derive(Clone)]
pub struct ChatChannel {
    client_id: String,
    connection_id: Uuid,
    recipient: Recipient<SessionCommand>,
}

impl ChatChannel {
    pub fn new(client_id: String, connection_id: Uuid, recipient: Recipient<SessionCommand>) -> Self {
        Self {
            client_id,
            connection_id,
            recipient,
        }
    }
}

impl ChannelHandle for ChatChannel {
    fn connection_id(&self) -> Uuid {
        self.connection_id
    }

    fn deliver(&self, frame: &str) -> Result<(), ChatError> {
        // A stopped session drops its mailbox; do_send alone would swallow that
        if !self.recipient.connected() {
            return Err(ChatError::TransportClosed(self.client_id.clone()));
        }
        self.recipient.do_send(SessionCommand::Deliver(frame.to_string()));
        Ok(())
    }

    fn close(&self) {
        if self.recipient.connected() {
            self.recipient.do_send(SessionCommand::Supersede);
        }
    }
}

/// Outcome of one broadcast
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    /// Client ids removed because their connection was found dead
    pub evicted: Vec<String>,
}

/// Concurrent map from client id to live connection handle
pub struct ConnectionRegistry<H = ChatChannel> {
    connections: DashMap<String, H>,
}

impl<H: ChannelHandle> Default for ConnectionRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ChannelHandle> ConnectionRegistry<H> {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Insert or overwrite the entry for `client_id`.
    ///
    /// A handle previously registered under the same id is returned, not
    /// closed; closing it is up to the caller.
    pub fn register(&self, client_id: &str, handle: H) -> Option<H> {
        let displaced = self.connections.insert(client_id.to_string(), handle);
        match &displaced {
            Some(_) => tracing::warn!("Client {} re-registered, replacing previous connection", client_id),
            None => tracing::info!("Client registered: {}", client_id),
        }
        displaced
    }

    /// Remove the entry for `client_id`. Absent ids are a no-op.
    pub fn deregister(&self, client_id: &str) -> bool {
        let removed = self.connections.remove(client_id).is_some();
        if removed {
            tracing::info!("Client deregistered: {}", client_id);
        }
        removed
    }

    /// Remove the entry for `client_id` only while it still belongs to `connection_id`
    pub fn deregister_connection(&self, client_id: &str, connection_id: Uuid) -> bool {
        let removed = self
            .connections
            .remove_if(client_id, |_, handle| handle.connection_id() == connection_id)
            .is_some();
        if removed {
            tracing::info!("Client deregistered: {} ({})", client_id, connection_id);
        }
        removed
    }

    pub fn lookup(&self, client_id: &str) -> Option<H> {
        // Clone out so no shard lock is held while the caller uses the handle
        self.connections.get(client_id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, client_id: &str) -> bool {
        self.connections.contains_key(client_id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn client_ids(&self) -> Vec<String> {
        self.connections.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Deliver one frame to `client_id`, evicting the entry if its connection is dead
    pub fn try_send_to(&self, client_id: &str, frame: &str) -> Result<(), ChatError> {
        let handle = self
            .lookup(client_id)
            .ok_or_else(|| ChatError::NotFound(client_id.to_string()))?;

        handle.deliver(frame).map_err(|e| {
            tracing::warn!("Direct send to {} failed: {}", client_id, e);
            self.deregister_connection(client_id, handle.connection_id());
            e
        })
    }

    /// Returns whether a target was registered, not whether delivery succeeded
    pub fn send_to(&self, client_id: &str, frame: &str) -> bool {
        !matches!(self.try_send_to(client_id, frame), Err(ChatError::NotFound(_)))
    }

    /// Serialize `message` once and deliver it to every registered client
    /// except `exclude`.
    ///
    /// Delivery runs over a snapshot of the map, so registrations racing with
    /// the broadcast are neither blocked nor skipped mid-iteration. Dead
    /// targets are deregistered as they are found and never abort the fan-out.
    pub fn broadcast<M: Serialize>(
        &self,
        message: &M,
        exclude: Option<&str>,
    ) -> Result<BroadcastReport, ChatError> {
        let frame = serde_json::to_string(message)?;

        let targets: Vec<(String, H)> = self
            .connections
            .iter()
            .filter(|entry| Some(entry.key().as_str()) != exclude)
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let mut report = BroadcastReport::default();
        for (client_id, handle) in targets {
            match handle.deliver(&frame) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!("Dropping dead peer during broadcast: {}", e);
                    if self.deregister_connection(&client_id, handle.connection_id()) {
                        report.evicted.push(client_id);
                    }
                }
            }
        }

        tracing::debug!(
            "Broadcast delivered to {} peers, evicted {}",
            report.delivered,
            report.evicted.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct FakeHandle {
        id: Uuid,
        alive: Arc<AtomicBool>,
        closed: Arc<AtomicBool>,
        inbox: Arc<Mutex<Vec<String>>>,
    }

    impl FakeHandle {
        fn new() -> Self {
            Self {
                id: Uuid::new_v4(),
                alive: Arc::new(AtomicBool::new(true)),
                closed: Arc::new(AtomicBool::new(false)),
                inbox: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn dead() -> Self {
            let handle = Self::new();
            handle.alive.store(false, Ordering::SeqCst);
            handle
        }

        fn received(&self) -> Vec<String> {
            self.inbox.lock().unwrap().clone()
        }
    }

    impl ChannelHandle for FakeHandle {
        fn connection_id(&self) -> Uuid {
            self.id
        }

        fn deliver(&self, frame: &str) -> Result<(), ChatError> {
            if !self.alive.load(Ordering::SeqCst) {
                return Err(ChatError::TransportClosed(self.id.to_string()));
            }
            self.inbox.lock().unwrap().push(frame.to_string());
            Ok(())
        }

        fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    fn frame(id: &str, data: &str) -> common::BroadcastFrame {
        common::BroadcastFrame {
            id: id.to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn register_same_id_keeps_only_latest() {
        let registry = ConnectionRegistry::new();
        let h1 = FakeHandle::new();
        let h2 = FakeHandle::new();

        assert!(registry.register("A", h1.clone()).is_none());
        let displaced = registry.register("A", h2.clone()).unwrap();

        assert_eq!(displaced.connection_id(), h1.connection_id());
        assert!(!h1.closed.load(Ordering::SeqCst));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("A").unwrap().connection_id(), h2.connection_id());
    }

    #[test]
    fn deregister_is_idempotent() {
        let registry = ConnectionRegistry::new();
        registry.register("A", FakeHandle::new());
        registry.register("B", FakeHandle::new());

        assert!(registry.deregister("A"));
        assert!(!registry.deregister("A"));
        assert!(!registry.deregister("never-registered"));
        assert_eq!(registry.client_ids(), vec!["B".to_string()]);
    }

    #[test]
    fn replaced_connection_cannot_evict_replacement() {
        let registry = ConnectionRegistry::new();
        let old = FakeHandle::new();
        let new = FakeHandle::new();
        registry.register("A", old.clone());
        registry.register("A", new.clone());

        assert!(!registry.deregister_connection("A", old.connection_id()));
        assert!(registry.contains("A"));
        assert!(registry.deregister_connection("A", new.connection_id()));
        assert!(registry.is_empty());
    }

    #[test]
    fn broadcast_skips_excluded_client() {
        let registry = ConnectionRegistry::new();
        let (a, b, c) = (FakeHandle::new(), FakeHandle::new(), FakeHandle::new());
        registry.register("A", a.clone());
        registry.register("B", b.clone());
        registry.register("C", c.clone());

        let report = registry.broadcast(&frame("A", "hi"), Some("A")).unwrap();

        assert_eq!(report.delivered, 2);
        assert!(a.received().is_empty());
        assert_eq!(b.received(), vec![r#"{"id":"A","data":"hi"}"#.to_string()]);
        assert_eq!(c.received(), b.received());
    }

    #[test]
    fn broadcast_evicts_dead_peers_and_continues() {
        let registry = ConnectionRegistry::new();
        let (a, b, c) = (FakeHandle::new(), FakeHandle::dead(), FakeHandle::new());
        registry.register("A", a.clone());
        registry.register("B", b.clone());
        registry.register("C", c.clone());

        let report = registry.broadcast(&frame("X", "hi"), None).unwrap();

        assert_eq!(report.delivered, 2);
        assert_eq!(report.evicted, vec!["B".to_string()]);
        assert_eq!(a.received().len(), 1);
        assert_eq!(c.received().len(), 1);
        assert!(!registry.contains("B"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn broadcast_reports_unserializable_payload() {
        let registry = ConnectionRegistry::new();
        let a = FakeHandle::new();
        registry.register("A", a.clone());

        // JSON object keys must be strings
        let mut payload = BTreeMap::new();
        payload.insert(vec![1u8], 1u8);

        assert!(matches!(
            registry.broadcast(&payload, None),
            Err(ChatError::Serialization(_))
        ));
        assert!(a.received().is_empty());
        assert!(registry.contains("A"));
    }

    #[test]
    fn send_to_reports_whether_target_exists() {
        let registry = ConnectionRegistry::new();
        let a = FakeHandle::new();
        registry.register("A", a.clone());

        assert!(registry.send_to("A", "hello"));
        assert!(!registry.send_to("B", "hello"));
        assert_eq!(a.received(), vec!["hello".to_string()]);
        assert!(matches!(
            registry.try_send_to("B", "hello"),
            Err(ChatError::NotFound(_))
        ));
    }

    #[test]
    fn send_to_stale_handle_is_found_but_evicted() {
        let registry = ConnectionRegistry::new();
        registry.register("A", FakeHandle::dead());

        assert!(registry.send_to("A", "hello"));
        assert!(!registry.contains("A"));
    }

    #[test]
    fn concurrent_register_deregister_and_broadcast() {
        let registry = Arc::new(ConnectionRegistry::new());
        let listener = FakeHandle::new();
        registry.register("listener", listener.clone());

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let registry = Arc::clone(&registry);
                scope.spawn(move || {
                    for n in 0..50 {
                        let id = format!("w{}-{}", worker, n);
                        let handle = if n % 5 == 0 { FakeHandle::dead() } else { FakeHandle::new() };
                        registry.register(&id, handle);
                        registry
                            .broadcast(&frame(&id, "tick"), Some(id.as_str()))
                            .unwrap();
                        registry.deregister(&id);
                    }
                });
            }
        });

        assert_eq!(registry.client_ids(), vec!["listener".to_string()]);
        assert_eq!(listener.received().len(), 8 * 50);
    }
}
