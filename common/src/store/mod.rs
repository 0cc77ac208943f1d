// common/src/store/mod.rs
//! Persistence seams for users, tasks and chat history.
//!
//! Handlers only ever see these traits. The in-process implementations in
//! [`memory`] and [`message_log`] are what the server wires up by default.
pub mod memory;
pub mod message_log;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::ChatConfig;
use crate::error::StoreError;
use crate::messages::ChatEvent;

pub use memory::MemoryCollection;
pub use message_log::{JsonlMessageLog, MemoryMessageLog};

/// A stored document together with its opaque identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    pub id: String,
    #[serde(flatten)]
    pub doc: T,
}

pub type Predicate<'a, T> = &'a (dyn Fn(&T) -> bool + Send + Sync);

/// Result of a guarded write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// No document under the requested id
    Missing,
    /// Another document already satisfies the conflict predicate
    Conflict,
}

/// CRUD over one kind of document, keyed by opaque string ids
#[async_trait]
pub trait Collection<T>: Send + Sync
where
    T: Clone + Send + Sync + 'static,
{
    /// Store a new document and return its generated id
    async fn insert(&self, doc: T) -> Result<String, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Record<T>>, StoreError>;

    /// First document, in insertion order, matching `predicate`
    async fn find_one(&self, predicate: Predicate<'_, T>) -> Result<Option<Record<T>>, StoreError> {
        Ok(self.find_many(predicate).await?.into_iter().next())
    }

    /// Every matching document, in insertion order
    async fn find_many(&self, predicate: Predicate<'_, T>) -> Result<Vec<Record<T>>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Record<T>>, StoreError> {
        self.find_many(&|_| true).await
    }

    /// Replace the document under `id`; false when there is none
    async fn update(&self, id: &str, doc: T) -> Result<bool, StoreError>;

    /// Store `doc` unless a stored document satisfies `conflict`.
    ///
    /// The check and the write are one atomic step with respect to every
    /// other write on the collection; `None` means a conflict was found.
    async fn insert_unless(&self, doc: T, conflict: Predicate<'_, T>) -> Result<Option<String>, StoreError>;

    /// Replace the document under `id` unless a different document satisfies `conflict`
    async fn update_unless(
        &self,
        id: &str,
        doc: T,
        conflict: Predicate<'_, T>,
    ) -> Result<WriteOutcome, StoreError>;

    /// Remove the document under `id`; false when there is none
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

/// Append-only record of chat events
#[async_trait]
pub trait MessageLog: Send + Sync {
    async fn append(&self, event: ChatEvent) -> Result<(), StoreError>;

    async fn read_all(&self) -> Result<Vec<ChatEvent>, StoreError>;
}

/// Build the message log selected by configuration
pub async fn open_message_log(config: &ChatConfig) -> Result<Arc<dyn MessageLog>, StoreError> {
    match &config.message_log_path {
        Some(path) => {
            tracing::info!("Persisting chat history to {}", path);
            Ok(Arc::new(JsonlMessageLog::open(path).await?))
        },
        None => {
            tracing::info!("Keeping chat history in memory");
            Ok(Arc::new(MemoryMessageLog::new()))
        }
    }
}
