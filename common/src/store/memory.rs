// common/src/store/memory.rs
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Collection, Predicate, Record, WriteOutcome};
use crate::error::StoreError;

struct Slot<T> {
    seq: u64,
    doc: T,
}

/// In-process document collection.
///
/// Reads go straight to the map. Writes are serialized so that a guarded
/// write sees no other write between its check and its insert.
pub struct MemoryCollection<T> {
    docs: DashMap<String, Slot<T>>,
    next_seq: AtomicU64,
    writes: Mutex<()>,
}

impl<T> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MemoryCollection<T> {
    pub fn new() -> Self {
        Self {
            docs: DashMap::new(),
            next_seq: AtomicU64::new(0),
            writes: Mutex::new(()),
        }
    }

    fn put(&self, doc: T) -> String {
        let id = Uuid::new_v4().simple().to_string();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.docs.insert(id.clone(), Slot { seq, doc });
        id
    }

    fn any_other(&self, id: Option<&str>, conflict: Predicate<'_, T>) -> bool {
        self.docs
            .iter()
            .any(|entry| Some(entry.key().as_str()) != id && conflict(&entry.value().doc))
    }

    fn replace(&self, id: &str, doc: T) -> bool {
        match self.docs.get_mut(id) {
            Some(mut slot) => {
                slot.doc = doc;
                true
            },
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

#[async_trait]
impl<T> Collection<T> for MemoryCollection<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn insert(&self, doc: T) -> Result<String, StoreError> {
        let _guard = self.writes.lock().await;
        Ok(self.put(doc))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Record<T>>, StoreError> {
        Ok(self.docs.get(id).map(|slot| Record {
            id: id.to_string(),
            doc: slot.doc.clone(),
        }))
    }

    async fn find_many(&self, predicate: Predicate<'_, T>) -> Result<Vec<Record<T>>, StoreError> {
        let mut matches: Vec<(u64, Record<T>)> = self
            .docs
            .iter()
            .filter(|entry| predicate(&entry.value().doc))
            .map(|entry| {
                (
                    entry.value().seq,
                    Record {
                        id: entry.key().clone(),
                        doc: entry.value().doc.clone(),
                    },
                )
            })
            .collect();

        matches.sort_by_key(|(seq, _)| *seq);
        Ok(matches.into_iter().map(|(_, record)| record).collect())
    }

    async fn update(&self, id: &str, doc: T) -> Result<bool, StoreError> {
        let _guard = self.writes.lock().await;
        Ok(self.replace(id, doc))
    }

    async fn insert_unless(&self, doc: T, conflict: Predicate<'_, T>) -> Result<Option<String>, StoreError> {
        let _guard = self.writes.lock().await;
        if self.any_other(None, conflict) {
            return Ok(None);
        }
        Ok(Some(self.put(doc)))
    }

    async fn update_unless(
        &self,
        id: &str,
        doc: T,
        conflict: Predicate<'_, T>,
    ) -> Result<WriteOutcome, StoreError> {
        let _guard = self.writes.lock().await;
        if !self.docs.contains_key(id) {
            return Ok(WriteOutcome::Missing);
        }
        if self.any_other(Some(id), conflict) {
            return Ok(WriteOutcome::Conflict);
        }
        if self.replace(id, doc) {
            Ok(WriteOutcome::Written)
        } else {
            Ok(WriteOutcome::Missing)
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.writes.lock().await;
        Ok(self.docs.remove(id).is_some())
    }
}
