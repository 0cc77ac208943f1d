// common/src/store/message_log.rs
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};

use super::MessageLog;
use crate::error::StoreError;
use crate::messages::ChatEvent;

/// Chat history held in process memory
#[derive(Default)]
pub struct MemoryMessageLog {
    events: RwLock<Vec<ChatEvent>>,
}

impl MemoryMessageLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageLog for MemoryMessageLog {
    async fn append(&self, event: ChatEvent) -> Result<(), StoreError> {
        self.events.write().await.push(event);
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<ChatEvent>, StoreError> {
        Ok(self.events.read().await.clone())
    }
}

/// Chat history appended to a JSON-lines file, one event per line
pub struct JsonlMessageLog {
    path: PathBuf,
    // Serializes appends so lines never interleave
    lock: Mutex<()>,
}

impl JsonlMessageLog {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        repair_tail(&path).await?;

        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// A crash mid-append leaves a line without its newline; drop it so the next
// append starts on a fresh line
async fn repair_tail(path: &Path) -> Result<(), StoreError> {
    let contents = match tokio::fs::read(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    if contents.is_empty() || contents.ends_with(b"\n") {
        return Ok(());
    }

    let keep = contents
        .iter()
        .rposition(|byte| *byte == b'\n')
        .map_or(0, |last| last + 1);
    tracing::warn!(
        "Dropping {} byte torn tail from {}",
        contents.len() - keep,
        path.display()
    );

    let file = OpenOptions::new().write(true).open(path).await?;
    file.set_len(keep as u64).await?;
    file.sync_all().await?;
    Ok(())
}

#[async_trait]
impl MessageLog for JsonlMessageLog {
    async fn append(&self, event: ChatEvent) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(&event)?;
        line.push(b'\n');

        let _guard = self.lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<ChatEvent>, StoreError> {
        let _guard = self.lock.lock().await;
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut events = Vec::new();
        for (number, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ChatEvent>(line) {
                Ok(event) => events.push(event),
                Err(e) => {
                    tracing::warn!(
                        "Skipping unreadable line {} in {}: {}",
                        number + 1,
                        self.path.display(),
                        e
                    );
                }
            }
        }

        Ok(events)
    }
}
