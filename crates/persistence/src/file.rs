//! File-backed retry queue
//!
//! The queue is a single JSON array. Every change rewrites the whole file
//! through a temporary file in the same directory followed by a rename, so a
//! crash mid-write leaves either the old queue or the new one on disk.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::queue::{bump_attempts, push_unique, remove_by_id, PendingLead, RetryQueue};
use crate::PersistenceError;

pub struct FileRetryQueue {
    path: PathBuf,
    /// Serialises read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileRetryQueue {
    /// Queue stored at `path`. The file and its parent directory are created
    /// on first write; a missing file reads as an empty queue.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<PendingLead>, PersistenceError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PersistenceError::io(&self.path, e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|e| PersistenceError::InvalidData {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    async fn store(&self, leads: &[PendingLead]) -> Result<(), PersistenceError> {
        let bytes = serde_json::to_vec_pretty(leads)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomically(&path, &bytes))
            .await
            .map_err(|e| PersistenceError::Task(e.to_string()))?
    }

    /// Load, apply `change`, and write back if it reports a modification
    async fn update<T, F>(&self, change: F) -> Result<T, PersistenceError>
    where
        F: FnOnce(&mut Vec<PendingLead>) -> (T, bool) + Send,
    {
        let _guard = self.lock.lock().await;
        let mut leads = self.load().await?;
        let (result, modified) = change(&mut leads);
        if modified {
            self.store(&leads).await?;
        }
        Ok(result)
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), PersistenceError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| PersistenceError::io(dir, e))?;

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| PersistenceError::io(dir, e))?;
    temp.write_all(bytes)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| PersistenceError::io(temp.path(), e))?;
    temp.persist(path)
        .map_err(|e| PersistenceError::io(path, e.error))?;
    Ok(())
}

#[async_trait]
impl RetryQueue for FileRetryQueue {
    async fn enqueue(&self, lead: PendingLead) -> Result<bool, PersistenceError> {
        let lead_id = lead.id;
        let added = self
            .update(|leads| {
                let added = push_unique(leads, lead);
                (added, added)
            })
            .await?;
        if added {
            tracing::info!(lead_id = %lead_id, path = %self.path.display(), "Lead queued for retry");
        }
        Ok(added)
    }

    async fn pending(&self) -> Result<Vec<PendingLead>, PersistenceError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    async fn remove(&self, id: Uuid) -> Result<bool, PersistenceError> {
        self.update(|leads| {
            let removed = remove_by_id(leads, id);
            (removed, removed)
        })
        .await
    }

    async fn record_failure(
        &self,
        id: Uuid,
        error: &str,
    ) -> Result<Option<u32>, PersistenceError> {
        self.update(|leads| {
            let attempts = bump_attempts(leads, id, error);
            (attempts, attempts.is_some())
        })
        .await
    }

    async fn len(&self) -> Result<usize, PersistenceError> {
        Ok(self.pending().await?.len())
    }

    fn is_durable(&self) -> bool {
        true
    }
}
