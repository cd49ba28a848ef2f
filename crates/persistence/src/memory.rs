//! In-memory retry queue

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::queue::{bump_attempts, push_unique, remove_by_id, PendingLead, RetryQueue};
use crate::PersistenceError;

/// Retry queue held in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryRetryQueue {
    leads: RwLock<Vec<PendingLead>>,
}

impl InMemoryRetryQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RetryQueue for InMemoryRetryQueue {
    async fn enqueue(&self, lead: PendingLead) -> Result<bool, PersistenceError> {
        Ok(push_unique(&mut self.leads.write(), lead))
    }

    async fn pending(&self) -> Result<Vec<PendingLead>, PersistenceError> {
        Ok(self.leads.read().clone())
    }

    async fn remove(&self, id: Uuid) -> Result<bool, PersistenceError> {
        Ok(remove_by_id(&mut self.leads.write(), id))
    }

    async fn record_failure(
        &self,
        id: Uuid,
        error: &str,
    ) -> Result<Option<u32>, PersistenceError> {
        Ok(bump_attempts(&mut self.leads.write(), id, error))
    }

    async fn len(&self) -> Result<usize, PersistenceError> {
        Ok(self.leads.read().len())
    }

    fn is_durable(&self) -> bool {
        false
    }
}
