//! Retry queue interface and the queue operations shared by the backends

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use roi_quiz_core::RetryContact;

use crate::PersistenceError;

/// A lead waiting to be redelivered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingLead {
    /// Client submission id of the original attempt
    pub id: Uuid,
    pub contact: RetryContact,
    pub queued_at: DateTime<Utc>,
    /// Failed delivery attempts, including the original submission
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl PendingLead {
    pub fn new(id: Uuid, contact: RetryContact) -> Self {
        Self {
            id,
            contact,
            queued_at: Utc::now(),
            attempts: 1,
            last_error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.last_error = Some(error.into());
        self
    }
}

/// FIFO of undelivered leads
///
/// Entries are never dropped on failure; there is no attempt cap.
#[async_trait]
pub trait RetryQueue: Send + Sync {
    /// Append a lead. Returns `false` when a lead with the same id is
    /// already queued, leaving the queue unchanged.
    async fn enqueue(&self, lead: PendingLead) -> Result<bool, PersistenceError>;

    /// All pending leads, oldest first
    async fn pending(&self) -> Result<Vec<PendingLead>, PersistenceError>;

    /// Remove a delivered lead. Returns `false` if it was not queued.
    async fn remove(&self, id: Uuid) -> Result<bool, PersistenceError>;

    /// Count another failed attempt. Returns the new attempt count, or
    /// `None` if the lead is not queued.
    async fn record_failure(&self, id: Uuid, error: &str)
        -> Result<Option<u32>, PersistenceError>;

    async fn len(&self) -> Result<usize, PersistenceError>;

    async fn is_empty(&self) -> Result<bool, PersistenceError> {
        Ok(self.len().await? == 0)
    }

    /// Whether queued leads survive a restart
    fn is_durable(&self) -> bool;
}

pub(crate) fn push_unique(leads: &mut Vec<PendingLead>, lead: PendingLead) -> bool {
    if leads.iter().any(|queued| queued.id == lead.id) {
        tracing::debug!(lead_id = %lead.id, "Lead already queued");
        return false;
    }
    leads.push(lead);
    true
}

pub(crate) fn remove_by_id(leads: &mut Vec<PendingLead>, id: Uuid) -> bool {
    let before = leads.len();
    leads.retain(|lead| lead.id != id);
    leads.len() != before
}

pub(crate) fn bump_attempts(leads: &mut [PendingLead], id: Uuid, error: &str) -> Option<u32> {
    let lead = leads.iter_mut().find(|lead| lead.id == id)?;
    lead.attempts = lead.attempts.saturating_add(1);
    lead.last_error = Some(error.to_string());
    Some(lead.attempts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead(email: &str) -> PendingLead {
        PendingLead::new(
            Uuid::new_v4(),
            RetryContact {
                email: email.to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_push_unique_rejects_duplicate_ids() {
        let mut leads = Vec::new();
        let first = lead("a@example.com");
        assert!(push_unique(&mut leads, first.clone()));
        assert!(!push_unique(&mut leads, first));
        assert_eq!(leads.len(), 1);
    }

    #[test]
    fn test_bump_attempts() {
        let mut leads = vec![lead("a@example.com")];
        let id = leads[0].id;

        assert_eq!(bump_attempts(&mut leads, id, "timeout"), Some(2));
        assert_eq!(leads[0].last_error.as_deref(), Some("timeout"));
        assert_eq!(bump_attempts(&mut leads, Uuid::new_v4(), "timeout"), None);
    }

    #[test]
    fn test_wire_format() {
        let lead = lead("a@example.com").with_error("HTTP 502");
        let json = serde_json::to_value(&lead).unwrap();

        assert_eq!(json["contact"]["email"], "a@example.com");
        assert_eq!(json["attempts"], 1);
        assert_eq!(json["lastError"], "HTTP 502");
        assert!(json["queuedAt"].is_string());
    }
}
