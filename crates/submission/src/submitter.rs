//! Lead delivery backends

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use roi_quiz_config::SubmissionConfig;
use roi_quiz_persistence::PendingLead;

use crate::payload::{LeadPayload, RetryPayload};
use crate::SubmissionError;

/// Lead capture endpoint's answer to a delivered lead
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Whether the endpoint also synced the lead to the CRM. A missing flag
    /// reads as `false`.
    #[serde(default)]
    pub synced: bool,
}

/// Lead delivery
#[async_trait]
pub trait LeadSubmitter: Send + Sync {
    /// Deliver a full lead
    async fn submit(&self, payload: &LeadPayload) -> Result<DeliveryReceipt, SubmissionError>;

    /// Redeliver a queued lead's contact record
    async fn resubmit(&self, lead: &PendingLead) -> Result<DeliveryReceipt, SubmissionError>;

    fn name(&self) -> &str;
}

/// Posts leads as JSON to the lead capture endpoint
pub struct HttpLeadSubmitter {
    client: Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl HttpLeadSubmitter {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        auth_token: Option<String>,
    ) -> Result<Self, SubmissionError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            SubmissionError::ConnectionFailed(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            auth_token,
        })
    }

    /// Build from settings. `None` when no endpoint is configured.
    pub fn from_config(config: &SubmissionConfig) -> Result<Option<Self>, SubmissionError> {
        match config.endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => Self::new(
                endpoint,
                Duration::from_millis(config.timeout_ms),
                config.auth_token.clone(),
            )
            .map(Some),
            _ => Ok(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post<T: Serialize + ?Sized + Sync>(
        &self,
        body: &T,
    ) -> Result<DeliveryReceipt, SubmissionError> {
        let mut request = self.client.post(&self.endpoint).json(body);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => SubmissionError::RateLimited,
                _ => SubmissionError::Rejected {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        response
            .json::<DeliveryReceipt>()
            .await
            .map_err(|e| SubmissionError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl LeadSubmitter for HttpLeadSubmitter {
    async fn submit(&self, payload: &LeadPayload) -> Result<DeliveryReceipt, SubmissionError> {
        tracing::debug!(
            lead_id = %payload.client_submission_id,
            endpoint = %self.endpoint,
            "Posting lead"
        );
        self.post(payload).await
    }

    async fn resubmit(&self, lead: &PendingLead) -> Result<DeliveryReceipt, SubmissionError> {
        tracing::debug!(lead_id = %lead.id, attempts = lead.attempts, "Reposting queued lead");
        self.post(&RetryPayload {
            client_submission_id: lead.id,
            contact: &lead.contact,
        })
        .await
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Used when no endpoint is configured: every lead goes to the retry queue
#[derive(Debug, Default, Clone, Copy)]
pub struct QueueOnlySubmitter;

#[async_trait]
impl LeadSubmitter for QueueOnlySubmitter {
    async fn submit(&self, _payload: &LeadPayload) -> Result<DeliveryReceipt, SubmissionError> {
        Err(SubmissionError::NotConfigured)
    }

    async fn resubmit(&self, _lead: &PendingLead) -> Result<DeliveryReceipt, SubmissionError> {
        Err(SubmissionError::NotConfigured)
    }

    fn name(&self) -> &str {
        "queue-only"
    }
}
