//! Application State
//!
//! Shared state across all handlers.

use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;

use roi_quiz_config::{RetryQueueBackend, RetryQueueConfig, Settings, SubmissionConfig};
use roi_quiz_core::{ConfigDrivenCalculator, RoiCalculator};
use roi_quiz_persistence::{FileRetryQueue, InMemoryRetryQueue, RetryQueue};
use roi_quiz_submission::{
    HttpLeadSubmitter, LeadSubmitter, QueueOnlySubmitter, SubmissionService,
};

use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Settings>>,
    pub calculator: Arc<dyn RoiCalculator>,
    pub submissions: SubmissionService,
    submitter_name: Arc<str>,
}

impl AppState {
    /// Standard calculator, retry queue and submitter as configured
    pub fn from_settings(config: Settings) -> Result<Self, ServerError> {
        let calculator: Arc<dyn RoiCalculator> = Arc::new(ConfigDrivenCalculator::standard());
        let queue = build_retry_queue(&config.retry_queue);
        let submitter = build_submitter(&config.submission)?;
        Ok(Self::with_components(config, calculator, submitter, queue))
    }

    pub fn with_components(
        config: Settings,
        calculator: Arc<dyn RoiCalculator>,
        submitter: Arc<dyn LeadSubmitter>,
        queue: Arc<dyn RetryQueue>,
    ) -> Self {
        let submitter_name: Arc<str> = Arc::from(submitter.name());
        Self {
            config: Arc::new(RwLock::new(config)),
            submissions: SubmissionService::new(calculator.clone(), submitter, queue),
            calculator,
            submitter_name,
        }
    }

    /// Get a read guard to the current configuration
    pub fn get_config(&self) -> parking_lot::RwLockReadGuard<'_, Settings> {
        self.config.read()
    }

    pub fn submitter_name(&self) -> &str {
        &self.submitter_name
    }

    pub fn retry_queue(&self) -> &Arc<dyn RetryQueue> {
        self.submissions.queue()
    }
}

pub fn build_retry_queue(config: &RetryQueueConfig) -> Arc<dyn RetryQueue> {
    match config.backend {
        RetryQueueBackend::File => {
            tracing::info!(path = %config.path, "Using file-backed retry queue");
            Arc::new(FileRetryQueue::new(PathBuf::from(&config.path)))
        }
        RetryQueueBackend::Memory => {
            tracing::warn!("Using in-memory retry queue; queued leads are lost on restart");
            Arc::new(InMemoryRetryQueue::new())
        }
    }
}

/// HTTP submitter when an endpoint is configured, otherwise queue-only
pub fn build_submitter(config: &SubmissionConfig) -> Result<Arc<dyn LeadSubmitter>, ServerError> {
    let submitter = HttpLeadSubmitter::from_config(config)
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    Ok(match submitter {
        Some(http) => {
            tracing::info!(endpoint = %http.endpoint(), "Lead submission enabled");
            Arc::new(http)
        }
        None => {
            tracing::warn!("No lead endpoint configured; leads will only be queued");
            Arc::new(QueueOnlySubmitter)
        }
    })
}
