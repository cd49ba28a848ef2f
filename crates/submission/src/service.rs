//! Submission flow: calculate, deliver, fall back to the retry queue

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use roi_quiz_core::{validate_contact, CalculationResult, RoiCalculator};
use roi_quiz_persistence::{PendingLead, RetryQueue};

use crate::payload::{LeadPayload, LeadSubmission};
use crate::submitter::LeadSubmitter;
use crate::SubmissionError;

/// What happened to a submitted lead
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub submission_id: Uuid,
    pub result: CalculationResult,
    /// The endpoint accepted the lead
    pub delivered: bool,
    /// The endpoint reported a CRM sync
    pub synced: bool,
    /// The lead is waiting in the retry queue
    pub queued: bool,
}

/// Result of one pass over the retry queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
    pub remaining: usize,
}

#[derive(Clone)]
pub struct SubmissionService {
    calculator: Arc<dyn RoiCalculator>,
    submitter: Arc<dyn LeadSubmitter>,
    queue: Arc<dyn RetryQueue>,
}

impl SubmissionService {
    pub fn new(
        calculator: Arc<dyn RoiCalculator>,
        submitter: Arc<dyn LeadSubmitter>,
        queue: Arc<dyn RetryQueue>,
    ) -> Self {
        Self {
            calculator,
            submitter,
            queue,
        }
    }

    pub fn calculator(&self) -> &Arc<dyn RoiCalculator> {
        &self.calculator
    }

    pub fn queue(&self) -> &Arc<dyn RetryQueue> {
        &self.queue
    }

    /// Calculate and deliver a lead.
    ///
    /// Only an incomplete lead step is an error. Delivery failures put the
    /// contact record in the retry queue and the results are returned
    /// regardless; a queue failure is logged and reported as `queued: false`.
    pub async fn submit(
        &self,
        submission: LeadSubmission,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        let issues = validate_contact(&submission.contact, &submission.consent);
        if !issues.is_empty() {
            metrics::counter!("roi_quiz_leads_total", "outcome" => "invalid").increment(1);
            return Err(SubmissionError::InvalidLead(issues));
        }

        let submission_id = submission.client_submission_id.unwrap_or_else(Uuid::new_v4);
        let result = self.calculator.calculate(&submission.answers);
        let payload = LeadPayload::build(submission_id, &submission, &result);

        match self.submitter.submit(&payload).await {
            Ok(receipt) => {
                tracing::info!(
                    lead_id = %submission_id,
                    synced = receipt.synced,
                    submitter = self.submitter.name(),
                    "Lead delivered"
                );
                let outcome = if receipt.synced { "synced" } else { "delivered" };
                metrics::counter!("roi_quiz_leads_total", "outcome" => outcome).increment(1);

                Ok(SubmissionOutcome {
                    submission_id,
                    result,
                    delivered: true,
                    synced: receipt.synced,
                    queued: false,
                })
            }
            Err(err) => {
                tracing::warn!(
                    lead_id = %submission_id,
                    error = %err,
                    submitter = self.submitter.name(),
                    "Lead delivery failed, queueing for retry"
                );

                let pending = PendingLead::new(submission_id, submission.contact.retry_contact())
                    .with_error(err.to_string());
                let queued = match self.queue.enqueue(pending).await {
                    Ok(added) => {
                        if !added {
                            tracing::debug!(lead_id = %submission_id, "Lead already queued");
                        }
                        true
                    }
                    Err(queue_err) => {
                        tracing::error!(
                            lead_id = %submission_id,
                            error = %queue_err,
                            "Failed to queue lead"
                        );
                        false
                    }
                };

                let outcome = if queued { "queued" } else { "lost" };
                metrics::counter!("roi_quiz_leads_total", "outcome" => outcome).increment(1);

                Ok(SubmissionOutcome {
                    submission_id,
                    result,
                    delivered: false,
                    synced: false,
                    queued,
                })
            }
        }
    }

    /// Redeliver every queued lead once, oldest first
    pub async fn replay_pending(&self) -> Result<ReplayReport, SubmissionError> {
        let pending = self.queue.pending().await?;
        let mut report = ReplayReport {
            attempted: pending.len(),
            ..Default::default()
        };

        for lead in &pending {
            match self.submitter.resubmit(lead).await {
                Ok(receipt) => {
                    // Delivered but still queued counts as failed; it will be resent
                    if let Err(e) = self.queue.remove(lead.id).await {
                        report.failed += 1;
                        tracing::error!(
                            lead_id = %lead.id,
                            error = %e,
                            "Delivered lead could not be removed from retry queue"
                        );
                        metrics::counter!("roi_quiz_replays_total", "outcome" => "failed")
                            .increment(1);
                        continue;
                    }
                    report.delivered += 1;
                    tracing::info!(
                        lead_id = %lead.id,
                        attempts = lead.attempts,
                        synced = receipt.synced,
                        "Queued lead delivered"
                    );
                    metrics::counter!("roi_quiz_replays_total", "outcome" => "delivered")
                        .increment(1);
                }
                Err(err) => {
                    report.failed += 1;
                    let attempts = match self.queue.record_failure(lead.id, &err.to_string()).await {
                        Ok(attempts) => attempts,
                        Err(e) => {
                            tracing::error!(
                                lead_id = %lead.id,
                                error = %e,
                                "Failed to record delivery failure"
                            );
                            None
                        }
                    };
                    tracing::warn!(
                        lead_id = %lead.id,
                        attempts = attempts.unwrap_or(lead.attempts),
                        error = %err,
                        "Queued lead still undeliverable"
                    );
                    metrics::counter!("roi_quiz_replays_total", "outcome" => "failed")
                        .increment(1);
                }
            }
        }

        report.remaining = self.queue.len().await?;
        if report.attempted > 0 {
            tracing::info!(
                attempted = report.attempted,
                delivered = report.delivered,
                failed = report.failed,
                remaining = report.remaining,
                "Retry queue replayed"
            );
        }
        Ok(report)
    }

    pub async fn pending_count(&self) -> Result<usize, SubmissionError> {
        Ok(self.queue.len().await?)
    }
}
