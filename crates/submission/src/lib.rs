//! Lead submission
//!
//! Builds the lead payload from the visitor's answers, contact details and
//! calculated results, posts it to the lead capture endpoint, and queues a
//! reduced contact record for a later retry when delivery fails. The results
//! are returned either way.

pub mod error;
pub mod payload;
pub mod service;
pub mod submitter;

pub use error::SubmissionError;
pub use payload::{LeadMetrics, LeadPayload, LeadSubmission, RetryPayload};
pub use service::{ReplayReport, SubmissionOutcome, SubmissionService};
pub use submitter::{DeliveryReceipt, HttpLeadSubmitter, LeadSubmitter, QueueOnlySubmitter};
