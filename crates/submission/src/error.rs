use roi_quiz_core::ValidationIssue;
use roi_quiz_persistence::PersistenceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Lead endpoint timed out")]
    Timeout,

    #[error("Rate limited")]
    RateLimited,

    #[error("Lead endpoint rejected submission with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No lead endpoint configured")]
    NotConfigured,

    #[error("Invalid lead: {}", format_issues(.0))]
    InvalidLead(Vec<ValidationIssue>),

    #[error("Retry queue error: {0}")]
    Queue(#[from] PersistenceError),
}

impl SubmissionError {
    /// Whether a later attempt could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionFailed(_) | Self::Timeout | Self::RateLimited | Self::NotConfigured => {
                true
            }
            Self::Rejected { status, .. } => *status >= 500,
            Self::InvalidResponse(_) | Self::InvalidLead(_) | Self::Queue(_) => false,
        }
    }
}

impl From<reqwest::Error> for SubmissionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SubmissionError::Timeout
        } else if err.is_decode() {
            SubmissionError::InvalidResponse(err.to_string())
        } else {
            SubmissionError::ConnectionFailed(err.to_string())
        }
    }
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
