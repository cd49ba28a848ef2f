//! ROI Quiz Server
//!
//! HTTP endpoints for the ROI calculator, the quiz definition and lead capture.

pub mod http;
pub mod metrics;
pub mod state;

pub use crate::http::create_router;
pub use crate::metrics::{init_metrics, record_calculation, record_error, record_request};
pub use crate::state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use roi_quiz_core::ValidationIssue;
use roi_quiz_submission::SubmissionError;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Validation failed")]
    Validation(Vec<ValidationIssue>),

    #[error("Lead endpoint error: {0}")]
    Upstream(String),

    #[error("Retry queue error: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    fn kind(&self) -> &'static str {
        match self {
            ServerError::InvalidRequest(_) => "invalid_request",
            ServerError::Validation(_) => "validation",
            ServerError::Upstream(_) => "upstream",
            ServerError::Persistence(_) => "persistence",
            ServerError::Internal(_) => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ServerError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        err.status_code()
    }
}

impl From<SubmissionError> for ServerError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::InvalidLead(issues) => ServerError::Validation(issues),
            SubmissionError::Queue(e) => ServerError::Persistence(e.to_string()),
            other => ServerError::Upstream(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        record_error(self.kind());

        let body = match &self {
            ServerError::Validation(issues) => serde_json::json!({
                "error": self.to_string(),
                "issues": issues,
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
