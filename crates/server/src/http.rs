//! HTTP Endpoints
//!
//! REST API for the ROI quiz.

use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Json, Query, State},
    http::{HeaderValue, Method, StatusCode},
    middleware,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use roi_quiz_core::{
    questionnaire::{AUSTRALIAN_STATES, CLINIC_COUNT_BANDS, MAX_PRIORITIES},
    questions, validate_answers, validate_contact, validate_profile, CalculationResult, Consent,
    ContactDetails, Period, PracticeProfile, Question, QuestionnaireAnswers, QuizSession,
    ResultsView, ValidationIssue,
};
use roi_quiz_submission::{LeadSubmission, ReplayReport, SubmissionOutcome};

use crate::metrics::{metrics_handler, record_calculation, track_requests};
use crate::state::AppState;
use crate::ServerError;

const DEV_ORIGIN: &str = "http://localhost:3000";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let config = state.get_config();
    let cors_layer = build_cors_layer(&config.server.cors_origins, config.server.cors_enabled);
    let timeout = Duration::from_secs(config.server.timeout_seconds);
    let max_body_bytes = config.server.max_body_bytes;
    let metrics_enabled = config.observability.metrics_enabled;
    drop(config); // Release lock before building router

    let mut router: Router<AppState> = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Quiz definition and navigation
        .route("/api/questionnaire", get(questionnaire))
        .route("/api/quiz", get(start_quiz))
        .route("/api/quiz/next", post(quiz_next))
        .route("/api/quiz/back", post(quiz_back))
        // Calculator
        .route("/api/pricing", get(pricing))
        .route("/api/roi/calculate", post(calculate))
        .route("/api/roi/validate", post(validate))
        // Lead capture
        .route("/api/leads", post(submit_lead))
        .route("/api/leads/replay", post(replay_leads));

    if metrics_enabled {
        router = router.route("/metrics", get(metrics_handler));
    }

    router
        .route_layer(middleware::from_fn(track_requests))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty or all invalid, allows localhost:3000 only
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if parsed_origins.is_empty() {
        tracing::info!("No usable CORS origins configured, defaulting to {}", DEV_ORIGIN);
        return cors.allow_origin(HeaderValue::from_static(DEV_ORIGIN));
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    cors.allow_origin(parsed_origins)
}

/// Optional `?period=monthly|annual`
#[derive(Debug, Default, Deserialize)]
struct PeriodQuery {
    period: Option<String>,
}

impl PeriodQuery {
    fn parse(&self) -> Result<Option<Period>, ServerError> {
        self.period
            .as_deref()
            .map(|p| p.parse::<Period>().map_err(ServerError::InvalidRequest))
            .transpose()
    }
}

/// Health check including the retry queue backlog
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    // parking_lot guards aren't Send; read before awaiting
    let environment = state.get_config().environment.as_str();
    let queue = state.retry_queue();

    let (status, queue_check) = match queue.len().await {
        Ok(pending) => (
            StatusCode::OK,
            serde_json::json!({
                "status": "ok",
                "pending": pending,
                "durable": queue.is_durable(),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Retry queue unreadable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                serde_json::json!({
                    "status": "error",
                    "error": e.to_string(),
                }),
            )
        }
    };

    (
        status,
        Json(serde_json::json!({
            "status": if status.is_success() { "healthy" } else { "degraded" },
            "version": env!("CARGO_PKG_VERSION"),
            "environment": environment,
            "submitter": state.submitter_name(),
            "retryQueue": queue_check,
        })),
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionnaireResponse {
    questions: &'static [Question],
    max_priorities: usize,
    clinic_count_bands: &'static [&'static str],
    states: &'static [&'static str],
}

/// Question steps and the lead step's option lists
async fn questionnaire() -> Json<QuestionnaireResponse> {
    Json(QuestionnaireResponse {
        questions: questions(),
        max_priorities: MAX_PRIORITIES,
        clinic_count_bands: CLINIC_COUNT_BANDS,
        states: AUSTRALIAN_STATES,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuizState {
    session: QuizSession,
    progress_percent: u8,
    on_lead_step: bool,
    current_question: Option<&'static Question>,
    ready_to_submit: bool,
}

impl From<QuizSession> for QuizState {
    fn from(session: QuizSession) -> Self {
        Self {
            progress_percent: session.progress_percent(),
            on_lead_step: session.is_on_lead_step(),
            current_question: session.current_question(),
            ready_to_submit: session.is_ready_to_submit(),
            session,
        }
    }
}

async fn start_quiz() -> Json<QuizState> {
    Json(QuizSession::new().into())
}

/// Advance the quiz; blocked while the current step has problems
async fn quiz_next(Json(session): Json<QuizSession>) -> Result<Json<QuizState>, ServerError> {
    session
        .next()
        .map(|next| Json(next.into()))
        .map_err(ServerError::Validation)
}

async fn quiz_back(Json(session): Json<QuizSession>) -> Json<QuizState> {
    Json(session.back().into())
}

/// Price list and calculator assumptions
async fn pricing(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "pricing": state.calculator.pricing(),
        "assumptions": state.calculator.constants(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculateResponse {
    result: CalculationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    view: Option<ResultsView>,
}

/// Calculate the projection for a set of answers. Never rejects an answer;
/// anything unusable falls back to its default and is listed in `defaulted`.
async fn calculate(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
    Json(answers): Json<QuestionnaireAnswers>,
) -> Result<Json<CalculateResponse>, ServerError> {
    let period = query.parse()?;
    let result = state.calculator.calculate(&answers);
    record_calculation(&result);

    tracing::debug!(
        clinics = result.clinics,
        net_monthly = result.totals.net_monthly_profit,
        defaulted = result.defaulted.len(),
        "Calculated ROI"
    );

    Ok(Json(CalculateResponse {
        view: period.map(|p| ResultsView::new(&result, p)),
        result,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ValidateRequest {
    answers: Option<QuestionnaireAnswers>,
    contact: Option<ContactDetails>,
    profile: Option<PracticeProfile>,
    consent: Option<Consent>,
}

#[derive(Debug, Serialize)]
struct ValidateResponse {
    valid: bool,
    issues: Vec<ValidationIssue>,
}

/// Check whichever quiz sections are present the way the form does
async fn validate(Json(request): Json<ValidateRequest>) -> Json<ValidateResponse> {
    let mut issues = Vec::new();

    if let Some(answers) = &request.answers {
        issues.extend(validate_answers(answers));
    }

    let contact = request.contact.clone().unwrap_or_default();
    if let Some(profile) = &request.profile {
        issues.extend(validate_profile(&contact, profile));
    }
    if request.contact.is_some() || request.consent.is_some() {
        issues.extend(validate_contact(
            &contact,
            &request.consent.unwrap_or_default(),
        ));
    }

    Json(ValidateResponse {
        valid: issues.is_empty(),
        issues,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LeadResponse {
    #[serde(flatten)]
    outcome: SubmissionOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    view: Option<ResultsView>,
}

/// Submit a lead. Results come back whether or not delivery succeeded.
async fn submit_lead(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
    Json(submission): Json<LeadSubmission>,
) -> Result<Json<LeadResponse>, ServerError> {
    let period = query.parse()?;
    let outcome = state.submissions.submit(submission).await?;
    record_calculation(&outcome.result);

    Ok(Json(LeadResponse {
        view: period.map(|p| ResultsView::new(&outcome.result, p)),
        outcome,
    }))
}

/// Retry every queued lead once
async fn replay_leads(State(state): State<AppState>) -> Result<Json<ReplayReport>, ServerError> {
    Ok(Json(state.submissions.replay_pending().await?))
}
