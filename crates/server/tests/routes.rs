//! Router tests driven through `tower::ServiceExt::oneshot`

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use roi_quiz_config::Settings;
use roi_quiz_core::ConfigDrivenCalculator;
use roi_quiz_persistence::{FileRetryQueue, InMemoryRetryQueue, RetryQueue};
use roi_quiz_server::{create_router, init_metrics, AppState};
use roi_quiz_submission::QueueOnlySubmitter;

fn app_with_queue(queue: Arc<dyn RetryQueue>) -> Router {
    let state = AppState::with_components(
        Settings::default(),
        Arc::new(ConfigDrivenCalculator::standard()),
        Arc::new(QueueOnlySubmitter),
        queue,
    );
    create_router(state)
}

fn app() -> Router {
    app_with_queue(Arc::new(InMemoryRetryQueue::new()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

fn lead_body() -> Value {
    json!({
        "answers": {
            "providers": "1–5",
            "preferredPricing": "Flexible",
            "billingModel": "per-use",
            "unansweredCalls": "50"
        },
        "contact": {
            "firstName": "Priya",
            "lastName": "Shah",
            "email": "priya@bayside.clinic",
            "phone": "0400 111 222",
            "role": "Practice Manager",
            "state": "Western Australia (WA)"
        },
        "profile": {
            "priorities": ["Reduce costs"],
            "clinicCountBand": "1-3"
        },
        "consent": {"marketing": true, "data": true, "contact": true}
    })
}

#[tokio::test]
async fn test_health_reports_queue() {
    let (status, body) = send(&app(), "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "development");
    assert_eq!(body["submitter"], "queue-only");
    assert_eq!(body["retryQueue"]["pending"], 0);
    assert_eq!(body["retryQueue"]["durable"], false);
}

#[tokio::test]
async fn test_calculate_with_defaults() {
    let (status, body) = send(&app(), "POST", "/api/roi/calculate", Some(json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    let per_clinic = &body["result"]["perClinic"];
    assert_eq!(per_clinic["annualStaffSaved"], 23100);
    assert_eq!(per_clinic["humanMonthlyCost"], 5500);
    assert_eq!(body["result"]["clinics"], 1);
    assert!(!body["result"]["defaulted"].as_array().unwrap().is_empty());
    assert!(body.get("view").is_none());
}

#[tokio::test]
async fn test_calculate_with_view() {
    let answers = json!({"providers": "6–10", "preferredPricing": "24-month contract", "billingModel": "fixed"});
    let (status, body) = send(
        &app(),
        "POST",
        "/api/roi/calculate?period=annual",
        Some(answers),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["perClinic"]["monthlyAiCost"], 3499);
    assert_eq!(body["view"]["period"], "annual");
}

#[tokio::test]
async fn test_calculate_rejects_unknown_period() {
    let (status, body) = send(
        &app(),
        "POST",
        "/api/roi/calculate?period=weekly",
        Some(json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("weekly"));
}

#[tokio::test]
async fn test_validate_reports_form_rules() {
    let (status, body) = send(
        &app(),
        "POST",
        "/api/roi/validate",
        Some(json!({
            "answers": {
                "providers": "1–5",
                "preferredPricing": "Flexible",
                "billingModel": "per-use",
                "callVolume": "20",
                "unansweredCalls": "30",
                "afterHoursCalls": "5",
                "noShowRate": "6",
                "avgRevenuePerAppointment": "80",
                "monthlyWage": "5000"
            }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    let issues = body["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["field"], "unansweredCalls");
    assert_eq!(issues[0]["problem"]["kind"], "exceedsCallVolume");
}

#[tokio::test]
async fn test_lead_is_queued_without_endpoint() {
    let app = app();
    let (status, body) = send(&app, "POST", "/api/leads?period=monthly", Some(lead_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivered"], false);
    assert_eq!(body["queued"], true);
    assert_eq!(body["result"]["perClinic"]["monthlyAiCost"], 763);
    assert_eq!(body["view"]["period"], "monthly");
    assert!(body["submissionId"].is_string());

    let (_, health) = send(&app, "GET", "/health", None).await;
    assert_eq!(health["retryQueue"]["pending"], 1);

    let (status, report) = send(&app, "POST", "/api/leads/replay", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["attempted"], 1);
    assert_eq!(report["failed"], 1);
    assert_eq!(report["remaining"], 1);
}

#[tokio::test]
async fn test_incomplete_lead_is_unprocessable() {
    let mut body = lead_body();
    body["consent"]["data"] = json!(false);

    let (status, response) = send(&app(), "POST", "/api/leads", Some(body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["issues"][0]["field"], "consentData");
}

#[tokio::test]
async fn test_lead_survives_in_file_queue() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pending.json");

    let app = app_with_queue(Arc::new(FileRetryQueue::new(&path)));
    let (status, body) = send(&app, "POST", "/api/leads", Some(lead_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["queued"], true);

    let reopened = FileRetryQueue::new(&path);
    let pending = reopened.pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].contact.email, "priya@bayside.clinic");
}

#[tokio::test]
async fn test_questionnaire_and_pricing() {
    let app = app();

    let (status, body) = send(&app, "GET", "/api/questionnaire", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"].as_array().unwrap().len(), 13);
    assert_eq!(body["maxPriorities"], 3);

    let (status, body) = send(&app, "GET", "/api/pricing", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pricing"]["subscriptionFee"], 499.0);
    assert_eq!(body["assumptions"]["staffingReductionRate"], 0.35);
}

#[tokio::test]
async fn test_quiz_navigation() {
    let app = app();

    let (status, start) = send(&app, "GET", "/api/quiz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(start["onLeadStep"], false);
    assert_eq!(start["progressPercent"], 7);

    // Role is unanswered, so the first step cannot advance
    let (status, body) = send(&app, "POST", "/api/quiz/next", Some(start["session"].clone())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!body["issues"].as_array().unwrap().is_empty());

    let (status, back) = send(&app, "POST", "/api/quiz/back", Some(start["session"].clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(back["session"], start["session"]);
}

#[tokio::test]
async fn test_quiz_rejects_out_of_range_step() {
    let app = app();
    let (_, start) = send(&app, "GET", "/api/quiz", None).await;

    let mut session = start["session"].clone();
    session["step"]["index"] = json!(1000);

    for uri in ["/api/quiz/next", "/api/quiz/back"] {
        let (status, _) = send(&app, "POST", uri, Some(session.clone())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", uri);
    }
}

#[tokio::test]
async fn test_metrics_endpoint() {
    init_metrics();
    let app = app();
    send(&app, "GET", "/health", None).await;

    let (status, body) = send(&app, "GET", "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().contains("roi_quiz_http_requests_total"));
}
