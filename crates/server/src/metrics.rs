//! Prometheus metrics

use axum::{
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::time::Instant;

use roi_quiz_core::CalculationResult;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder. Safe to call more than once; later calls
/// return the handle from the first.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if let Some(handle) = HANDLE.get() {
        return Some(handle.clone());
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let handle = HANDLE.get_or_init(|| handle);
            Some(handle.clone())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install Prometheus recorder");
            None
        }
    }
}

/// GET /metrics
pub async fn metrics_handler() -> Response {
    match HANDLE.get() {
        Some(handle) => (
            [("content-type", "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics disabled").into_response(),
    }
}

pub fn record_request(route: &str, method: &str, status: u16, elapsed_secs: f64) {
    metrics::counter!(
        "roi_quiz_http_requests_total",
        "route" => route.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "roi_quiz_http_request_duration_seconds",
        "route" => route.to_string()
    )
    .record(elapsed_secs);
}

pub fn record_calculation(result: &CalculationResult) {
    metrics::counter!(
        "roi_quiz_calculations_total",
        "billing" => result.plan.billing_model.as_key(),
        "term" => result.plan.contract_term.as_key(),
        "defaulted" => if result.defaulted.is_empty() { "false" } else { "true" }
    )
    .increment(1);
    metrics::histogram!("roi_quiz_net_monthly_profit_dollars")
        .record(result.per_clinic.net_monthly_profit as f64);
}

pub fn record_error(kind: &'static str) {
    metrics::counter!("roi_quiz_errors_total", "kind" => kind).increment(1);
}

/// Route-level middleware counting requests by matched route
pub async fn track_requests(req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let method = req.method().to_string();
    let started = Instant::now();

    let response = next.run(req).await;
    record_request(
        &route,
        &method,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}
