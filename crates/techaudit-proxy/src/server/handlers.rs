//! Route handlers. Each one validates its query, runs one audit through
//! [`AuditProxy`](crate::audit::AuditProxy), and serializes the report.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Serialize;
use tracing::Instrument;

use super::AppState;
use crate::audit::{AuditQuery, AuditRequest};
use crate::error::ApiError;
use crate::request_id::RequestId;

/// GET /pagespeed-audit (also served as /audit).
pub async fn handle_audit(
    State(state): State<Arc<AppState>>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    query: Result<Query<AuditQuery>, QueryRejection>,
) -> Response {
    let request = match validate(query) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    let report = state.audit.audit_report(request.clone(), &request_id);
    traced("pagespeed-audit", &request_id, &request, report).await
}

/// GET /pagespeed-core-web-vitals
pub async fn handle_core_web_vitals(
    State(state): State<Arc<AppState>>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    query: Result<Query<AuditQuery>, QueryRejection>,
) -> Response {
    let request = match validate(query) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    let report = state.audit.core_web_vitals_report(request.clone(), &request_id);
    traced("pagespeed-core-web-vitals", &request_id, &request, report).await
}

/// GET /pagespeed-seo
pub async fn handle_seo(
    State(state): State<Arc<AppState>>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    query: Result<Query<AuditQuery>, QueryRejection>,
) -> Response {
    let request = match validate(query) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    let report = state.audit.seo_report(request.clone(), &request_id);
    traced("pagespeed-seo", &request_id, &request, report).await
}

/// GET /pagespeed-screenshot
pub async fn handle_screenshot(
    State(state): State<Arc<AppState>>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    query: Result<Query<AuditQuery>, QueryRejection>,
) -> Response {
    let request = match validate(query) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    let report = state.audit.screenshot_report(request.clone(), &request_id);
    traced("pagespeed-screenshot", &request_id, &request, report).await
}

/// An undecodable query string gets the same JSON envelope as a missing `url`.
fn validate(query: Result<Query<AuditQuery>, QueryRejection>) -> Result<AuditRequest, ApiError> {
    let Query(query) = query?;
    query.validate()
}

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Await `report` inside an `audit_request` span and turn the outcome into a
/// JSON response, recording status and latency on the span.
async fn traced<T, F>(
    route: &'static str,
    request_id: &str,
    request: &AuditRequest,
    report: F,
) -> Response
where
    T: Serialize,
    F: Future<Output = Result<T, ApiError>>,
{
    let span = techaudit_tracing::audit_request_span!(request_id, route, request.strategy);
    span.record("target_url", request.target_url.as_str());
    let start = Instant::now();

    let response = match report.instrument(span.clone()).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => span.in_scope(|| e.into_response()),
    };

    span.record("status", response.status().as_u16());
    span.record("latency_ms", start.elapsed().as_millis() as u64);
    response
}
