//! Shared-secret gate for the protected routes.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::AppState;
use crate::config::SECRET_ENV;
use crate::error::ApiError;

/// Header the dashboard sends the secret in.
pub const SECRET_HEADER: &str = "x-techaudit-secret";

/// Route layer: reject the request unless `x-techaudit-secret` matches the
/// configured secret. Runs before any query validation.
pub async fn require_secret(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    match check_secret(state.config.auth.shared_secret.as_deref(), request.headers()) {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

/// Exact-match comparison. An unconfigured secret is a server fault, not a
/// client one.
pub fn check_secret(expected: Option<&str>, headers: &HeaderMap) -> Result<(), ApiError> {
    let expected = expected.ok_or(ApiError::ServerMisconfigured(SECRET_ENV))?;
    let supplied = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());

    if supplied == Some(expected) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}
