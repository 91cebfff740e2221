//! Route-level error kinds and their JSON envelope.
//!
//! Every failure a handler can produce ends up here and is rendered as
//! `{ "error": "...", "detail": "..." }`. Nothing below a handler panics or
//! leaks an internal error chain to the client.

use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::pagespeed::UpstreamError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A required query parameter is absent or empty.
    #[error("Missing {0} parameter")]
    MissingInput(&'static str),

    #[error("Invalid strategy parameter")]
    InvalidStrategy(String),

    /// The query string could not be decoded at all.
    #[error("Invalid query parameters")]
    InvalidQuery(String),

    /// A credential the route depends on is not configured. Holds the
    /// environment variable name.
    #[error("Server misconfigured: missing {0}")]
    ServerMisconfigured(&'static str),

    #[error("Forbidden")]
    Unauthorized,

    #[error("Internal error while calling PageSpeed API")]
    UpstreamFailure(#[from] UpstreamError),
}

/// JSON error body returned to clients.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingInput(_) | ApiError::InvalidStrategy(_) | ApiError::InvalidQuery(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ServerMisconfigured(_) | ApiError::UpstreamFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Unauthorized => StatusCode::FORBIDDEN,
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            ApiError::InvalidStrategy(value) => {
                Some(format!("expected mobile or desktop, got {value:?}"))
            }
            ApiError::InvalidQuery(reason) => Some(reason.clone()),
            ApiError::UpstreamFailure(e) => Some(e.to_string()),
            _ => None,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
            detail: self.detail(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidQuery(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::ServerMisconfigured(var) => {
                tracing::error!(env = %var, "Required credential not set in the environment");
            }
            ApiError::UpstreamFailure(e) => {
                tracing::error!(error = %e, "PageSpeed call failed");
            }
            ApiError::Unauthorized => tracing::debug!("Rejected request with bad secret"),
            _ => {}
        }
        (self.status(), axum::Json(self.body())).into_response()
    }
}
