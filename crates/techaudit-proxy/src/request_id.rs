//! Request ID assignment for log correlation.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

/// Header carrying the request ID, on responses to clients and on the
/// outbound PageSpeed call.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// ID assigned to one inbound request, stored in the request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Generate a new request ID (UUID v4).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Middleware: tag the request with a fresh ID and echo it on the response.
pub async fn assign(mut request: Request, next: Next) -> Response {
    let id = generate_id();
    request.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
