//! Span builder helpers for proxy instrumentation.

/// Create a span for one inbound audit request.
///
/// Usage: `let span = audit_request_span!(request_id, "/pagespeed-audit", strategy);`
///
/// `status` and `latency_ms` are recorded by the handler once the response is built.
#[macro_export]
macro_rules! audit_request_span {
    ($request_id:expr, $route:expr, $strategy:expr) => {
        tracing::info_span!(
            "audit_request",
            request_id = %$request_id,
            route = %$route,
            strategy = %$strategy,
            target_url = tracing::field::Empty,
            status = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
        )
    };
}

/// Create a span for the single outbound call to the audit API.
#[macro_export]
macro_rules! upstream_call_span {
    ($request_id:expr, $strategy:expr) => {
        tracing::info_span!(
            "upstream_call",
            request_id = %$request_id,
            strategy = %$strategy,
            status = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
        )
    };
}
