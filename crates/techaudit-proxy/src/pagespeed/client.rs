//! Single outbound call to the PageSpeed Insights `runPagespeed` endpoint.

use std::time::{Duration, Instant};

use serde_json::Value;
use thiserror::Error;
use tracing::Instrument;

use super::result::LighthouseResult;
use crate::config::UpstreamConfig;
use crate::request_id::REQUEST_ID_HEADER;
use crate::strategy::Strategy;

/// Lighthouse category requested from the upstream audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Performance,
    Seo,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Performance => "performance",
            Category::Seo => "seo",
        }
    }
}

/// What a route asks the upstream audit to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditOptions {
    pub categories: &'static [Category],
    pub screenshot: bool,
}

impl AuditOptions {
    pub const FULL: Self = Self {
        categories: &[Category::Performance, Category::Seo],
        screenshot: true,
    };

    pub const CORE_WEB_VITALS: Self = Self {
        categories: &[Category::Performance],
        screenshot: false,
    };

    pub const SEO: Self = Self {
        categories: &[Category::Seo],
        screenshot: false,
    };

    /// The final screenshot is produced by the performance run.
    pub const SCREENSHOT: Self = Self {
        categories: &[Category::Performance],
        screenshot: true,
    };
}

/// Why the upstream call did not yield a usable `lighthouseResult`.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("PageSpeed did not answer within {0}s")]
    Timeout(u64),

    #[error("could not reach PageSpeed: {0}")]
    Connection(String),

    #[error(
        "PageSpeed returned HTTP {status}{}",
        .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
    )]
    Status { status: u16, message: Option<String> },

    #[error("PageSpeed response is not valid JSON: {0}")]
    InvalidBody(String),

    #[error("PageSpeed response has no lighthouseResult")]
    MissingResult,
}

/// Thin wrapper over a shared `reqwest::Client` bound to one upstream URL.
#[derive(Clone)]
pub struct PageSpeedClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl PageSpeedClient {
    pub fn new(client: reqwest::Client, config: &UpstreamConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Run one audit and return its `lighthouseResult`.
    ///
    /// No retries. A timeout, transport error, non-2xx status, unparsable body
    /// or missing result container all map to an [`UpstreamError`].
    pub async fn run_audit(
        &self,
        api_key: &str,
        target_url: &str,
        strategy: Strategy,
        options: AuditOptions,
        request_id: &str,
    ) -> Result<LighthouseResult, UpstreamError> {
        let span = techaudit_tracing::upstream_call_span!(request_id, strategy);
        let start = Instant::now();

        async {
            let query = build_query(api_key, target_url, strategy, options);

            let result = self
                .client
                .get(&self.base_url)
                .query(&query)
                .header(REQUEST_ID_HEADER, request_id)
                .timeout(self.timeout)
                .send()
                .await;

            let resp = match result {
                Ok(resp) => resp,
                Err(e) => {
                    tracing::Span::current()
                        .record("latency_ms", start.elapsed().as_millis() as u64);
                    return Err(self.transport_error(e));
                }
            };

            let status = resp.status();
            let body = resp.bytes().await.map_err(|e| self.transport_error(e));

            let latency = start.elapsed().as_millis() as u64;
            tracing::Span::current().record("latency_ms", latency);
            tracing::Span::current().record("status", status.as_u16());
            tracing::info!(status = status.as_u16(), latency_ms = latency, "PageSpeed call complete");

            let body = body?;

            if !status.is_success() {
                let message = serde_json::from_slice::<Value>(&body)
                    .ok()
                    .and_then(|v| error_message(&v));
                return Err(UpstreamError::Status {
                    status: status.as_u16(),
                    message,
                });
            }

            let parsed: Value = serde_json::from_slice(&body)
                .map_err(|e| UpstreamError::InvalidBody(e.to_string()))?;

            LighthouseResult::from_response(parsed).ok_or(UpstreamError::MissingResult)
        }
        .instrument(span)
        .await
    }

    fn transport_error(&self, e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            UpstreamError::Timeout(self.timeout.as_secs())
        } else {
            // the request URL carries the API key
            UpstreamError::Connection(e.without_url().to_string())
        }
    }
}

/// Query pairs for `runPagespeed`. `category` repeats once per category.
fn build_query<'a>(
    api_key: &'a str,
    target_url: &'a str,
    strategy: Strategy,
    options: AuditOptions,
) -> Vec<(&'static str, &'a str)> {
    let mut query = vec![("url", target_url), ("strategy", strategy.as_str())];
    for category in options.categories {
        query.push(("category", category.as_str()));
    }
    if options.screenshot {
        query.push(("screenshot", "true"));
    }
    query.push(("key", api_key));
    query
}

/// Google APIs report failures as `{ "error": { "message": "..." } }`.
fn error_message(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}
