//! The audit operation: validate the inbound request, call PageSpeed once,
//! and shape the result for the route that asked.

use serde::Deserialize;

use crate::config::{ProxyConfig, API_KEY_ENV};
use crate::error::ApiError;
use crate::pagespeed::{
    AuditOptions, AuditReport, CoreWebVitalsReport, LighthouseResult, PageSpeedClient,
    ScreenshotReport, SeoReport,
};
use crate::strategy::Strategy;

/// Raw query parameters accepted by every audit route.
#[derive(Debug, Default, Deserialize)]
pub struct AuditQuery {
    pub url: Option<String>,
    pub strategy: Option<String>,
}

/// A validated audit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRequest {
    pub target_url: String,
    pub strategy: Strategy,
}

impl AuditQuery {
    /// `url` must be non-empty; nothing else about it is checked here, a
    /// malformed URL is left for PageSpeed to reject.
    pub fn validate(self) -> Result<AuditRequest, ApiError> {
        let target_url = self
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or(ApiError::MissingInput("url"))?;
        let strategy = Strategy::from_query(self.strategy.as_deref())?;

        Ok(AuditRequest {
            target_url,
            strategy,
        })
    }
}

/// Stateless audit front for the PageSpeed client. Cheap to clone.
#[derive(Clone)]
pub struct AuditProxy {
    client: PageSpeedClient,
    api_key: Option<String>,
    include_raw: bool,
}

impl AuditProxy {
    pub fn new(client: reqwest::Client, config: &ProxyConfig) -> Self {
        Self {
            client: PageSpeedClient::new(client, &config.upstream),
            api_key: config.upstream.api_key.clone(),
            include_raw: config.upstream.include_raw,
        }
    }

    /// Run one upstream audit for `request` with the given categories.
    pub async fn run_audit(
        &self,
        request: &AuditRequest,
        options: AuditOptions,
        request_id: &str,
    ) -> Result<LighthouseResult, ApiError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ApiError::ServerMisconfigured(API_KEY_ENV))?;

        let result = self
            .client
            .run_audit(api_key, &request.target_url, request.strategy, options, request_id)
            .await?;
        Ok(result)
    }

    /// Performance, Core Web Vitals, SEO score, screenshot and (optionally)
    /// the raw upstream document.
    pub async fn audit_report(
        &self,
        request: AuditRequest,
        request_id: &str,
    ) -> Result<AuditReport, ApiError> {
        let result = self.run_audit(&request, AuditOptions::FULL, request_id).await?;
        Ok(AuditReport::build(
            request.target_url,
            request.strategy,
            result,
            self.include_raw,
        ))
    }

    pub async fn core_web_vitals_report(
        &self,
        request: AuditRequest,
        request_id: &str,
    ) -> Result<CoreWebVitalsReport, ApiError> {
        let result = self
            .run_audit(&request, AuditOptions::CORE_WEB_VITALS, request_id)
            .await?;
        Ok(CoreWebVitalsReport::build(request.target_url, request.strategy, &result))
    }

    pub async fn seo_report(
        &self,
        request: AuditRequest,
        request_id: &str,
    ) -> Result<SeoReport, ApiError> {
        let result = self.run_audit(&request, AuditOptions::SEO, request_id).await?;
        Ok(SeoReport::build(request.target_url, request.strategy, &result))
    }

    pub async fn screenshot_report(
        &self,
        request: AuditRequest,
        request_id: &str,
    ) -> Result<ScreenshotReport, ApiError> {
        let result = self
            .run_audit(&request, AuditOptions::SCREENSHOT, request_id)
            .await?;
        Ok(ScreenshotReport::build(request.target_url, request.strategy, &result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::test_support::MockUpstream;

    fn proxy_for(upstream: &MockUpstream, api_key: Option<&str>) -> AuditProxy {
        let mut config = ProxyConfig::default();
        config.upstream.base_url = upstream.url.clone();
        config.upstream.api_key = api_key.map(str::to_owned);
        config.upstream.timeout_secs = 5;
        AuditProxy::new(reqwest::Client::new(), &config)
    }

    fn query(url: Option<&str>, strategy: Option<&str>) -> AuditQuery {
        AuditQuery {
            url: url.map(str::to_owned),
            strategy: strategy.map(str::to_owned),
        }
    }

    #[test]
    fn test_validate_requires_url() {
        assert!(matches!(query(None, None).validate(), Err(ApiError::MissingInput("url"))));
        assert!(matches!(
            query(Some("   "), Some("desktop")).validate(),
            Err(ApiError::MissingInput("url"))
        ));
    }

    #[test]
    fn test_validate_keeps_url_verbatim() {
        let request = query(Some(" https://example.com/a b "), None).validate().unwrap();
        assert_eq!(request.target_url, " https://example.com/a b ");
    }

    #[test]
    fn test_validate_defaults_strategy() {
        let request = query(Some("https://example.com"), None).validate().unwrap();
        assert_eq!(
            request,
            AuditRequest {
                target_url: "https://example.com".to_string(),
                strategy: Strategy::Mobile,
            }
        );
    }

    #[test]
    fn test_validate_rejects_unknown_strategy() {
        let err = query(Some("https://example.com"), Some("watch")).validate().unwrap_err();
        assert!(matches!(err, ApiError::InvalidStrategy(_)));
    }

    #[tokio::test]
    async fn test_core_web_vitals_from_partial_result() {
        let upstream = MockUpstream::ok(json!({
            "lighthouseResult": {
                "categories": { "performance": { "score": 0.82 } },
                "audits": { "first-contentful-paint": { "displayValue": "1.2 s" } }
            }
        }))
        .await;
        let proxy = proxy_for(&upstream, Some("key"));
        let request = query(Some("https://example.com"), Some("mobile")).validate().unwrap();

        let report = proxy.core_web_vitals_report(request, "req-1").await.unwrap();

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "url": "https://example.com",
                "strategy": "mobile",
                "performanceScore": 0.82,
                "coreWebVitals": {
                    "firstContentfulPaint": "1.2 s",
                    "largestContentfulPaint": null,
                    "totalBlockingTime": null,
                    "cumulativeLayoutShift": null
                }
            })
        );
    }

    #[tokio::test]
    async fn test_missing_api_key_skips_upstream() {
        let upstream = MockUpstream::ok(json!({ "lighthouseResult": {} })).await;
        let proxy = proxy_for(&upstream, None);
        let request = query(Some("https://example.com"), None).validate().unwrap();

        let err = proxy.audit_report(request, "req-2").await.unwrap_err();

        assert!(matches!(err, ApiError::ServerMisconfigured(API_KEY_ENV)));
        assert_eq!(upstream.hits().await, 0);
    }

    #[tokio::test]
    async fn test_full_report_includes_raw_when_enabled() {
        let upstream = MockUpstream::ok(json!({
            "lighthouseResult": { "categories": { "seo": { "score": 0.7 } } }
        }))
        .await;
        let proxy = proxy_for(&upstream, Some("key"));
        let request = query(Some("https://example.com"), Some("desktop")).validate().unwrap();

        let report = proxy.audit_report(request, "req-3").await.unwrap();

        assert_eq!(report.strategy, Strategy::Desktop);
        assert_eq!(report.seo_score, Some(0.7));
        assert_eq!(report.performance_score, None);
        assert_eq!(
            report.raw_lighthouse,
            Some(json!({ "categories": { "seo": { "score": 0.7 } } }))
        );
    }
}
