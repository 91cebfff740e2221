//! Simplified report shapes returned to clients.
//!
//! Every extracted field is an `Option` serialized as `null` when absent, so
//! each report has the same key set no matter how complete the upstream
//! document was.

use serde::Serialize;
use serde_json::Value;

use super::result::LighthouseResult;
use crate::strategy::Strategy;

const FIRST_CONTENTFUL_PAINT: &str = "first-contentful-paint";
const LARGEST_CONTENTFUL_PAINT: &str = "largest-contentful-paint";
const TOTAL_BLOCKING_TIME: &str = "total-blocking-time";
const CUMULATIVE_LAYOUT_SHIFT: &str = "cumulative-layout-shift";

/// Human-readable Core Web Vitals (`displayValue` of each audit).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreWebVitals {
    pub first_contentful_paint: Option<String>,
    pub largest_contentful_paint: Option<String>,
    pub total_blocking_time: Option<String>,
    pub cumulative_layout_shift: Option<String>,
}

impl CoreWebVitals {
    pub fn extract(result: &LighthouseResult) -> Self {
        let display = |id: &str| result.audit_display_value(id).map(str::to_owned);
        Self {
            first_contentful_paint: display(FIRST_CONTENTFUL_PAINT),
            largest_contentful_paint: display(LARGEST_CONTENTFUL_PAINT),
            total_blocking_time: display(TOTAL_BLOCKING_TIME),
            cumulative_layout_shift: display(CUMULATIVE_LAYOUT_SHIFT),
        }
    }
}

/// Scores of the individual SEO audits.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoChecks {
    pub meta_description: Option<f64>,
    pub viewport: Option<f64>,
    pub http_status_code: Option<f64>,
    pub robots_txt: Option<f64>,
    pub crawlable_anchors: Option<f64>,
    pub link_text: Option<f64>,
    pub is_crawlable: Option<f64>,
}

impl SeoChecks {
    pub fn extract(result: &LighthouseResult) -> Self {
        Self {
            meta_description: result.audit_score("meta-description"),
            viewport: result.audit_score("viewport"),
            http_status_code: result.audit_score("http-status-code"),
            robots_txt: result.audit_score("robots-txt"),
            crawlable_anchors: result.audit_score("crawlable-anchors"),
            link_text: result.audit_score("link-text"),
            is_crawlable: result.audit_score("is-crawlable"),
        }
    }
}

/// Response of `/pagespeed-audit`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub url: String,
    pub strategy: Strategy,
    pub performance_score: Option<f64>,
    pub core_web_vitals: CoreWebVitals,
    pub seo_score: Option<f64>,
    pub screenshot: Option<String>,
    /// Untouched upstream document, for the dashboard's debug panel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_lighthouse: Option<Value>,
}

impl AuditReport {
    pub fn build(url: String, strategy: Strategy, result: LighthouseResult, include_raw: bool) -> Self {
        Self {
            url,
            strategy,
            performance_score: result.category_score("performance"),
            core_web_vitals: CoreWebVitals::extract(&result),
            seo_score: result.category_score("seo"),
            screenshot: result.final_screenshot().map(str::to_owned),
            raw_lighthouse: include_raw.then(|| result.into_raw()),
        }
    }
}

/// Response of `/pagespeed-core-web-vitals`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreWebVitalsReport {
    pub url: String,
    pub strategy: Strategy,
    pub performance_score: Option<f64>,
    pub core_web_vitals: CoreWebVitals,
}

impl CoreWebVitalsReport {
    pub fn build(url: String, strategy: Strategy, result: &LighthouseResult) -> Self {
        Self {
            url,
            strategy,
            performance_score: result.category_score("performance"),
            core_web_vitals: CoreWebVitals::extract(result),
        }
    }
}

/// Response of `/pagespeed-seo`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoReport {
    pub url: String,
    pub strategy: Strategy,
    pub seo_score: Option<f64>,
    pub seo_checks: SeoChecks,
}

impl SeoReport {
    pub fn build(url: String, strategy: Strategy, result: &LighthouseResult) -> Self {
        Self {
            url,
            strategy,
            seo_score: result.category_score("seo"),
            seo_checks: SeoChecks::extract(result),
        }
    }
}

/// Response of `/pagespeed-screenshot`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenshotReport {
    pub url: String,
    pub strategy: Strategy,
    pub screenshot: Option<String>,
}

impl ScreenshotReport {
    pub fn build(url: String, strategy: Strategy, result: &LighthouseResult) -> Self {
        Self {
            url,
            strategy,
            screenshot: result.final_screenshot().map(str::to_owned),
        }
    }
}
