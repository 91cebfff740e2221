//! PageSpeed Insights upstream: outbound client, null-safe result view, and
//! the simplified report shapes built from it.

pub mod client;
pub mod report;
pub mod result;

pub use client::{AuditOptions, PageSpeedClient, UpstreamError};
pub use report::{AuditReport, CoreWebVitalsReport, ScreenshotReport, SeoReport};
pub use result::LighthouseResult;
