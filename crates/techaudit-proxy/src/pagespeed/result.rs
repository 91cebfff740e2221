//! Null-safe view over the upstream `lighthouseResult` document.
//!
//! The document is kept as an untyped `serde_json::Value`. Each accessor walks
//! its own path and yields `None` on a missing container or a value of the
//! wrong type, so one absent audit never affects another field.

use serde_json::Value;

/// The `lighthouseResult` container of a PageSpeed response.
#[derive(Debug, Clone, PartialEq)]
pub struct LighthouseResult(Value);

impl LighthouseResult {
    /// Take `lighthouseResult` out of a full response body.
    ///
    /// Returns `None` when the container is missing or is not an object.
    pub fn from_response(mut body: Value) -> Option<Self> {
        match body.get_mut("lighthouseResult").map(Value::take) {
            Some(result @ Value::Object(_)) => Some(Self(result)),
            _ => None,
        }
    }

    /// `categories.<name>.score`
    pub fn category_score(&self, name: &str) -> Option<f64> {
        self.0
            .get("categories")
            .and_then(|c| c.get(name))
            .and_then(|c| c.get("score"))
            .and_then(Value::as_f64)
    }

    /// `audits.<id>.displayValue`
    pub fn audit_display_value(&self, id: &str) -> Option<&str> {
        self.audit(id)
            .and_then(|a| a.get("displayValue"))
            .and_then(Value::as_str)
    }

    /// `audits.<id>.score`
    pub fn audit_score(&self, id: &str) -> Option<f64> {
        self.audit(id)
            .and_then(|a| a.get("score"))
            .and_then(Value::as_f64)
    }

    /// `audits["final-screenshot"].details.data`, a base64 data URI.
    pub fn final_screenshot(&self) -> Option<&str> {
        self.audit("final-screenshot")
            .and_then(|a| a.get("details"))
            .and_then(|d| d.get("data"))
            .and_then(Value::as_str)
    }

    pub fn into_raw(self) -> Value {
        self.0
    }

    fn audit(&self, id: &str) -> Option<&Value> {
        self.0.get("audits").and_then(|a| a.get(id))
    }
}
