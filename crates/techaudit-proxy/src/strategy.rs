//! Audit strategy (device profile) requested from PageSpeed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Device profile the upstream audit emulates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Mobile,
    Desktop,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Mobile => "mobile",
            Strategy::Desktop => "desktop",
        }
    }

    /// Parse the optional `strategy` query parameter.
    ///
    /// Absent or blank means mobile. Unknown values are rejected instead of
    /// being forwarded to the upstream API.
    pub fn from_query(raw: Option<&str>) -> Result<Self, ApiError> {
        let value = match raw.map(str::trim) {
            None | Some("") => return Ok(Strategy::Mobile),
            Some(v) => v,
        };

        if value.eq_ignore_ascii_case("mobile") {
            Ok(Strategy::Mobile)
        } else if value.eq_ignore_ascii_case("desktop") {
            Ok(Strategy::Desktop)
        } else {
            Err(ApiError::InvalidStrategy(value.to_string()))
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_mobile() {
        assert_eq!(Strategy::from_query(None).unwrap(), Strategy::Mobile);
        assert_eq!(Strategy::from_query(Some("")).unwrap(), Strategy::Mobile);
        assert_eq!(Strategy::from_query(Some("  ")).unwrap(), Strategy::Mobile);
    }

    #[test]
    fn test_known_values_case_insensitive() {
        assert_eq!(Strategy::from_query(Some("desktop")).unwrap(), Strategy::Desktop);
        assert_eq!(Strategy::from_query(Some("DESKTOP")).unwrap(), Strategy::Desktop);
        assert_eq!(Strategy::from_query(Some("Mobile")).unwrap(), Strategy::Mobile);
    }

    #[test]
    fn test_unknown_value_rejected() {
        let err = Strategy::from_query(Some("tablet")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidStrategy(ref v) if v == "tablet"));
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Strategy::Desktop).unwrap(), "desktop");
    }
}
