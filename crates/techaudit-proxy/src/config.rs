//! Configuration types and loading logic.

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;
use techaudit_tracing::TracingConfig;

/// Environment variable holding the shared secret for protected routes.
pub const SECRET_ENV: &str = "TECHAUDIT_SECRET";

/// Environment variable holding the PageSpeed Insights API key.
pub const API_KEY_ENV: &str = "PAGESPEED_API_KEY";

/// Top-level proxy configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub tracing: TracingConfig,
}

/// Listener and static front-end configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    /// Directory served at `/` without a secret.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Answer CORS preflights for any origin, for dashboards hosted elsewhere.
    #[serde(default)]
    pub allow_cors: bool,
}

/// Shared-secret gate configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Expected value of the `x-techaudit-secret` header. Usually supplied
    /// through `TECHAUDIT_SECRET` rather than the TOML file.
    #[serde(default)]
    pub shared_secret: Option<String>,

    /// Whether `/health` sits behind the secret as well.
    #[serde(default = "default_true")]
    pub protect_health: bool,
}

/// PageSpeed Insights upstream configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_url")]
    pub base_url: String,

    /// Usually supplied through `PAGESPEED_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Attach the untouched `lighthouseResult` to `/pagespeed-audit` responses.
    #[serde(default = "default_true")]
    pub include_raw: bool,
}

fn default_listen_address() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_upstream_url() -> String {
    "https://www.googleapis.com/pagespeedonline/v5/runPagespeed".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    60
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            static_dir: default_static_dir(),
            allow_cors: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            shared_secret: None,
            protect_health: default_true(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_url(),
            api_key: None,
            timeout_secs: default_timeout(),
            include_raw: default_true(),
        }
    }
}

impl ProxyConfig {
    /// Load configuration from TOML file and environment variables.
    ///
    /// Priority (highest to lowest):
    /// 1. `TECHAUDIT_SECRET`, `PAGESPEED_API_KEY` and `PORT`
    /// 2. Environment variables (TECHAUDIT_ prefix, __ for nesting)
    /// 3. TOML config file
    /// 4. Defaults
    pub fn load(config_path: &str) -> anyhow::Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("TECHAUDIT_").split("__"));

        let mut config = Self::from_figment(figment)?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let mut config: ProxyConfig = figment.extract()?;
        config.normalize();
        Ok(config)
    }

    /// Apply the variables the service has always been deployed with.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup(SECRET_ENV) {
            self.auth.shared_secret = Some(secret);
        }
        if let Some(key) = lookup(API_KEY_ENV) {
            self.upstream.api_key = Some(key);
        }
        if let Some(port) = lookup("PORT").filter(|p| !p.trim().is_empty()) {
            self.server.listen_address = format!("0.0.0.0:{}", port.trim());
        }
        self.normalize();
    }

    /// Empty credentials count as unset.
    fn normalize(&mut self) {
        self.auth.shared_secret = self.auth.shared_secret.take().filter(|s| !s.is_empty());
        self.upstream.api_key = self.upstream.api_key.take().filter(|k| !k.is_empty());
    }

    /// Log which routes will refuse to serve because a credential is missing.
    pub fn warn_missing_credentials(&self) {
        if self.auth.shared_secret.is_none() {
            tracing::warn!(
                env = SECRET_ENV,
                "Shared secret not configured, protected routes will answer 500"
            );
        }
        if self.upstream.api_key.is_none() {
            tracing::warn!(
                env = API_KEY_ENV,
                "PageSpeed API key not configured, audit routes will answer 500"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_file() {
        let mut config = ProxyConfig::from_figment(Figment::new()).unwrap();
        config.apply_env_overrides(no_env);

        assert_eq!(config.server.listen_address, "0.0.0.0:3000");
        assert_eq!(config.server.static_dir, "public");
        assert!(!config.server.allow_cors);
        assert!(config.auth.shared_secret.is_none());
        assert!(config.auth.protect_health);
        assert!(config.upstream.api_key.is_none());
        assert_eq!(config.upstream.timeout_secs, 60);
        assert!(config.upstream.include_raw);
        assert!(config.upstream.base_url.ends_with("/runPagespeed"));
    }

    #[test]
    fn test_toml_values() {
        let toml = r#"
            [server]
            listen_address = "127.0.0.1:8080"

            [auth]
            shared_secret = "from-file"
            protect_health = false

            [upstream]
            timeout_secs = 15
            include_raw = false

            [tracing]
            log_level = "debug"
            format = "json"
        "#;
        let config = ProxyConfig::from_figment(Figment::new().merge(Toml::string(toml))).unwrap();

        assert_eq!(config.server.listen_address, "127.0.0.1:8080");
        assert_eq!(config.auth.shared_secret.as_deref(), Some("from-file"));
        assert!(!config.auth.protect_health);
        assert_eq!(config.upstream.timeout_secs, 15);
        assert!(!config.upstream.include_raw);
        assert_eq!(config.tracing.log_level, "debug");
        assert_eq!(config.tracing.format, techaudit_tracing::LogFormat::Json);
    }

    #[test]
    fn test_env_overrides_win_over_file() {
        let toml = r#"
            [auth]
            shared_secret = "from-file"
        "#;
        let mut config =
            ProxyConfig::from_figment(Figment::new().merge(Toml::string(toml))).unwrap();
        config.apply_env_overrides(|name| match name {
            SECRET_ENV => Some("from-env".to_string()),
            API_KEY_ENV => Some("key-123".to_string()),
            "PORT" => Some("4000".to_string()),
            _ => None,
        });

        assert_eq!(config.auth.shared_secret.as_deref(), Some("from-env"));
        assert_eq!(config.upstream.api_key.as_deref(), Some("key-123"));
        assert_eq!(config.server.listen_address, "0.0.0.0:4000");
    }

    #[test]
    fn test_empty_credentials_are_unset() {
        let mut config = ProxyConfig::from_figment(Figment::new()).unwrap();
        config.apply_env_overrides(|name| match name {
            SECRET_ENV | API_KEY_ENV => Some(String::new()),
            _ => None,
        });

        assert!(config.auth.shared_secret.is_none());
        assert!(config.upstream.api_key.is_none());
    }
}
