use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the single persisted entry holding the bearer token
    pub credential_key: String,
    /// Screen hosts are sent to when a session is required or rejected
    pub login_path: String,
    /// Screen authenticated users land on when visiting login or landing
    pub default_path: String,
    /// Capacity of the navigation broadcast channel
    pub navigation_buffer: usize,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Ok(v) = env::var("CLIA_API_URL") {
            if !v.trim().is_empty() {
                self.api.base_url = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("CLIA_API_TIMEOUT_SECS") {
            self.api.timeout_secs = parse_timeout_secs(&v).unwrap_or(self.api.timeout_secs);
        }
        if let Ok(v) = env::var("CLIA_API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Session overrides
        if let Ok(v) = env::var("CLIA_CREDENTIAL_KEY") {
            if !v.trim().is_empty() {
                self.session.credential_key = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("CLIA_LOGIN_PATH") {
            if v.starts_with('/') {
                self.session.login_path = v;
            }
        }
        if let Ok(v) = env::var("CLIA_DEFAULT_PATH") {
            if v.starts_with('/') {
                self.session.default_path = v;
            }
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:3000/api".to_string(),
                timeout_secs: 30,
                user_agent: format!("clia/{}", env!("CARGO_PKG_VERSION")),
                enable_request_logging: true,
            },
            session: SessionConfig::default(),
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging.clia.example.com/api".to_string(),
                timeout_secs: 30,
                user_agent: format!("clia/{}", env!("CARGO_PKG_VERSION")),
                enable_request_logging: true,
            },
            session: SessionConfig::default(),
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://app.clia.example.com/api".to_string(),
                timeout_secs: 30,
                user_agent: format!("clia/{}", env!("CARGO_PKG_VERSION")),
                enable_request_logging: false,
            },
            session: SessionConfig::default(),
        }
    }

    /// Development preset pointed at another API root; used by embedders and tests
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Self::development();
        config.api.base_url = base_url.into();
        config
    }
}

/// Whole seconds, at least one
fn parse_timeout_secs(raw: &str) -> Option<u64> {
    raw.trim().parse().ok().filter(|secs| *secs > 0)
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            credential_key: "authToken".to_string(),
            login_path: "/login".to_string(),
            default_path: "/dashboard".to_string(),
            navigation_buffer: 16,
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<GatewayConfig> = Lazy::new(GatewayConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static GatewayConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
