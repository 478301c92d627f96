use serde::Deserialize;
use std::{collections::HashMap, env};

/// Production backend reached when API_URL is not set.
pub const DEFAULT_API_URL: &str = "https://api.cinelog.app";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            backend: BackendConfig::from_env()?,
            session: SessionConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| "SERVER_PORT must be a valid port number")?,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// External backend configuration. The backend owns the whole OAuth2
/// handshake; this crate only needs to know where it lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the Cinelog API backend
    pub api_url: String,
    /// Use the in-process mock backend instead of HTTP
    pub mock: bool,
    /// Per-request timeout for backend calls, in seconds
    pub request_timeout_secs: u64,
}

impl BackendConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            api_url: env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            mock: env::var("BACKEND_MOCK")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            request_timeout_secs: env::var("BACKEND_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        })
    }

    /// GraphQL endpoint derived from the base URL
    pub fn graphql_url(&self) -> String {
        format!("{}/graphql", self.api_url.trim_end_matches('/'))
    }

    /// Session-exchange endpoint derived from the base URL
    pub fn session_exchange_url(&self) -> String {
        format!(
            "{}/oauth2/session/exchange",
            self.api_url.trim_end_matches('/')
        )
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            mock: false,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Where the current session is persisted across restarts.
    /// None disables persistence entirely (used by tests).
    pub storage_path: Option<std::path::PathBuf>,
    /// Seconds the legacy callback success page waits before navigating
    /// to the dashboard. The exchange variant redirects immediately.
    pub legacy_redirect_delay_secs: u64,
}

impl SessionConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            storage_path: env::var("SESSION_STORAGE_PATH")
                .ok()
                .map(std::path::PathBuf::from),
            legacy_redirect_delay_secs: env::var("CALLBACK_REDIRECT_DELAY_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_path: Some(std::path::PathBuf::from(".cinelog-session.json")),
            legacy_redirect_delay_secs: 2,
        }
    }
}

/// Logging Configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub modules: HashMap<String, String>,
}

impl LoggingConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, String> {
        let mut modules = HashMap::new();

        // Load module-specific log levels
        if let Ok(level) = env::var("LOG_MODULE_WEB") {
            modules.insert("web".to_string(), level);
        }
        if let Ok(level) = env::var("LOG_MODULE_SERVICES") {
            modules.insert("services".to_string(), level);
        }

        Ok(Self {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            modules,
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let mut modules = HashMap::new();
        modules.insert("web".to_string(), "debug".to_string());
        modules.insert("services".to_string(), "debug".to_string());

        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            modules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_urls_derived_from_base() {
        let backend = BackendConfig {
            api_url: "https://staging.cinelog.app/".to_string(),
            mock: false,
            request_timeout_secs: 30,
        };

        assert_eq!(backend.graphql_url(), "https://staging.cinelog.app/graphql");
        assert_eq!(
            backend.session_exchange_url(),
            "https://staging.cinelog.app/oauth2/session/exchange"
        );
    }

    #[test]
    fn test_backend_defaults_to_production_url() {
        let backend = BackendConfig::default();
        assert_eq!(backend.api_url, DEFAULT_API_URL);
        assert!(!backend.mock);
    }

    #[test]
    fn test_session_defaults() {
        let session = SessionConfig::default();
        assert_eq!(session.legacy_redirect_delay_secs, 2);
        assert!(session.storage_path.is_some());
    }
}
