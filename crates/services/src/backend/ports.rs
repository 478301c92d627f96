use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Identity providers the backend can hand the browser off to.
/// The backend speaks uppercase enum values over GraphQL; redirect URLs
/// use the lowercase form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OAuth2Provider {
    Google,
    Facebook,
    Apple,
}

impl OAuth2Provider {
    pub const ALL: [OAuth2Provider; 3] = [
        OAuth2Provider::Google,
        OAuth2Provider::Facebook,
        OAuth2Provider::Apple,
    ];

    /// Lowercase form used in redirect URLs and routes
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuth2Provider::Google => "google",
            OAuth2Provider::Facebook => "facebook",
            OAuth2Provider::Apple => "apple",
        }
    }

    /// Uppercase form used as the GraphQL enum value
    pub fn wire_name(&self) -> &'static str {
        match self {
            OAuth2Provider::Google => "GOOGLE",
            OAuth2Provider::Facebook => "FACEBOOK",
            OAuth2Provider::Apple => "APPLE",
        }
    }
}

impl fmt::Display for OAuth2Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown OAuth2 provider: {0}")]
pub struct UnknownProvider(pub String);

impl std::str::FromStr for OAuth2Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(OAuth2Provider::Google),
            "facebook" => Ok(OAuth2Provider::Facebook),
            "apple" => Ok(OAuth2Provider::Apple),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

// Domain models
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
}

/// What the backend hands back after a successful password login or signup
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Body of the `POST /oauth2/session/exchange` response.
///
/// The backend is inconsistent about the `user` field: it may arrive as an
/// object or as a JSON-encoded string. It is normalized here, at the
/// deserialization boundary, so nothing inward ever sees the ambiguity.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "user_from_string_or_object")]
    pub user: Option<User>,
    #[serde(default)]
    pub error: Option<String>,
}

fn user_from_string_or_object<'de, D>(deserializer: D) -> Result<Option<User>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(raw) => {
            serde_json::from_str(&raw).map(Some).map_err(serde::de::Error::custom)
        }
        other => serde_json::from_value(other).map(Some).map_err(serde::de::Error::custom),
    }
}

// Error types
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),

    /// Backend-reported rejection (GraphQL error, non-OK exchange status)
    #[error("{0}")]
    Backend(String),

    #[error("invalid response from backend: {0}")]
    InvalidResponse(String),

    #[error("backend configuration error: {0}")]
    Config(String),
}

/// Everything this application asks of the external backend. The backend
/// owns all protocol and cryptographic work; these calls just consume it.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// `oauthLogin` mutation: authorization URL for a provider
    async fn oauth_login_url(&self, provider: OAuth2Provider) -> Result<String, BackendError>;

    /// `login` mutation
    async fn login(&self, input: LoginInput) -> Result<AuthPayload, BackendError>;

    /// `register` mutation
    async fn register(&self, input: RegisterInput) -> Result<AuthPayload, BackendError>;

    /// `POST /oauth2/session/exchange`, credentials included
    async fn exchange_session(&self, session_id: &str) -> Result<ExchangeResponse, BackendError>;
}

// Mock constants for testing
pub const MOCK_USER_ID: &str = "11111111-1111-1111-1111-111111111111";

/// Mock backend that returns fake data for testing/development.
/// Used when `backend.mock` is enabled. Counts calls so tests can assert
/// exactly how many round trips a flow performed.
#[derive(Debug, Default)]
pub struct MockBackend {
    api_url: String,
    oauth_url_calls: AtomicUsize,
    login_calls: AtomicUsize,
    register_calls: AtomicUsize,
    exchange_calls: AtomicUsize,
    fail_oauth_url: AtomicBool,
    reject_credentials: AtomicBool,
    reject_registration: AtomicBool,
    fail_exchange_transport: AtomicBool,
    exchange_error: Mutex<Option<String>>,
}

impl MockBackend {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    pub fn mock_user() -> User {
        User {
            id: MOCK_USER_ID.to_string(),
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
        }
    }

    pub fn oauth_url_calls(&self) -> usize {
        self.oauth_url_calls.load(Ordering::SeqCst)
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.oauth_url_calls()
            + self.login_calls()
            + self.register_calls()
            + self.exchange_calls()
    }

    /// Make `oauth_login_url` fail until cleared
    pub fn set_fail_oauth_url(&self, fail: bool) {
        self.fail_oauth_url.store(fail, Ordering::SeqCst);
    }

    /// Make `login` report wrong credentials
    pub fn set_reject_credentials(&self, reject: bool) {
        self.reject_credentials.store(reject, Ordering::SeqCst);
    }

    /// Make `register` report a duplicate username
    pub fn set_reject_registration(&self, reject: bool) {
        self.reject_registration.store(reject, Ordering::SeqCst);
    }

    /// Make `exchange_session` fail at the transport/status level
    pub fn set_fail_exchange_transport(&self, fail: bool) {
        self.fail_exchange_transport.store(fail, Ordering::SeqCst);
    }

    /// Make `exchange_session` return an OK response carrying an error body
    pub fn set_exchange_error(&self, error: Option<&str>) {
        *self.exchange_error.lock().unwrap() = error.map(str::to_string);
    }

    fn username_for(email: &str) -> String {
        email.split('@').next().unwrap_or("user").to_string()
    }
}

#[async_trait]
impl BackendClient for MockBackend {
    async fn oauth_login_url(&self, provider: OAuth2Provider) -> Result<String, BackendError> {
        self.oauth_url_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_oauth_url.load(Ordering::SeqCst) {
            return Err(BackendError::Backend(
                "authorization request failed".to_string(),
            ));
        }
        Ok(format!(
            "{}/oauth2/authorization/{}",
            self.api_url.trim_end_matches('/'),
            provider
        ))
    }

    async fn login(&self, input: LoginInput) -> Result<AuthPayload, BackendError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_credentials.load(Ordering::SeqCst) {
            return Err(BackendError::Backend(
                "Invalid email or password".to_string(),
            ));
        }
        Ok(AuthPayload {
            token: format!("tok_{}", uuid::Uuid::new_v4().simple()),
            user: User {
                id: MOCK_USER_ID.to_string(),
                username: Self::username_for(&input.email),
                email: input.email,
            },
        })
    }

    async fn register(&self, input: RegisterInput) -> Result<AuthPayload, BackendError> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_registration.load(Ordering::SeqCst) {
            return Err(BackendError::Backend(
                "Username is already taken".to_string(),
            ));
        }
        Ok(AuthPayload {
            token: format!("tok_{}", uuid::Uuid::new_v4().simple()),
            user: User {
                id: uuid::Uuid::new_v4().to_string(),
                email: input.email,
                username: input.username,
            },
        })
    }

    async fn exchange_session(&self, _session_id: &str) -> Result<ExchangeResponse, BackendError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_exchange_transport.load(Ordering::SeqCst) {
            return Err(BackendError::Backend(
                "session exchange failed with status 502".to_string(),
            ));
        }
        if let Some(error) = self.exchange_error.lock().unwrap().clone() {
            return Ok(ExchangeResponse {
                success: false,
                user: None,
                error: Some(error),
            });
        }
        Ok(ExchangeResponse {
            success: true,
            user: Some(Self::mock_user()),
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_lowercase_and_wire_forms() {
        assert_eq!(OAuth2Provider::Google.to_string(), "google");
        assert_eq!(OAuth2Provider::Facebook.as_str(), "facebook");
        assert_eq!(OAuth2Provider::Apple.wire_name(), "APPLE");
    }

    #[test]
    fn test_provider_from_str_is_case_insensitive() {
        assert_eq!("GOOGLE".parse::<OAuth2Provider>().unwrap(), OAuth2Provider::Google);
        assert_eq!("apple".parse::<OAuth2Provider>().unwrap(), OAuth2Provider::Apple);
        assert!("github".parse::<OAuth2Provider>().is_err());
    }

    #[test]
    fn test_exchange_user_as_object() {
        let body = r#"{"success":true,"user":{"id":"u1","email":"a@b.com","username":"a"}}"#;
        let response: ExchangeResponse = serde_json::from_str(body).unwrap();
        assert!(response.success);
        assert_eq!(response.user.unwrap().username, "a");
        assert_eq!(response.error, None);
    }

    #[test]
    fn test_exchange_user_as_json_string() {
        let body = r#"{"success":true,"user":"{\"id\":\"u1\",\"email\":\"a@b.com\",\"username\":\"a\"}"}"#;
        let response: ExchangeResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.user.unwrap().email, "a@b.com");
    }

    #[test]
    fn test_exchange_user_missing_or_null() {
        let response: ExchangeResponse =
            serde_json::from_str(r#"{"success":true,"user":null}"#).unwrap();
        assert!(response.user.is_none());

        let response: ExchangeResponse =
            serde_json::from_str(r#"{"success":false,"error":"denied"}"#).unwrap();
        assert!(response.user.is_none());
        assert_eq!(response.error.as_deref(), Some("denied"));
    }

    #[test]
    fn test_exchange_user_garbage_string_is_an_error() {
        let result =
            serde_json::from_str::<ExchangeResponse>(r#"{"success":true,"user":"not json"}"#);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_backend_counts_calls() {
        let backend = MockBackend::new("https://api.test");
        let url = backend
            .oauth_login_url(OAuth2Provider::Facebook)
            .await
            .unwrap();
        assert_eq!(url, "https://api.test/oauth2/authorization/facebook");
        assert_eq!(backend.oauth_url_calls(), 1);
        assert_eq!(backend.total_calls(), 1);
    }
}
