use super::ports::{
    AuthPayload, BackendClient, BackendError, ExchangeResponse, LoginInput, OAuth2Provider,
    RegisterInput,
};
use async_trait::async_trait;
use config::BackendConfig;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const OAUTH_LOGIN_MUTATION: &str = "\
mutation OAuthLogin($provider: OAuth2Provider!) {
  oauthLogin(provider: $provider) { provider loginUrl }
}";

const LOGIN_MUTATION: &str = "\
mutation Login($input: LoginInput!) {
  login(input: $input) { token user { id email username } }
}";

const REGISTER_MUTATION: &str = "\
mutation Register($input: RegisterInput!) {
  register(input: $input) { token user { id email username } }
}";

/// GraphQL/REST client for the Cinelog backend
pub struct HttpBackendClient {
    http: Client,
    graphql_url: String,
    exchange_url: String,
}

impl HttpBackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        url::Url::parse(&config.api_url)
            .map_err(|e| BackendError::Config(format!("Invalid API base URL: {}", e)))?;

        // The cookie store carries the backend's session cookie into the
        // exchange call (the browser's credentials-included semantics).
        let http = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| BackendError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            graphql_url: config.graphql_url(),
            exchange_url: config.session_exchange_url(),
        })
    }

    /// Run one GraphQL mutation and pull `field` out of the `data` object.
    /// The first GraphQL error, if any, wins.
    async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
        field: &str,
    ) -> Result<T, BackendError> {
        let response = self
            .http
            .post(&self.graphql_url)
            .json(&serde_json::json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BackendError::Backend(format!(
                "backend returned status: {}",
                response.status()
            )));
        }

        let body: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        if let Some(error) = body.errors.unwrap_or_default().into_iter().next() {
            return Err(BackendError::Backend(error.message));
        }

        let data = body
            .data
            .ok_or_else(|| BackendError::InvalidResponse("missing data object".to_string()))?;
        let value = data
            .get(field)
            .cloned()
            .ok_or_else(|| BackendError::InvalidResponse(format!("missing field: {}", field)))?;

        serde_json::from_value(value).map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<serde_json::Value>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OAuthLoginPayload {
    #[allow(dead_code)]
    provider: String,
    login_url: String,
}

#[async_trait]
impl BackendClient for HttpBackendClient {
    async fn oauth_login_url(&self, provider: OAuth2Provider) -> Result<String, BackendError> {
        debug!(provider = %provider, "Requesting authorization URL");
        let payload: OAuthLoginPayload = self
            .graphql(
                OAUTH_LOGIN_MUTATION,
                serde_json::json!({ "provider": provider.wire_name() }),
                "oauthLogin",
            )
            .await?;
        Ok(payload.login_url)
    }

    async fn login(&self, input: LoginInput) -> Result<AuthPayload, BackendError> {
        debug!(email = %input.email, "Sending login mutation");
        self.graphql(
            LOGIN_MUTATION,
            serde_json::json!({ "input": input }),
            "login",
        )
        .await
    }

    async fn register(&self, input: RegisterInput) -> Result<AuthPayload, BackendError> {
        debug!(email = %input.email, username = %input.username, "Sending register mutation");
        self.graphql(
            REGISTER_MUTATION,
            serde_json::json!({ "input": input }),
            "register",
        )
        .await
    }

    async fn exchange_session(&self, session_id: &str) -> Result<ExchangeResponse, BackendError> {
        debug!("Exchanging callback session id for a session");
        let response = self
            .http
            .post(&self.exchange_url)
            .json(&serde_json::json!({ "session": session_id }))
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BackendError::Backend(format!(
                "session exchange failed with status: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}
