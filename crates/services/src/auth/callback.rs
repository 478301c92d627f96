use crate::backend::{BackendClient, BackendError, User};
use crate::session::{Session, SessionStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Decoded query parameters of a callback request
pub type CallbackQuery = HashMap<String, String>;

pub const ERR_NOT_SUCCESSFUL: &str = "authentication was not successful";
pub const ERR_MISSING_DATA: &str = "missing authentication data";

/// Transient result of reading the callback query. Never outlives the
/// request: it either becomes a `Session` or an error page.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackResult {
    /// Legacy variant: token and user travel in the URL itself
    Direct { token: String, user: User },
    /// Exchange variant: the URL carries a session id to trade in
    Exchange { session_id: String },
    Failed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    /// The callback or the exchange endpoint reported a failure
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// One of the two callback flavors. `parse` reads the query into a
/// `CallbackResult`; `finalize` turns a non-failed result into a `Session`,
/// performing at most one network call.
#[async_trait]
pub trait CallbackStrategy: Send + Sync {
    fn parse(&self, query: &CallbackQuery) -> CallbackResult;

    async fn finalize(&self, result: CallbackResult) -> Result<Session, CallbackError>;

    /// How long the success view lingers before navigating to the
    /// dashboard. `None` means redirect immediately.
    fn redirect_delay(&self) -> Option<Duration> {
        None
    }
}

/// Shared checks that open every parse, in order: a provider-reported
/// error wins, then the success flag is required.
fn parse_common(query: &CallbackQuery) -> Option<CallbackResult> {
    if let Some(error) = query.get("error") {
        return Some(CallbackResult::Failed(error.clone()));
    }
    if query.get("success").map(String::as_str) != Some("true") {
        return Some(CallbackResult::Failed(ERR_NOT_SUCCESSFUL.to_string()));
    }
    None
}

/// Legacy `/auth/callback`: the backend placed the token and the
/// URL-encoded user JSON directly in the redirect query. No network call;
/// the success view waits a fixed delay before navigating.
pub struct DirectCallback {
    redirect_delay: Duration,
}

impl DirectCallback {
    pub fn new(redirect_delay: Duration) -> Self {
        Self { redirect_delay }
    }
}

#[async_trait]
impl CallbackStrategy for DirectCallback {
    fn parse(&self, query: &CallbackQuery) -> CallbackResult {
        if let Some(failed) = parse_common(query) {
            return failed;
        }
        let token = query.get("token").filter(|t| !t.is_empty());
        let user_raw = query.get("user").filter(|u| !u.is_empty());
        match (token, user_raw) {
            (Some(token), Some(user_raw)) => match serde_json::from_str::<User>(user_raw) {
                Ok(user) => CallbackResult::Direct {
                    token: token.clone(),
                    user,
                },
                Err(e) => {
                    warn!(error = %e, "Callback user parameter is not valid user JSON");
                    CallbackResult::Failed(ERR_MISSING_DATA.to_string())
                }
            },
            _ => CallbackResult::Failed(ERR_MISSING_DATA.to_string()),
        }
    }

    async fn finalize(&self, result: CallbackResult) -> Result<Session, CallbackError> {
        match result {
            CallbackResult::Direct { token, user } => Ok(Session::new(token, user)),
            CallbackResult::Failed(message) => Err(CallbackError::Rejected(message)),
            CallbackResult::Exchange { .. } => {
                Err(CallbackError::Rejected(ERR_MISSING_DATA.to_string()))
            }
        }
    }

    fn redirect_delay(&self) -> Option<Duration> {
        Some(self.redirect_delay)
    }
}

/// `/auth/callback-v2`: the redirect carries only a session id, traded in
/// against the exchange endpoint with credentials included. The session id
/// doubles as the stored token; the backend cookie is the real credential.
pub struct ExchangeCallback {
    backend: Arc<dyn BackendClient>,
}

impl ExchangeCallback {
    pub fn new(backend: Arc<dyn BackendClient>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl CallbackStrategy for ExchangeCallback {
    fn parse(&self, query: &CallbackQuery) -> CallbackResult {
        if let Some(failed) = parse_common(query) {
            return failed;
        }
        match query.get("session").filter(|s| !s.is_empty()) {
            Some(session_id) => CallbackResult::Exchange {
                session_id: session_id.clone(),
            },
            None => CallbackResult::Failed(ERR_MISSING_DATA.to_string()),
        }
    }

    async fn finalize(&self, result: CallbackResult) -> Result<Session, CallbackError> {
        let session_id = match result {
            CallbackResult::Exchange { session_id } => session_id,
            CallbackResult::Failed(message) => return Err(CallbackError::Rejected(message)),
            CallbackResult::Direct { .. } => {
                return Err(CallbackError::Rejected(ERR_MISSING_DATA.to_string()))
            }
        };

        let response = self.backend.exchange_session(&session_id).await?;
        if let Some(error) = response.error {
            return Err(CallbackError::Rejected(error));
        }
        if !response.success {
            return Err(CallbackError::Rejected(ERR_NOT_SUCCESSFUL.to_string()));
        }
        let user = response
            .user
            .ok_or_else(|| CallbackError::Rejected(ERR_MISSING_DATA.to_string()))?;

        Ok(Session::new(session_id, user))
    }
}

/// Terminal outcome of one callback request
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackOutcome {
    Success {
        user: User,
        redirect_after: Option<Duration>,
    },
    Failed {
        message: String,
    },
}

/// Drives the two-state acceptor once per request: parse, finalize, write
/// the session, report the outcome. Both outcomes are terminal; a new
/// request starts from scratch with no retained state.
pub struct CallbackHandler {
    strategy: Arc<dyn CallbackStrategy>,
    sessions: Arc<SessionStore>,
}

impl CallbackHandler {
    pub fn new(strategy: Arc<dyn CallbackStrategy>, sessions: Arc<SessionStore>) -> Self {
        Self { strategy, sessions }
    }

    pub async fn handle(&self, query: &CallbackQuery) -> CallbackOutcome {
        let result = self.strategy.parse(query);
        if let CallbackResult::Failed(message) = result {
            warn!(message = %message, "Callback rejected before finalization");
            return CallbackOutcome::Failed { message };
        }

        match self.strategy.finalize(result).await {
            Ok(session) => {
                let user = session.user.clone();
                self.sessions.login(session.token, session.user).await;
                debug!(username = %user.username, "Callback completed, session stored");
                CallbackOutcome::Success {
                    user,
                    redirect_after: self.strategy.redirect_delay(),
                }
            }
            Err(e) => {
                warn!(error = %e, "Callback finalization failed");
                CallbackOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }
}
