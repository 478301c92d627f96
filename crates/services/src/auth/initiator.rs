use crate::backend::{BackendClient, BackendError, OAuth2Provider};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Debug, thiserror::Error)]
pub enum AuthFlowError {
    #[error("another sign-in request is already in progress")]
    RequestInFlight,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Starts the OAuth2 handshake: one authorization-URL round trip to the
/// backend, then the caller redirects the browser to the returned URL.
///
/// At most one request may be in flight; while one is pending every other
/// `begin` fails fast so the UI keeps all provider buttons disabled. The
/// guard is released on every path, which after a failure is the only case
/// anyone can observe (success navigates away).
pub struct LoginInitiator {
    backend: Arc<dyn BackendClient>,
    in_flight: AtomicBool,
}

impl LoginInitiator {
    pub fn new(backend: Arc<dyn BackendClient>) -> Self {
        Self {
            backend,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Request the authorization URL for `provider`. No automatic retry.
    pub async fn begin(&self, provider: OAuth2Provider) -> Result<String, AuthFlowError> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(AuthFlowError::RequestInFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        debug!(provider = %provider, "Starting OAuth2 flow");
        let url = self.backend.oauth_login_url(provider).await.map_err(|e| {
            error!(provider = %provider, error = %e, "Authorization URL request failed");
            e
        })?;

        debug!(provider = %provider, url = %url, "Redirecting to authorization URL");
        Ok(url)
    }
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
