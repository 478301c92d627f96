use config::AppConfig;
use services::auth::{DirectCallback, ExchangeCallback, LoginInitiator};
use services::{BackendClient, HttpBackendClient, MockBackend, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Shared application state. Everything in here is cheap to clone; the
/// heavy pieces live behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: Arc<dyn BackendClient>,
    pub sessions: Arc<SessionStore>,
    pub initiator: Arc<LoginInitiator>,
    pub direct_callback: Arc<DirectCallback>,
    pub exchange_callback: Arc<ExchangeCallback>,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let backend: Arc<dyn BackendClient> = if config.backend.mock {
            info!("Backend mock enabled, no requests will leave this process");
            Arc::new(MockBackend::new(config.backend.api_url.clone()))
        } else {
            Arc::new(HttpBackendClient::new(&config.backend)?)
        };
        Ok(Self::with_backend(config, backend))
    }

    /// Assemble state around an externally built backend. Tests use this
    /// to hand in a shared `MockBackend` they can inspect afterwards.
    pub fn with_backend(config: AppConfig, backend: Arc<dyn BackendClient>) -> Self {
        let sessions = Arc::new(SessionStore::new(config.session.storage_path.clone()));
        let initiator = Arc::new(LoginInitiator::new(backend.clone()));
        let direct_callback = Arc::new(DirectCallback::new(Duration::from_secs(
            config.session.legacy_redirect_delay_secs,
        )));
        let exchange_callback = Arc::new(ExchangeCallback::new(backend.clone()));

        Self {
            config: Arc::new(config),
            backend,
            sessions,
            initiator,
            direct_callback,
            exchange_callback,
        }
    }
}
