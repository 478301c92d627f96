#![allow(dead_code)]

use config::{AppConfig, BackendConfig, LoggingConfig, ServerConfig, SessionConfig};
use services::MockBackend;
use std::sync::Arc;
use web::{build_app, state::AppState};

pub const TEST_API_URL: &str = "https://api.test.cinelog.app";

/// Helper function to create a test configuration
pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Use port 0 to get a random available port
        },
        backend: BackendConfig {
            api_url: TEST_API_URL.to_string(),
            mock: true,
            request_timeout_secs: 5,
        },
        session: SessionConfig {
            // No persistence in tests; each server starts signed out
            storage_path: None,
            legacy_redirect_delay_secs: 2,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "compact".to_string(),
            modules: std::collections::HashMap::new(),
        },
    }
}

/// Spin up a test server around a shared mock backend so tests can assert
/// call counts and flip failure modes.
pub async fn setup_test_server() -> (axum_test::TestServer, Arc<MockBackend>, AppState) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let backend = Arc::new(MockBackend::new(TEST_API_URL));
    let state = AppState::with_backend(test_config(), backend.clone());
    state.sessions.hydrate().await;

    let server = axum_test::TestServer::new(build_app(state.clone())).unwrap();
    (server, backend, state)
}

/// Sign the server's session store in directly, bypassing the HTTP flows
pub async fn sign_in(state: &AppState) {
    state
        .sessions
        .login("tok_test".to_string(), MockBackend::mock_user())
        .await;
}
