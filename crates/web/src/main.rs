use config::{AppConfig, LoggingConfig};
use web::{build_app, state::AppState};

#[tokio::main]
async fn main() {
    // Load configuration first to get logging settings
    let config = AppConfig::load_or_env().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Application cannot start without a valid configuration.");
        std::process::exit(1);
    });

    init_tracing(&config.logging);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let api_url = config.backend.api_url.clone();

    let state = AppState::new(config).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to initialize application state");
        std::process::exit(1);
    });

    // Restore any persisted session before the first request can race it
    state.sessions.hydrate().await;
    if state.sessions.is_authenticated().await {
        tracing::info!("Restored persisted session");
    }

    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await.unwrap();

    tracing::info!(address = %bind_address, "Server started successfully");
    tracing::info!(backend = %api_url, "Backend API");
    tracing::info!("Endpoints:");
    tracing::info!("  - GET  / (Login page)");
    tracing::info!("  - POST /login (Password login)");
    tracing::info!("  - GET/POST /signup (Registration)");
    tracing::info!("  - GET  /auth/login/{{provider}} (Start OAuth2 flow)");
    tracing::info!("  - GET  /auth/callback (Legacy OAuth2 callback)");
    tracing::info!("  - GET  /auth/callback-v2 (Session-exchange callback)");
    tracing::info!("  - GET  /logout (Sign out)");
    tracing::info!("  - GET  /dashboard, /films, /watchlist, /likes, /diary, /activity (Signed-in pages)");

    axum::serve(listener, app).await.unwrap();
}

fn init_tracing(logging_config: &LoggingConfig) {
    // Build the filter string from the logging configuration
    let mut filter = logging_config.level.clone();

    for (module, level) in &logging_config.modules {
        filter.push_str(&format!(",{}={}", module, level));
    }

    match logging_config.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        "compact" => {
            tracing_subscriber::fmt()
                .compact()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .init();
        }
    }
}
