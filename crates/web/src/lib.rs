pub mod middleware;
pub mod routes;
pub mod state;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use state::AppState;

/// Assemble the full application router around a prepared state
pub fn build_app(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(routes::pages::login_page))
        .route("/login", post(routes::auth::login))
        .route(
            "/signup",
            get(routes::pages::signup_page).post(routes::auth::signup),
        )
        .route("/auth/login/{provider}", get(routes::auth::oauth_login))
        .route("/auth/callback", get(routes::callback::direct_callback))
        .route("/auth/callback-v2", get(routes::callback::exchange_callback))
        .route("/logout", get(routes::auth::logout));

    let protected = Router::new()
        .route("/dashboard", get(routes::pages::dashboard))
        .route("/films", get(routes::pages::films))
        .route("/watchlist", get(routes::pages::watchlist))
        .route("/likes", get(routes::pages::likes))
        .route("/diary", get(routes::pages::diary))
        .route("/activity", get(routes::pages::activity))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::require_session,
        ));

    public.merge(protected).with_state(state)
}
