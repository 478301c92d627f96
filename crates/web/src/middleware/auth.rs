use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use services::backend::User;
use tracing::debug;

/// The signed-in user, inserted by `require_session` for downstream handlers
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Gate for authenticated pages. Anonymous visitors are sent back to the
/// login page rather than shown an error.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match state.sessions.current().await {
        Some(session) => {
            request.extensions_mut().insert(CurrentUser(session.user));
            next.run(request).await
        }
        None => {
            debug!(path = %request.uri().path(), "Anonymous request to protected page");
            Redirect::to("/").into_response()
        }
    }
}
