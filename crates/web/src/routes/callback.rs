use crate::routes::pages::escape;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use services::auth::{CallbackHandler, CallbackOutcome, CallbackQuery, CallbackStrategy};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Success page for the legacy callback. It lingers for the configured
/// delay before the meta refresh navigates to the dashboard.
fn render_success_page(username: &str, delay: Duration) -> Html<String> {
    Html(format!(
        r##"<!DOCTYPE html>
<html>
<head>
    <title>Signed in - Cinelog</title>
    <meta http-equiv="refresh" content="{secs};url=/dashboard">
</head>
<body>
    <h1>Welcome, {username}</h1>
    <p>Taking you to your dashboard...</p>
</body>
</html>"##,
        secs = delay.as_secs(),
        username = escape(username),
    ))
}

fn render_failed_page(message: &str) -> Html<String> {
    Html(format!(
        r##"<!DOCTYPE html>
<html>
<head>
    <title>Sign-in failed - Cinelog</title>
</head>
<body>
    <h1>Sign-in failed</h1>
    <p>{message}</p>
    <p><a href="/">Back to sign in</a></p>
</body>
</html>"##,
        message = escape(message),
    ))
}

/// `GET /auth/callback`: legacy variant, token and user in the query
pub async fn direct_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let strategy: Arc<dyn CallbackStrategy> = state.direct_callback.clone();
    let handler = CallbackHandler::new(strategy, state.sessions.clone());

    match handler.handle(&query).await {
        CallbackOutcome::Success {
            user,
            redirect_after,
        } => {
            info!(username = %user.username, "Legacy callback signed user in");
            let delay = redirect_after.unwrap_or(Duration::ZERO);
            render_success_page(&user.username, delay).into_response()
        }
        CallbackOutcome::Failed { message } => {
            (StatusCode::UNAUTHORIZED, render_failed_page(&message)).into_response()
        }
    }
}

/// `GET /auth/callback-v2`: exchange variant. The redirect drops the query
/// string so the session id never lingers in the address bar or history.
pub async fn exchange_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let strategy: Arc<dyn CallbackStrategy> = state.exchange_callback.clone();
    let handler = CallbackHandler::new(strategy, state.sessions.clone());

    match handler.handle(&query).await {
        CallbackOutcome::Success { user, .. } => {
            info!(username = %user.username, "Exchange callback signed user in");
            Redirect::to("/dashboard").into_response()
        }
        CallbackOutcome::Failed { message } => {
            (StatusCode::UNAUTHORIZED, render_failed_page(&message)).into_response()
        }
    }
}
