use crate::routes::pages::{render_login_page, render_signup_page};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use services::forms::{FieldErrors, LoginForm, SignupForm};
use services::OAuth2Provider;
use tracing::{debug, info, warn};

/// `POST /login`: validate, then run the `login` mutation. Validation
/// failures never reach the backend.
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    if let Err(errors) = form.validate() {
        debug!(fields = errors.len(), "Login form rejected by validation");
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            render_login_page(None, &errors, &form.email),
        )
            .into_response();
    }

    let email = form.email.clone();
    match state.backend.login(form.into_input()).await {
        Ok(payload) => {
            info!(username = %payload.user.username, "Password login succeeded");
            state.sessions.login(payload.token, payload.user).await;
            Redirect::to("/dashboard").into_response()
        }
        Err(e) => {
            warn!(error = %e, "Password login rejected");
            (
                StatusCode::UNAUTHORIZED,
                render_login_page(Some(&e.to_string()), &FieldErrors::new(), &email),
            )
                .into_response()
        }
    }
}

/// `POST /signup`: validate, run the `register` mutation, and sign the new
/// account in directly.
pub async fn signup(State(state): State<AppState>, Form(form): Form<SignupForm>) -> Response {
    if let Err(errors) = form.validate() {
        debug!(fields = errors.len(), "Signup form rejected by validation");
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            render_signup_page(None, &errors, &form.email, &form.username),
        )
            .into_response();
    }

    let email = form.email.clone();
    let username = form.username.clone();
    match state.backend.register(form.into_input()).await {
        Ok(payload) => {
            info!(username = %payload.user.username, "Account created");
            state.sessions.login(payload.token, payload.user).await;
            Redirect::to("/dashboard").into_response()
        }
        Err(e) => {
            warn!(error = %e, "Registration rejected");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                render_signup_page(Some(&e.to_string()), &FieldErrors::new(), &email, &username),
            )
                .into_response()
        }
    }
}

/// `GET /auth/login/{provider}`: fetch the provider's authorization URL
/// through the single-flight initiator and redirect the browser there.
pub async fn oauth_login(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Response {
    let provider: OAuth2Provider = match provider.parse() {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "OAuth login requested for unknown provider");
            return (StatusCode::NOT_FOUND, e.to_string()).into_response();
        }
    };

    match state.initiator.begin(provider).await {
        Ok(login_url) => {
            debug!(%provider, "Redirecting to provider authorization URL");
            Redirect::to(&login_url).into_response()
        }
        Err(e) => {
            warn!(%provider, error = %e, "OAuth login could not start");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                render_login_page(Some(&e.to_string()), &FieldErrors::new(), ""),
            )
                .into_response()
        }
    }
}

/// `GET /logout`: clear the session and return to the login page
pub async fn logout(State(state): State<AppState>) -> Redirect {
    state.sessions.logout().await;
    info!("Session cleared");
    Redirect::to("/")
}
