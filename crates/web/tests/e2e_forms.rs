// E2E tests for the login and signup forms

mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

// ============================================
// Login form
// ============================================

#[tokio::test]
async fn test_login_page_renders() {
    let (server, _backend, _state) = setup_test_server().await;

    let response = server.get("/").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.assert_text_contains("Sign in to Cinelog");
    response.assert_text_contains("/auth/login/google");
    response.assert_text_contains("/auth/login/facebook");
    response.assert_text_contains("/auth/login/apple");
}

#[tokio::test]
async fn test_login_validation_reports_every_bad_field_without_a_backend_call() {
    let (server, backend, _state) = setup_test_server().await;

    let response = server
        .post("/login")
        .form(&json!({
            "email": "not-an-email",
            "password": "12345",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    response.assert_text_contains("Please enter a valid email address");
    response.assert_text_contains("Password must be at least 6 characters");
    // The bad email is kept so the user can correct it in place
    response.assert_text_contains(r#"value="not-an-email""#);

    assert_eq!(backend.login_calls(), 0);
}

#[tokio::test]
async fn test_login_success_signs_in_and_redirects_to_dashboard() {
    let (server, backend, state) = setup_test_server().await;

    let response = server
        .post("/login")
        .form(&json!({
            "email": "ada@example.com",
            "password": "secret1",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/dashboard");
    assert_eq!(backend.login_calls(), 1);

    let session = state.sessions.current().await.unwrap();
    assert_eq!(session.user.email, "ada@example.com");
    assert_eq!(session.user.username, "ada");
}

#[tokio::test]
async fn test_login_rejected_credentials_show_a_notice() {
    let (server, backend, state) = setup_test_server().await;
    backend.set_reject_credentials(true);

    let response = server
        .post("/login")
        .form(&json!({
            "email": "ada@example.com",
            "password": "wrongpw",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    response.assert_text_contains("Invalid email or password");
    assert_eq!(backend.login_calls(), 1);
    assert!(!state.sessions.is_authenticated().await);
}

// ============================================
// Signup form
// ============================================

#[tokio::test]
async fn test_signup_mismatched_passwords_report_independently_of_length() {
    let (server, backend, _state) = setup_test_server().await;

    let response = server
        .post("/signup")
        .form(&json!({
            "email": "ada@example.com",
            "username": "ada",
            "password": "12345",
            "confirm": "54321",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    response.assert_text_contains("Password must be at least 6 characters");
    response.assert_text_contains("Passwords do not match");
    assert_eq!(backend.register_calls(), 0);
}

#[tokio::test]
async fn test_signup_short_username_is_rejected() {
    let (server, backend, _state) = setup_test_server().await;

    let response = server
        .post("/signup")
        .form(&json!({
            "email": "ada@example.com",
            "username": "ab",
            "password": "secret1",
            "confirm": "secret1",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    response.assert_text_contains("Username must be at least 3 characters");
    assert_eq!(backend.register_calls(), 0);
}

#[tokio::test]
async fn test_signup_success_creates_account_and_signs_in() {
    let (server, backend, state) = setup_test_server().await;

    let response = server
        .post("/signup")
        .form(&json!({
            "email": "grace@example.com",
            "username": "grace",
            "password": "secret1",
            "confirm": "secret1",
            "first_name": "Grace",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/dashboard");
    assert_eq!(backend.register_calls(), 1);

    let session = state.sessions.current().await.unwrap();
    assert_eq!(session.user.username, "grace");
}

#[tokio::test]
async fn test_signup_duplicate_username_shows_backend_message() {
    let (server, backend, state) = setup_test_server().await;
    backend.set_reject_registration(true);

    let response = server
        .post("/signup")
        .form(&json!({
            "email": "ada@example.com",
            "username": "ada",
            "password": "secret1",
            "confirm": "secret1",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    response.assert_text_contains("Username is already taken");
    assert!(!state.sessions.is_authenticated().await);

    println!("✅ Signup surfaces backend rejections without creating a session");
}
