//! Integration tests for authentication endpoints

mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_success_seeds_profile() {
    let app = common::TestApp::new().await;

    let email = common::unique_email();
    let (status, response) = app.post("/api/v1/auth/register", common::registration(&email)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(!response["access_token"].as_str().unwrap().is_empty());
    assert!(!response["refresh_token"].as_str().unwrap().is_empty());
    assert_eq!(response["token_type"], "Bearer");

    let token = response["access_token"].as_str().unwrap();
    let (status, profile) = app.get_auth("/api/v1/profile", token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], email.as_str());
    assert_eq!(profile["current_weight"], 60.0);
    assert_eq!(profile["weight_history"].as_array().unwrap().len(), 1);
    assert_eq!(profile["lifestyle_updates"].as_array().unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_duplicate_email() {
    let app = common::TestApp::new().await;

    let body = common::registration(&common::unique_email());

    let (status, _) = app.post("/api/v1/auth/register", body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, response) = app.post("/api/v1/auth/register", body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(response["error"]["code"], "CONFLICT");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_register_rejects_invalid_fields() {
    let app = common::TestApp::new().await;

    let mut bad_email = common::registration("not-an-email");
    bad_email["email"] = json!("not-an-email");
    let (status, _) = app.post("/api/v1/auth/register", bad_email).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut weak = common::registration(&common::unique_email());
    weak["password"] = json!("123");
    let (status, _) = app.post("/api/v1/auth/register", weak).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut tall = common::registration(&common::unique_email());
    tall["height"] = json!(300.0);
    let (status, body) = app.post("/api/v1/auth/register", tall).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_email_is_case_and_whitespace_insensitive() {
    let app = common::TestApp::new().await;

    let email = common::unique_email();
    let shouted = format!("  {} ", email.to_uppercase());
    let (status, _) = app.post("/api/v1/auth/register", common::registration(&shouted)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.post("/api/v1/auth/register", common::registration(&email)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, tokens) = app
        .post("/api/v1/auth/login", json!({"email": email, "password": "SecurePassword123!"}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let access = tokens["access_token"].as_str().unwrap();
    let (_, me) = app.get_auth("/api/v1/auth/me", access).await;
    assert_eq!(me["email"], email.as_str());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_and_refresh() {
    let app = common::TestApp::new().await;

    let email = common::unique_email();
    app.post("/api/v1/auth/register", common::registration(&email)).await;

    let (status, tokens) = app
        .post("/api/v1/auth/login", json!({"email": email, "password": "SecurePassword123!"}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let refresh = tokens["refresh_token"].as_str().unwrap();
    let (status, refreshed) = app
        .post("/api/v1/auth/refresh", json!({"refresh_token": refresh}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let access = refreshed["access_token"].as_str().unwrap();
    let (status, me) = app.get_auth("/api/v1/auth/me", access).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], email.as_str());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_wrong_password() {
    let app = common::TestApp::new().await;

    let email = common::unique_email();
    app.post("/api/v1/auth/register", common::registration(&email)).await;

    let (status, _) = app
        .post("/api/v1/auth/login", json!({"email": email, "password": "WrongPassword"}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_access_token_cannot_refresh() {
    let app = common::TestApp::new().await;
    let access = app.register_user().await;

    let (status, _) = app
        .post("/api/v1/auth/refresh", json!({"refresh_token": access}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
