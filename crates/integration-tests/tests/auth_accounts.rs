//! Integration tests for registration, login, and session handling.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The marketplace server running (cargo run -p townsquare-marketplace)
//!
//! Run with: cargo test -p townsquare-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::json;

use townsquare_integration_tests::TestContext;

#[tokio::test]
#[ignore = "Requires running marketplace server"]
async fn register_then_me_returns_profile() {
    let ctx = TestContext::new();
    let email = ctx.register_customer().await;

    let (status, body) = ctx.get_json("/api/auth/me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], email);
    assert_eq!(body["user"]["kind"], "customer");
}

#[tokio::test]
#[ignore = "Requires running marketplace server"]
async fn duplicate_registration_conflicts() {
    let ctx = TestContext::new();
    let email = ctx.register_customer().await;

    let resp = ctx
        .client
        .post(ctx.url("/api/auth/register"))
        .json(&json!({
            "email": email,
            "password": "another-pass-123",
            "first_name": "Test",
            "last_name": "Duplicate",
        }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running marketplace server"]
async fn login_with_wrong_password_is_unauthorized() {
    let ctx = TestContext::new();
    let email = ctx.register_customer().await;

    // A fresh context so the registration session doesn't mask the failure.
    let other = TestContext::new();
    let resp = other
        .client
        .post(other.url("/api/auth/login"))
        .json(&json!({"email": email, "password": "wrong-password"}))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running marketplace server"]
async fn logout_clears_the_session() {
    let ctx = TestContext::new();
    ctx.register_customer().await;

    let resp = ctx
        .client
        .post(ctx.url("/api/auth/logout"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let (status, _) = ctx.get_json("/api/auth/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running marketplace server"]
async fn short_password_is_rejected() {
    let ctx = TestContext::new();
    let resp = ctx
        .client
        .post(ctx.url("/api/auth/register"))
        .json(&json!({
            "email": "short@integration.test",
            "password": "short",
            "first_name": "Test",
            "last_name": "Short",
        }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
