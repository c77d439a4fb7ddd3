/// Integration tests for sign-in, the bearer guard and password reset

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::{TestContext, JWT_SECRET, PASSWORD};
use planboard_api::services::auth::{INVALID_CREDENTIALS, INVALID_RESET_TOKEN, SAME_PASSWORD};
use planboard_shared::auth::jwt::{create_token, validate_access_token, Claims, TokenType};
use serde_json::json;
use uuid::Uuid;

/// Pulls the `(user id, token)` pair out of an emailed reset link
fn reset_params(text: &str) -> (String, String) {
    let link = text
        .split_whitespace()
        .find(|word| word.contains("/pw-reset/"))
        .expect("reset link in email");
    let parts: Vec<&str> = link.rsplit('/').collect();
    (parts[2].to_string(), parts[0].to_string())
}

#[tokio::test]
async fn test_login_token_subject_is_account_id() {
    let ctx = TestContext::new();
    let account = ctx.sign_up("dneri").await;

    let response = ctx.login("dneri", PASSWORD).await;
    assert_eq!(response.status, StatusCode::OK);

    let token = response.body["access_token"].as_str().unwrap();
    let claims = validate_access_token(token, JWT_SECRET).unwrap();
    assert_eq!(claims.sub.to_string(), account["id"].as_str().unwrap());
    assert_eq!(claims.username, "dneri");
}

#[tokio::test]
async fn test_login_is_case_insensitive_on_username() {
    let ctx = TestContext::new();
    ctx.sign_up("dneri").await;

    let response = ctx.login("DNeri", PASSWORD).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials_uniformly() {
    let ctx = TestContext::new();
    ctx.sign_up("dneri").await;

    let wrong_password = ctx.login("dneri", "not the password").await;
    let unknown_user = ctx.login("nobody", PASSWORD).await;

    for response in [wrong_password, unknown_user] {
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.message(), INVALID_CREDENTIALS);
    }
}

#[tokio::test]
async fn test_login_requires_fields() {
    let ctx = TestContext::new();

    let response = ctx.login("", "").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["error"], "validation_error");
}

#[tokio::test]
async fn test_profile_returns_token_identity() {
    let ctx = TestContext::new();
    let (user_id, token) = ctx.signed_in_user("dneri").await;

    let response = ctx.get("/api/auth/profile", &token).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["sub"], user_id.to_string());
    assert_eq!(response.body["username"], "dneri");
}

#[tokio::test]
async fn test_guard_rejects_missing_and_invalid_tokens() {
    let ctx = TestContext::new();
    let (user_id, _) = ctx.signed_in_user("dneri").await;

    let missing = ctx
        .request(axum::http::Method::GET, "/api/auth/profile", None, None)
        .await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let expired = create_token(
        &Claims::with_expiration(user_id, "dneri", TokenType::Access, Duration::hours(-2)),
        JWT_SECRET,
    )
    .unwrap();
    let reset = create_token(
        &Claims::new(user_id, "dneri", TokenType::PasswordReset),
        JWT_SECRET,
    )
    .unwrap();
    let forged = create_token(
        &Claims::new(user_id, "dneri", TokenType::Access),
        "some-other-secret-0123456789abcdef",
    )
    .unwrap();

    for token in [expired, reset, forged, "garbage".to_string()] {
        let response = ctx.get("/api/projects", &token).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "accepted {}", token);
    }
}

#[tokio::test]
async fn test_reset_email_is_uniform() {
    let ctx = TestContext::new();
    ctx.sign_up("dneri").await;

    let known = ctx
        .post("/api/auth/reset-email", None, json!({ "email": "DNERI@example.com" }))
        .await;
    let unknown = ctx
        .post("/api/auth/reset-email", None, json!({ "email": "ghost@example.com" }))
        .await;

    assert_eq!(known.status, StatusCode::ACCEPTED);
    assert_eq!(unknown.status, StatusCode::ACCEPTED);
    assert_eq!(known.body, unknown.body);

    let sent = ctx.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "dneri@example.com");
}

#[tokio::test]
async fn test_password_reset_flow_is_single_use() {
    let ctx = TestContext::new();
    let account = ctx.sign_up("dneri").await;

    ctx.post("/api/auth/reset-email", None, json!({ "email": "dneri@example.com" }))
        .await;
    let (user_id, token) = reset_params(&ctx.mailer.sent()[0].text);
    assert_eq!(user_id, account["id"].as_str().unwrap());

    let response = ctx
        .post(
            "/api/auth/pw-reset",
            None,
            json!({ "userID": user_id, "token": token, "password": "a brand new secret" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], "dneri");
    assert!(response.body.get("passwordHash").is_none());

    assert_eq!(ctx.login("dneri", PASSWORD).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(ctx.login("dneri", "a brand new secret").await.status, StatusCode::OK);

    // the hash the token was signed with is gone
    let replay = ctx
        .post(
            "/api/auth/pw-reset",
            None,
            json!({ "userID": user_id, "token": token, "password": "yet another one" }),
        )
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
    assert_eq!(replay.message(), INVALID_RESET_TOKEN);
}

#[tokio::test]
async fn test_password_reset_rejects_same_password() {
    let ctx = TestContext::new();
    ctx.sign_up("dneri").await;

    ctx.post("/api/auth/reset-email", None, json!({ "email": "dneri@example.com" }))
        .await;
    let (user_id, token) = reset_params(&ctx.mailer.sent()[0].text);

    let response = ctx
        .post(
            "/api/auth/pw-reset",
            None,
            json!({ "userID": user_id, "token": token, "password": PASSWORD }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), SAME_PASSWORD);
}

#[tokio::test]
async fn test_password_reset_rejects_token_for_other_user() {
    let ctx = TestContext::new();
    ctx.sign_up("dneri").await;
    let other = ctx.sign_up("jdoe").await;

    ctx.post("/api/auth/reset-email", None, json!({ "email": "dneri@example.com" }))
        .await;
    let (_, token) = reset_params(&ctx.mailer.sent()[0].text);

    let response = ctx
        .post(
            "/api/auth/pw-reset",
            None,
            json!({ "userID": other["id"], "token": token, "password": "whatever it is" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_password_reset_unknown_user() {
    let ctx = TestContext::new();

    let response = ctx
        .post(
            "/api/auth/pw-reset",
            None,
            json!({ "userID": Uuid::new_v4(), "token": "x.y.z", "password": "whatever" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), "User not found");
}
