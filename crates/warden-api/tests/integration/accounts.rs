//! Registration, login, and account endpoints.

use http::{Method, StatusCode};
use serde_json::json;

use warden_auth::AuthConfig;

use crate::common::{ADMIN_EMAIL, PASSWORD, TestApp};

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;
    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_returns_user_without_password() {
    let app = TestApp::new().await;
    let (status, body) = app
        .request(
            Method::POST,
            "/register",
            None,
            Some(json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": PASSWORD
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email_is_400() {
    let app = TestApp::new().await;
    app.register("alice", "alice@example.com").await;
    let (status, body) = app
        .request(
            Method::POST,
            "/register",
            None,
            Some(json!({"email": "alice@example.com", "password": PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Email already registered");
}

#[tokio::test]
async fn test_register_short_password_is_400() {
    let app = TestApp::new().await;
    let (status, _) = app
        .request(
            Method::POST,
            "/register",
            None,
            Some(json!({"email": "bob@example.com", "password": "short"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_wrong_password_is_401() {
    let app = TestApp::new().await;
    app.register("alice", "alice@example.com").await;
    let (status, body) = app
        .request(
            Method::POST,
            "/token",
            None,
            Some(json!({"email": "alice@example.com", "password": "not-the-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Incorrect email or password");
}

#[tokio::test]
async fn test_login_accepts_username_field() {
    let app = TestApp::new().await;
    app.register("alice", "alice@example.com").await;
    let (status, body) = app
        .request(
            Method::POST,
            "/token",
            None,
            Some(json!({"username": "alice@example.com", "password": PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert!(body["expires_in"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_login_response_carries_user_fields() {
    let app = TestApp::new().await;
    let id = app.register("alice", "alice@example.com").await;
    let body = app.token_pair("alice@example.com", PASSWORD).await;
    assert_eq!(body["user_id"], id);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert!(body["refresh_token"].as_str().is_some());
}

#[tokio::test]
async fn test_refresh_token_yields_working_access_token() {
    let app = TestApp::new().await;
    let id = app.register("alice", "alice@example.com").await;
    let pair = app.token_pair("alice@example.com", PASSWORD).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/token/refresh",
            None,
            Some(json!({"refresh": pair["refresh_token"]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "refresh failed: {body}");
    assert_eq!(body["token_type"], "bearer");

    let access = body["access_token"].as_str().unwrap();
    let (status, me) = app.request(Method::GET, "/me", Some(access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], id);
}

#[tokio::test]
async fn test_access_token_is_not_a_refresh_token() {
    let app = TestApp::new().await;
    let (_, access) = app.user("alice").await;
    let (status, body) = app
        .request(
            Method::POST,
            "/token/refresh",
            None,
            Some(json!({"refresh": access})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["category"], "authentication");
}

#[tokio::test]
async fn test_refresh_token_is_not_a_bearer_token() {
    let app = TestApp::new().await;
    app.register("alice", "alice@example.com").await;
    let pair = app.token_pair("alice@example.com", PASSWORD).await;
    let refresh = pair["refresh_token"].as_str().unwrap();
    let (status, _) = app.request(Method::GET, "/me", Some(refresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_for_deleted_account_is_rejected() {
    let app = TestApp::new().await;
    let id = app.register("alice", "alice@example.com").await;
    let pair = app.token_pair("alice@example.com", PASSWORD).await;
    let access = pair["access_token"].as_str().unwrap();
    let (status, _) = app
        .request(Method::DELETE, &format!("/api/authors/{id}"), Some(access), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .request(
            Method::POST,
            "/token/refresh",
            None,
            Some(json!({"refresh": pair["refresh_token"]})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_password_change_then_login() {
    let app = TestApp::new().await;
    let (id, token) = app.user("alice").await;
    let uri = format!("/api/authors/{id}");

    let (status, body) = app
        .request(
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({"password": "brand-new-pass"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "password change failed: {body}");
    assert_eq!(body["username"], "alice");
    assert!(body.get("password").is_none());

    let (status, _) = app
        .request(
            Method::POST,
            "/token",
            None,
            Some(json!({"email": "alice@example.com", "password": PASSWORD})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let pair = app.token_pair("alice@example.com", "brand-new-pass").await;
    assert_eq!(pair["user_id"], id);
}

#[tokio::test]
async fn test_password_change_enforces_minimum_length() {
    let app = TestApp::new().await;
    let (id, token) = app.user("alice").await;
    let (status, _) = app
        .request(
            Method::PATCH,
            &format!("/api/authors/{id}"),
            Some(&token),
            Some(json!({"password": "short"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    app.token_pair("alice@example.com", PASSWORD).await;
}

#[tokio::test]
async fn test_put_author_requires_username() {
    let app = TestApp::new().await;
    let (id, token) = app.user("alice").await;
    let uri = format!("/api/authors/{id}");

    let (status, body) = app
        .request(
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({"password": "brand-new-pass"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "username is required");

    let (status, body) = app
        .request(
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({"username": "alicia", "password": "brand-new-pass"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alicia");
    app.token_pair("alice@example.com", "brand-new-pass").await;
}

#[tokio::test]
async fn test_me_requires_authentication() {
    let app = TestApp::new().await;
    let (status, _) = app.request(Method::GET, "/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (id, token) = app.user("alice").await;
    let (status, body) = app.request(Method::GET, "/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
}

#[tokio::test]
async fn test_invalid_token_is_401_even_on_public_routes() {
    let app = TestApp::new().await;
    let (status, _) = app
        .request(Method::GET, "/health", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_users_listing_is_admin_only() {
    let app = TestApp::new().await;
    let (_, token) = app.user("alice").await;
    let (status, _) = app.request(Method::GET, "/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.admin_token().await;
    let (status, body) = app.request(Method::GET, "/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let emails: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails, vec![ADMIN_EMAIL, "alice@example.com"]);
}

#[tokio::test]
async fn test_token_for_deleted_account_is_rejected() {
    let app = TestApp::new().await;
    let (id, token) = app.user("alice").await;
    let (status, _) = app
        .request(Method::DELETE, &format!("/api/authors/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.request(Method::GET, "/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let store = app.state.store.read().await;
    assert!(store.account_by_email("alice@example.com").is_none());
}

#[tokio::test]
async fn test_auth_disabled_makes_everyone_anonymous() {
    let app = TestApp::with_auth(AuthConfig {
        enabled: false,
        ..Default::default()
    })
    .await;
    let admin = app.admin_token().await;
    let (status, _) = app
        .request(Method::GET, "/api/posts", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
