//! Common test utilities for Warden API integration tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower::ServiceExt;

use warden_api::{AppState, OrderConfirmation, OrderNotifier, app};
use warden_auth::AuthConfig;
use warden_auth_jwt::JwtAuthority;

pub const SECRET: &str = "integration-test-secret-7c1f0e2d9b8a";
pub const ISSUER: &str = "warden-test";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const PASSWORD: &str = "correct-horse";

/// Notifier that forwards confirmations to a channel.
pub struct RecordingNotifier(mpsc::UnboundedSender<OrderConfirmation>);

impl OrderNotifier for RecordingNotifier {
    fn notify(
        &self,
        confirmation: OrderConfirmation,
    ) -> Pin<Box<dyn Future<Output = Result<(), String>> + Send + '_>> {
        let sent = self.0.send(confirmation).map_err(|e| e.to_string());
        Box::pin(async move { sent })
    }
}

/// A running application plus the handles tests need.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub confirmations: mpsc::UnboundedReceiver<OrderConfirmation>,
}

impl TestApp {
    /// Application with auth enabled and a seeded admin.
    pub async fn new() -> Self {
        Self::with_auth(AuthConfig {
            enabled: true,
            issuer: ISSUER.to_string(),
        })
        .await
    }

    /// Application with the given auth config and a seeded admin.
    pub async fn with_auth(auth: AuthConfig) -> Self {
        let (tx, confirmations) = mpsc::unbounded_channel();
        let state = AppState::new(JwtAuthority::new(SECRET, ISSUER))
            .with_notifier(Arc::new(RecordingNotifier(tx)));
        state.seed_admin("admin", ADMIN_EMAIL, PASSWORD).await.unwrap();
        let router = app(state.clone(), auth);
        Self {
            router,
            state,
            confirmations,
        }
    }

    /// Send a request and return the status and parsed JSON body
    /// (`Value::Null` for an empty body).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(v) => {
                builder = builder.header(http::header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let resp = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Register a regular account and return its id.
    pub async fn register(&self, username: &str, email: &str) -> u64 {
        let (status, body) = self
            .request(
                Method::POST,
                "/register",
                None,
                Some(json!({"username": username, "email": email, "password": PASSWORD})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["user"]["id"].as_u64().unwrap()
    }

    /// Log in and return the whole token response.
    pub async fn token_pair(&self, email: &str, password: &str) -> Value {
        let (status, body) = self
            .request(
                Method::POST,
                "/token",
                None,
                Some(json!({"email": email, "password": password})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body
    }

    /// Log in and return the access token.
    pub async fn login(&self, email: &str) -> String {
        let body = self.token_pair(email, PASSWORD).await;
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Register then log in; returns `(id, token)`.
    pub async fn user(&self, username: &str) -> (u64, String) {
        let email = format!("{username}@example.com");
        let id = self.register(username, &email).await;
        let token = self.login(&email).await;
        (id, token)
    }

    /// Token for the seeded admin.
    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL).await
    }
}
