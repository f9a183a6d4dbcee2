//! # warden-api
//!
//! HTTP host for the Warden access gate.
//!
//! This crate wires the gate into an axum application:
//! - `POST /register` and `POST /token` for accounts and access tokens
//! - `GET /me` and the admin-only `GET /users`
//! - generic guarded CRUD under `/api/{kind}` for every resource kind
//! - the bearer-token middleware, backed by the account store
//!
//! A denial for an anonymous caller is a 401 with a `WWW-Authenticate`
//! challenge; a denial for an authenticated caller is a 403.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod error;
pub mod extract;
pub mod guard;
pub mod notify;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;
pub mod validator;

use std::sync::Arc;

use axum::Router;
use warden_auth::{AuthConfig, AuthLayer};

pub use error::{ApiError, Error, Result};
pub use notify::{LogNotifier, OrderConfirmation, OrderNotifier};
pub use server::Server;
pub use state::AppState;
pub use validator::AccountValidator;

/// Build the application: every route behind the auth middleware.
pub fn app(state: AppState, auth: AuthConfig) -> Router {
    let validator = Arc::new(AccountValidator::new(
        state.authority.clone(),
        state.store.clone(),
    ));
    routes::router()
        .layer(AuthLayer::new(validator, auth))
        .with_state(state)
}
