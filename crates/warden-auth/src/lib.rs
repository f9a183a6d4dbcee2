//! Authentication primitives for Warden.
//!
//! Provides:
//! - [`AuthenticatedUser`]: Identity extracted from a validated token
//! - [`TokenValidator`]: Trait for async token validation (implement per token format)
//! - [`AuthLayer`] / [`AuthService`]: Tower middleware parameterised over `TokenValidator`
//! - [`AuthConfig`]: Configuration for the auth layer
//! - [`AuthError`]: Auth-specific error types
//!
//! The middleware only authenticates. Requests without a bearer token pass
//! through as anonymous so the access gate can decide on them; requests
//! with a bad token are rejected with 401.

mod error;
mod middleware;
mod user;

pub use error::AuthError;
pub use middleware::{AuthLayer, AuthService, unauthorized_response};
pub use user::{AuthenticatedUser, principal_from_parts, user_from_parts};

/// Configuration for the auth middleware.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Whether authentication is enabled. When false, all requests pass through
    /// unauthenticated.
    pub enabled: bool,
    /// Expected token issuer. Empty string means any issuer.
    pub issuer: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            issuer: String::new(),
        }
    }
}

/// Trait for validating tokens and extracting user identity.
///
/// Implement this for each token format or identity store. The middleware
/// calls `validate()` with the bearer token and inserts the authenticated
/// user into request extensions on success.
pub trait TokenValidator: Send + Sync + 'static {
    /// Validate a token and return the authenticated user.
    fn validate(
        &self,
        token: &str,
        config: &AuthConfig,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<AuthenticatedUser, AuthError>> + Send + '_>,
    >;
}
