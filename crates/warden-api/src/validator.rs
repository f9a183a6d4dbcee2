//! Token validation backed by the account store.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::RwLock;

use warden_auth::{AuthConfig, AuthError, AuthenticatedUser, TokenValidator};
use warden_auth_jwt::JwtAuthority;

use crate::store::{Account, Store};

/// Validates the JWT, then resolves its subject against the store.
///
/// A token for a deleted account is rejected, and the role is taken from the
/// account rather than the token so a demotion applies immediately.
pub struct AccountValidator {
    authority: Arc<JwtAuthority>,
    store: Arc<RwLock<Store>>,
}

impl AccountValidator {
    /// Create a validator over `authority` and `store`.
    pub fn new(authority: Arc<JwtAuthority>, store: Arc<RwLock<Store>>) -> Self {
        Self { authority, store }
    }
}

impl TokenValidator for AccountValidator {
    fn validate(
        &self,
        token: &str,
        config: &AuthConfig,
    ) -> Pin<Box<dyn Future<Output = Result<AuthenticatedUser, AuthError>> + Send + '_>> {
        let claimed = self.authority.validate_token(token, &config.issuer);
        Box::pin(async move {
            let claimed = claimed?;
            let store = self.store.read().await;
            store
                .account_for(&claimed)
                .map(Account::user)
                .ok_or_else(|| AuthError::UnknownPrincipal(claimed.email.clone()))
        })
    }
}
