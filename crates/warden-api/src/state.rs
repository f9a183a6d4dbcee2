//! Shared application state.

use std::sync::Arc;

use tokio::sync::RwLock;

use warden_acl::Role;
use warden_auth_jwt::{JwtAuthority, hash_password};

use crate::error::ApiError;
use crate::notify::{LogNotifier, OrderNotifier};
use crate::store::{Account, Store};

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Accounts and records.
    pub store: Arc<RwLock<Store>>,
    /// Signs access tokens at login.
    pub authority: Arc<JwtAuthority>,
    /// Order confirmation sink.
    pub notifier: Arc<dyn OrderNotifier>,
}

impl AppState {
    /// Fresh state with an empty store and the logging notifier.
    pub fn new(authority: JwtAuthority) -> Self {
        Self {
            store: Arc::new(RwLock::new(Store::new())),
            authority: Arc::new(authority),
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Replace the order notifier.
    pub fn with_notifier(mut self, notifier: Arc<dyn OrderNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Create a superuser account. Registration only ever creates regular
    /// users, so this is how admins come to exist.
    pub async fn seed_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Account, ApiError> {
        let hash = hash_password(password)?;
        let account = self
            .store
            .write()
            .await
            .create_account(username, email, hash, Role::Admin)?;
        log::info!("Seeded admin account {} ({})", account.id, account.email);
        Ok(account)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("issuer", &self.authority.issuer())
            .field("ttl", &self.authority.ttl())
            .field("refresh_ttl", &self.authority.refresh_ttl())
            .finish_non_exhaustive()
    }
}
