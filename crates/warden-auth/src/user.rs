//! Authenticated user identity and extraction helpers.

use serde::{Deserialize, Serialize};
use warden_acl::{Identity, Principal, PrincipalId, Role};

/// An authenticated user identity, extracted from a validated token.
///
/// Stored in HTTP request extensions by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// The user's principal id.
    pub id: PrincipalId,
    /// The user's email address (the token subject).
    pub email: String,
    /// The user's role.
    pub role: Role,
}

impl AuthenticatedUser {
    /// The gate identity of this user.
    pub fn identity(&self) -> Identity {
        Identity::new(self.id, self.role)
    }

    /// The gate principal of this user.
    pub fn principal(&self) -> Principal {
        Principal::from(self.identity())
    }
}

/// Extract the `AuthenticatedUser` from HTTP request `Parts`, if present.
pub fn user_from_parts(parts: &http::request::Parts) -> Option<&AuthenticatedUser> {
    parts.extensions.get::<AuthenticatedUser>()
}

/// The gate principal for a request: anonymous unless the middleware
/// authenticated a user.
pub fn principal_from_parts(parts: &http::request::Parts) -> Principal {
    user_from_parts(parts).map_or(Principal::Anonymous, AuthenticatedUser::principal)
}
