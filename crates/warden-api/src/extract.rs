//! Request extractors for handlers that need a caller.
//!
//! These are the dependency-style adapter over the gate: a handler declares
//! `CurrentUser` or `CurrentAdmin` as an argument and is never invoked for a
//! caller that fails the check.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use http::request::Parts;

use warden_acl::Principal;
use warden_auth::{AuthenticatedUser, principal_from_parts, user_from_parts};

use crate::error::ApiError;

/// The caller as a gate principal. Never rejects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentPrincipal(pub Principal);

impl<S: Send + Sync> FromRequestParts<S> for CurrentPrincipal {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentPrincipal(principal_from_parts(parts)))
    }
}

/// An authenticated caller. Rejects anonymous requests with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub AuthenticatedUser);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_parts(parts)
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| ApiError::Unauthenticated("Could not validate credentials".to_string()))
    }
}

/// An authenticated superuser. Rejects anonymous requests with 401 and
/// everyone else with 403.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentAdmin(pub AuthenticatedUser);

impl<S: Send + Sync> FromRequestParts<S> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.role.is_superuser() {
            log::debug!("Admin access refused for {}", user.email);
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }
        Ok(CurrentAdmin(user))
    }
}
