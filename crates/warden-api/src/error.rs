//! Error types for warden-api

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;
use thiserror::Error;
use warden_acl::{AccessError, ResourceKind};
use warden_auth::AuthError;

use crate::store::StoreError;

/// Result type alias for warden-api server operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running the API server
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// I/O error (binding, accepting connections)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid server configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors returned to HTTP clients.
///
/// Rendered as `{"error": {"category": ..., "message": ...}}`.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiError {
    /// The gate denied an anonymous principal, or credentials were rejected.
    #[error("{0}")]
    Unauthenticated(String),

    /// The gate denied an authenticated principal.
    #[error("{0}")]
    Forbidden(String),

    /// The addressed resource does not exist.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Kind of the missing resource
        kind: ResourceKind,
        /// Requested id
        id: u64,
    },

    /// The collection path names no known resource kind.
    #[error("unknown resource collection '{0}'")]
    UnknownCollection(String),

    /// The request body was unacceptable.
    #[error("{0}")]
    BadRequest(String),

    /// Anything the client cannot fix.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Creates a bad-request error.
    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        ApiError::BadRequest(message.into())
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } | ApiError::UnknownCollection(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error category reported in the response body.
    pub fn category(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated(_) => "authentication",
            ApiError::Forbidden(_) => "authorization",
            ApiError::NotFound { .. } | ApiError::UnknownCollection(_) => "not_found",
            ApiError::BadRequest(_) => "validation",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::Unauthenticated { .. } => ApiError::Unauthenticated(e.to_string()),
            AccessError::Forbidden { .. } => ApiError::Forbidden(e.to_string()),
            AccessError::UnknownKind(kind) => ApiError::UnknownCollection(kind),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        if e.is_client_error() {
            ApiError::Unauthenticated(e.to_string())
        } else {
            ApiError::Internal(e.to_string())
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => ApiError::BadRequest(e.to_string()),
            StoreError::NotFound { kind, id } => ApiError::NotFound { kind, id },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            ApiError::Unauthenticated(_) => warden_auth::unauthorized_response(&message),
            ApiError::Internal(_) => {
                log::error!("Internal error: {message}");
                let body = json!({
                    "error": {"category": self.category(), "message": "internal server error"}
                });
                (self.status(), Json(body)).into_response()
            }
            _ => {
                let body = json!({"error": {"category": self.category(), "message": message}});
                (self.status(), Json(body)).into_response()
            }
        }
    }
}
