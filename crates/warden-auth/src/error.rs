//! Auth-specific error types.

/// Errors that can occur during authentication.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AuthError {
    /// No Authorization header or bearer token present.
    #[error("missing authentication token")]
    MissingToken,

    /// Token format is invalid (not a valid JWT).
    #[error("invalid token format: {0}")]
    InvalidFormat(String),

    /// Token signature verification failed.
    #[error("invalid token signature: {0}")]
    InvalidSignature(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token issuer doesn't match the configured issuer.
    #[error("invalid issuer")]
    InvalidIssuer,

    /// Token is missing a required claim.
    #[error("token missing '{0}' claim")]
    MissingClaim(&'static str),

    /// A refresh token was presented where an access token is expected, or
    /// the reverse.
    #[error("expected {0} token")]
    WrongTokenType(&'static str),

    /// The token is well formed but names a principal that no longer exists.
    #[error("unknown principal: {0}")]
    UnknownPrincipal(String),

    /// Username/password pair did not match.
    #[error("incorrect email or password")]
    InvalidCredentials,

    /// Signing a token or hashing a password failed.
    #[error("credential processing failed: {0}")]
    Internal(String),
}

impl AuthError {
    /// Whether this error should result in a 401 (vs. a 500).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken
                | AuthError::InvalidFormat(_)
                | AuthError::InvalidSignature(_)
                | AuthError::Expired
                | AuthError::InvalidIssuer
                | AuthError::MissingClaim(_)
                | AuthError::WrongTokenType(_)
                | AuthError::UnknownPrincipal(_)
                | AuthError::InvalidCredentials
        )
    }
}
