//! JWT token issuance and validation for Warden.
//!
//! Implements [`warden_auth::TokenValidator`] for HS256 bearer tokens:
//! - [`JwtAuthority`] signs an access/refresh pair after a successful login
//! - the same authority validates access tokens on every request
//! - refresh tokens are exchanged for a new access token
//! - [`password`] hashes and verifies account passwords (Argon2)
//!
//! Token claims: `sub` (email), `uid` (principal id), `role`, `token_type`,
//! `iss`, `iat`, `exp`.

pub mod password;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use warden_acl::{PrincipalId, Role};
use warden_auth::{AuthConfig, AuthError, AuthenticatedUser, TokenValidator};

pub use password::{hash_password, verify_password};

/// Access token lifetime used when none is configured (15 minutes).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);

/// Refresh token lifetime used when none is configured (one day).
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Token type reported alongside issued tokens.
pub const TOKEN_TYPE: &str = "bearer";

/// What a token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    /// Sent as a bearer token on API requests.
    #[default]
    Access,
    /// Only exchanged for a new access token.
    Refresh,
}

impl TokenUse {
    /// Claim value for this use.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenUse::Access => "access",
            TokenUse::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims carried by a Warden token.
///
/// Everything except the registered `exp` claim is optional on the wire so
/// that a missing claim is reported by name instead of as a parse failure.
/// A token without `token_type` is an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Principal id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<u64>,
    /// Role name (`admin` or `user`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Access or refresh.
    #[serde(default, rename = "token_type")]
    pub token_use: TokenUse,
    /// Issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Issued at (seconds since the epoch).
    pub iat: u64,
    /// Expiry (seconds since the epoch).
    pub exp: u64,
}

impl Claims {
    /// Build claims for `user`, expiring `ttl` from now.
    pub fn for_user(
        user: &AuthenticatedUser,
        issuer: &str,
        token_use: TokenUse,
        ttl: Duration,
    ) -> Self {
        let now = now_epoch();
        Self {
            sub: Some(user.email.clone()),
            uid: Some(user.id.get()),
            role: Some(user.role.as_str().to_string()),
            token_use,
            iss: (!issuer.is_empty()).then(|| issuer.to_string()),
            iat: now,
            exp: now.saturating_add(ttl.as_secs()),
        }
    }

    /// Convert validated claims into an authenticated user.
    pub fn into_user(self) -> Result<AuthenticatedUser, AuthError> {
        let email = self.sub.ok_or(AuthError::MissingClaim("sub"))?;
        let id = self.uid.ok_or(AuthError::MissingClaim("uid"))?;
        let role = self
            .role
            .ok_or(AuthError::MissingClaim("role"))?
            .parse::<Role>()
            .map_err(|e| AuthError::InvalidFormat(e.to_string()))?;

        Ok(AuthenticatedUser {
            id: PrincipalId::new(id),
            email,
            role,
        })
    }
}

/// The token pair returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    /// Bearer token for API requests.
    pub access_token: String,
    /// Exchanged at the refresh endpoint for a new access token.
    pub refresh_token: String,
    /// Always [`TOKEN_TYPE`].
    pub token_type: String,
    /// Seconds until the access token expires.
    pub expires_in: u64,
    /// Principal id of the account.
    pub user_id: PrincipalId,
    /// Display name of the account.
    pub username: String,
    /// Login email of the account.
    pub email: String,
}

/// A new access token minted from a refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshedToken {
    /// Bearer token for API requests.
    pub access_token: String,
    /// Always [`TOKEN_TYPE`].
    pub token_type: String,
    /// Seconds until expiry.
    pub expires_in: u64,
}

/// Signs and validates HS256 tokens with a shared secret.
pub struct JwtAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtAuthority {
    /// Create an authority for `secret`, issuing tokens as `issuer` with the
    /// default lifetimes.
    pub fn new(secret: &str, issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            ttl: DEFAULT_TOKEN_TTL,
            refresh_ttl: DEFAULT_REFRESH_TTL,
        }
    }

    /// Set the lifetime of access tokens.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the lifetime of refresh tokens.
    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    /// The access token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The issuer written into tokens.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// The refresh token lifetime.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Issue an access/refresh pair for `user`, whose display name is
    /// `username`.
    pub fn issue(
        &self,
        user: &AuthenticatedUser,
        username: &str,
    ) -> Result<IssuedToken, AuthError> {
        let access_token = self.sign(user, TokenUse::Access, self.ttl)?;
        let refresh_token = self.sign(user, TokenUse::Refresh, self.refresh_ttl)?;
        log::debug!("Issued token pair for principal {} ({})", user.id, user.email);

        Ok(IssuedToken {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.ttl.as_secs(),
            user_id: user.id,
            username: username.to_string(),
            email: user.email.clone(),
        })
    }

    /// Mint a new access token for `user`, who presented a valid refresh
    /// token.
    pub fn refresh(&self, user: &AuthenticatedUser) -> Result<RefreshedToken, AuthError> {
        let access_token = self.sign(user, TokenUse::Access, self.ttl)?;
        log::debug!("Refreshed access token for principal {}", user.id);

        Ok(RefreshedToken {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.ttl.as_secs(),
        })
    }

    /// Validate an access token and return the user it was issued for.
    ///
    /// `issuer` overrides the authority's own issuer when non-empty.
    pub fn validate_token(
        &self,
        token: &str,
        issuer: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        self.validate_as(token, issuer, TokenUse::Access)
    }

    /// Validate a refresh token and return the user it was issued for.
    pub fn validate_refresh_token(
        &self,
        token: &str,
        issuer: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        self.validate_as(token, issuer, TokenUse::Refresh)
    }

    fn sign(
        &self,
        user: &AuthenticatedUser,
        token_use: TokenUse,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let claims = Claims::for_user(user, &self.issuer, token_use, ttl);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("token signing failed: {e}")))
    }

    fn validate_as(
        &self,
        token: &str,
        issuer: &str,
        expected: TokenUse,
    ) -> Result<AuthenticatedUser, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        let expected_issuer = if issuer.is_empty() {
            self.issuer.as_str()
        } else {
            issuer
        };
        if expected_issuer.is_empty() {
            validation.set_required_spec_claims(&["exp"]);
        } else {
            validation.set_required_spec_claims(&["exp", "iss"]);
            validation.set_issuer(&[expected_issuer]);
        }

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::Expired,
                    ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
                    ErrorKind::InvalidSignature => AuthError::InvalidSignature(e.to_string()),
                    ErrorKind::MissingRequiredClaim(claim) => {
                        AuthError::MissingClaim(registered_claim(claim))
                    }
                    _ => AuthError::InvalidFormat(e.to_string()),
                }
            })?;

        if token_data.claims.token_use != expected {
            return Err(AuthError::WrongTokenType(expected.as_str()));
        }
        token_data.claims.into_user()
    }
}

impl TokenValidator for JwtAuthority {
    fn validate(
        &self,
        token: &str,
        config: &AuthConfig,
    ) -> Pin<Box<dyn Future<Output = Result<AuthenticatedUser, AuthError>> + Send + '_>> {
        let result = self.validate_token(token, &config.issuer);
        Box::pin(async move { result })
    }
}

/// Static name of a registered claim reported missing by the decoder.
fn registered_claim(name: &str) -> &'static str {
    match name {
        "exp" => "exp",
        "iss" => "iss",
        "sub" => "sub",
        "aud" => "aud",
        "nbf" => "nbf",
        _ => "unknown",
    }
}

fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
