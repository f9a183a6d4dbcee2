//! Principals: the actors whose requests the gate decides on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::AccessError;

/// Stable identifier of an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(u64);

impl PrincipalId {
    /// Creates a principal id from its numeric value.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PrincipalId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for PrincipalId {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| AccessError::InvalidPrincipalId(s.to_string()))
    }
}

/// Role carried by a principal.
///
/// `Admin` is the superuser role: it bypasses ownership checks and is the
/// only role allowed to write catalogue resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Superuser.
    Admin,
    /// Regular user.
    #[default]
    User,
}

impl Role {
    /// Returns `true` for the superuser role.
    pub fn is_superuser(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// The wire name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" | "superuser" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            _ => Err(AccessError::UnknownRole(s.to_string())),
        }
    }
}

/// The identity of an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Principal id.
    pub id: PrincipalId,
    /// Principal role.
    pub role: Role,
}

impl Identity {
    /// Creates an identity with an explicit role.
    pub fn new(id: PrincipalId, role: Role) -> Self {
        Self { id, role }
    }

    /// Creates a regular user identity.
    pub fn user(id: PrincipalId) -> Self {
        Self::new(id, Role::User)
    }

    /// Creates a superuser identity.
    pub fn superuser(id: PrincipalId) -> Self {
        Self::new(id, Role::Admin)
    }

    /// Returns `true` if this identity has the superuser role.
    pub fn is_superuser(&self) -> bool {
        self.role.is_superuser()
    }
}

/// The actor making a request: anonymous, or an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Principal {
    /// No credentials were presented.
    #[default]
    Anonymous,
    /// Credentials were verified.
    Authenticated(Identity),
}

impl Principal {
    /// Returns `true` if the principal presented verified credentials.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::Authenticated(_))
    }

    /// The identity, if authenticated.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Principal::Anonymous => None,
            Principal::Authenticated(identity) => Some(identity),
        }
    }

    /// The principal id, if authenticated.
    pub fn id(&self) -> Option<PrincipalId> {
        self.identity().map(|i| i.id)
    }

    /// Returns `true` if authenticated with the superuser role.
    pub fn is_superuser(&self) -> bool {
        self.identity().is_some_and(Identity::is_superuser)
    }
}

impl From<Identity> for Principal {
    fn from(identity: Identity) -> Self {
        Principal::Authenticated(identity)
    }
}

impl From<Option<Identity>> for Principal {
    fn from(identity: Option<Identity>) -> Self {
        identity.map_or(Principal::Anonymous, Principal::Authenticated)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::Anonymous => f.write_str("anonymous"),
            Principal::Authenticated(identity) => {
                write!(f, "principal {} ({})", identity.id, identity.role)
            }
        }
    }
}
