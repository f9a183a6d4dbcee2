//! Resource kinds and ownership.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{AccessError, PrincipalId};

/// How writes to a resource kind are decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WritePolicy {
    /// Any authenticated principal may create; only the owner or a
    /// superuser may update or delete.
    OwnerOrSuperuser,
    /// Read-only for everyone except superusers.
    SuperuserOnly,
}

/// A kind of domain entity subject to access control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// A registered account. Each author owns their own record.
    Author,
    /// A blog post, owned by its author.
    Post,
    /// A post tag.
    Tag,
    /// A product category.
    Category,
    /// A catalogue product.
    Product,
    /// A customer order, owned by whoever placed it.
    Order,
}

impl ResourceKind {
    /// Every resource kind, in declaration order.
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Author,
        ResourceKind::Post,
        ResourceKind::Tag,
        ResourceKind::Category,
        ResourceKind::Product,
        ResourceKind::Order,
    ];

    /// The write policy governing this kind.
    pub fn write_policy(self) -> WritePolicy {
        match self {
            ResourceKind::Author | ResourceKind::Post | ResourceKind::Order => {
                WritePolicy::OwnerOrSuperuser
            }
            ResourceKind::Tag | ResourceKind::Category | ResourceKind::Product => {
                WritePolicy::SuperuserOnly
            }
        }
    }

    /// Singular name, e.g. `post`.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Author => "author",
            ResourceKind::Post => "post",
            ResourceKind::Tag => "tag",
            ResourceKind::Category => "category",
            ResourceKind::Product => "product",
            ResourceKind::Order => "order",
        }
    }

    /// Plural name used as a collection path segment, e.g. `posts`.
    pub fn plural(self) -> &'static str {
        match self {
            ResourceKind::Author => "authors",
            ResourceKind::Post => "posts",
            ResourceKind::Tag => "tags",
            ResourceKind::Category => "categories",
            ResourceKind::Product => "products",
            ResourceKind::Order => "orders",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = AccessError;

    /// Accepts singular or plural names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle || kind.plural() == needle)
            .ok_or_else(|| AccessError::UnknownKind(s.to_string()))
    }
}

/// Anything that may carry an owner reference.
pub trait Owned {
    /// The owning principal, if the resource has one.
    fn owner(&self) -> Option<PrincipalId>;
}

/// A minimal resource view: just its owner reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceRef {
    owner: Option<PrincipalId>,
}

impl ResourceRef {
    /// A resource owned by `owner`.
    pub fn owned_by(owner: PrincipalId) -> Self {
        Self { owner: Some(owner) }
    }

    /// A resource with no owner field.
    pub fn unowned() -> Self {
        Self { owner: None }
    }
}

impl Owned for ResourceRef {
    fn owner(&self) -> Option<PrincipalId> {
        self.owner
    }
}

impl From<Option<PrincipalId>> for ResourceRef {
    fn from(owner: Option<PrincipalId>) -> Self {
        Self { owner }
    }
}
