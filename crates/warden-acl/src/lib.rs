//! # warden-acl
//!
//! Access control gate for Warden.
//!
//! This crate implements the authorization decision for Warden hosts:
//! - Principals (anonymous or authenticated, with a superuser role)
//! - Actions (register, issue token, list, retrieve, create, update, delete)
//! - Resource kinds and their ownership rules
//! - The pure [`decide`] function that every adapter delegates to
//! - Permission-class adapters for view-level and object-level checks
//!
//! # Example
//!
//! ```
//! use warden_acl::{Action, Identity, Principal, PrincipalId, ResourceKind, ResourceRef, decide};
//!
//! let alice = Principal::from(Identity::user(PrincipalId::new(1)));
//! let post = ResourceRef::owned_by(PrincipalId::new(2));
//!
//! assert!(decide(&alice, Action::List, ResourceKind::Post, None).is_allowed());
//! assert!(decide(&alice, Action::Delete, ResourceKind::Post, Some(&post)).is_denied());
//! ```

#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod action;
pub mod error;
pub mod gate;
pub mod permission;
pub mod principal;
pub mod resource;

mod proptests;

pub use action::Action;
pub use error::{AccessError, Result};
pub use gate::{AccessDecision, decide};
pub use permission::{AllowAny, IsAuthenticated, Permission, PermissionSet, ResourcePermission};
pub use principal::{Identity, Principal, PrincipalId, Role};
pub use resource::{Owned, ResourceKind, ResourceRef, WritePolicy};
