//! Permission-class adapter.
//!
//! Some hosts authorize in two phases: a view-level check before the
//! resource is loaded, then an object-level check once it is. This module
//! exposes that shape on top of [`decide`](crate::decide) so both phases
//! together always agree with the gate.

use crate::gate::decide;
use crate::resource::{Owned, ResourceKind, WritePolicy};
use crate::{Action, Principal};

/// A two-phase permission check.
pub trait Permission: Send + Sync {
    /// View-level check, before any resource is loaded.
    fn has_permission(&self, principal: &Principal, action: Action) -> bool;

    /// Object-level check against a loaded resource.
    fn has_object_permission(
        &self,
        _principal: &Principal,
        _action: Action,
        _resource: &dyn Owned,
    ) -> bool {
        true
    }
}

/// Allows every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAny;

impl Permission for AllowAny {
    fn has_permission(&self, _principal: &Principal, _action: Action) -> bool {
        true
    }
}

/// Allows any authenticated principal.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsAuthenticated;

impl Permission for IsAuthenticated {
    fn has_permission(&self, principal: &Principal, _action: Action) -> bool {
        principal.is_authenticated()
    }
}

/// Gate-backed permission for one resource kind.
///
/// For [`ResourceKind::Post`] this behaves as an "is post author" check;
/// for [`ResourceKind::Tag`] as "superuser or read-only".
#[derive(Debug, Clone, Copy)]
pub struct ResourcePermission {
    kind: ResourceKind,
}

impl ResourcePermission {
    /// Permission for `kind`.
    pub const fn new(kind: ResourceKind) -> Self {
        Self { kind }
    }
}

impl Permission for ResourcePermission {
    fn has_permission(&self, principal: &Principal, action: Action) -> bool {
        // Ownership is only known once the object is loaded; defer the
        // decision to the object-level check.
        if action.targets_instance() && self.kind.write_policy() == WritePolicy::OwnerOrSuperuser
        {
            return principal.is_authenticated();
        }
        decide(principal, action, self.kind, None).is_allowed()
    }

    fn has_object_permission(
        &self,
        principal: &Principal,
        action: Action,
        resource: &dyn Owned,
    ) -> bool {
        decide(principal, action, self.kind, Some(resource)).is_allowed()
    }
}

/// A conjunction of permissions: every member must allow.
#[derive(Default)]
pub struct PermissionSet {
    permissions: Vec<Box<dyn Permission>>,
}

impl PermissionSet {
    /// An empty set (allows everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard set guarding `kind`: an authenticated principal, then
    /// the kind's own rules.
    pub fn for_kind(kind: ResourceKind) -> Self {
        Self::new()
            .with(IsAuthenticated)
            .with(ResourcePermission::new(kind))
    }

    /// The set guarding `action` on `kind`. Registration and token issuance
    /// are open to everyone; everything else uses [`for_kind`](Self::for_kind).
    pub fn for_action(action: Action, kind: ResourceKind) -> Self {
        if action.is_public() {
            Self::new().with(AllowAny)
        } else {
            Self::for_kind(kind)
        }
    }

    /// Add a permission to the set.
    pub fn with(mut self, permission: impl Permission + 'static) -> Self {
        self.permissions.push(Box::new(permission));
        self
    }

    /// View-level check across every member.
    pub fn allows(&self, principal: &Principal, action: Action) -> bool {
        self.permissions
            .iter()
            .all(|p| p.has_permission(principal, action))
    }

    /// Object-level check across every member.
    pub fn allows_object(
        &self,
        principal: &Principal,
        action: Action,
        resource: &dyn Owned,
    ) -> bool {
        self.permissions
            .iter()
            .all(|p| p.has_object_permission(principal, action, resource))
    }
}

impl std::fmt::Debug for PermissionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionSet")
            .field("len", &self.permissions.len())
            .finish()
    }
}
