//! Permission-class checks for the generic resource handlers.

use http::Method;

use warden_acl::{AccessError, Action, Owned, PermissionSet, Principal, ResourceKind};

use crate::error::ApiError;

/// The gate action for an HTTP method on a collection (`instance == false`)
/// or on a single resource.
pub fn action_for(method: &Method, instance: bool) -> Option<Action> {
    match (method, instance) {
        (&Method::GET, false) => Some(Action::List),
        (&Method::POST, false) => Some(Action::Create),
        (&Method::GET, true) => Some(Action::Retrieve),
        (&Method::PUT | &Method::PATCH, true) => Some(Action::Update),
        (&Method::DELETE, true) => Some(Action::Delete),
        _ => None,
    }
}

/// View-level check, before anything is loaded.
pub fn check_view(
    principal: &Principal,
    action: Action,
    kind: ResourceKind,
) -> Result<(), ApiError> {
    if PermissionSet::for_action(action, kind).allows(principal, action) {
        Ok(())
    } else {
        Err(denied(principal, action, kind))
    }
}

/// Object-level check against a loaded resource.
pub fn check_object(
    principal: &Principal,
    action: Action,
    kind: ResourceKind,
    resource: &dyn Owned,
) -> Result<(), ApiError> {
    if PermissionSet::for_action(action, kind).allows_object(principal, action, resource) {
        Ok(())
    } else {
        Err(denied(principal, action, kind))
    }
}

fn denied(principal: &Principal, action: Action, kind: ResourceKind) -> ApiError {
    log::debug!("Denied {action} on {kind} for {principal}");
    AccessError::denied(principal, action, kind).into()
}
