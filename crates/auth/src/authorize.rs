use thiserror::Error;

use antiwaste_core::{DomainError, UserId};

use crate::{Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("missing role '{0}'")]
    MissingRole(String),

    #[error("principal does not own this resource")]
    NotOwner,
}

impl From<AuthzError> for DomainError {
    fn from(err: AuthzError) -> Self {
        DomainError::forbidden(err.to_string())
    }
}

/// Pure role check. Admins hold every role.
pub fn require_role(principal: &Principal, role: &Role) -> Result<(), AuthzError> {
    if principal.is_admin() || principal.has_role(role) {
        Ok(())
    } else {
        Err(AuthzError::MissingRole(role.as_str().to_string()))
    }
}

/// Capability check for seller-side mutations: the acting user must own the
/// resource, or be an admin.
pub fn ensure_owner_or_admin(principal: &Principal, owner: UserId) -> Result<(), AuthzError> {
    if principal.is_admin() || principal.user_id == owner {
        Ok(())
    } else {
        Err(AuthzError::NotOwner)
    }
}
