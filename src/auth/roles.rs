//! Role membership checks

use crate::error::AuthError;
use crate::models::{RoleName, User};

/// True iff `assigned` intersects `required`; an empty `required` means no restriction
pub fn has_any(assigned: &[RoleName], required: &[RoleName]) -> bool {
    required.is_empty() || required.iter().any(|r| assigned.contains(r))
}

/// Gate an authenticated user on holding at least one of `required`
pub fn authorize(user: &User, required: &[RoleName]) -> Result<(), AuthError> {
    if has_any(&user.role_names(), required) {
        Ok(())
    } else {
        Err(AuthError::Forbidden(format!(
            "user {} lacks any of the required roles",
            user.id
        )))
    }
}
