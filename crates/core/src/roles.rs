//! Well-known role name constants.
//!
//! These must match the `users.role` CHECK constraint in the initial
//! migration.

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_AGENT: &str = "agent";
pub const ROLE_CLIENT: &str = "client";

/// All valid role values.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_AGENT, ROLE_CLIENT];

/// Validate that a role string is one of the accepted values.
pub fn validate_role(role: &str) -> Result<(), CoreError> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        )))
    }
}
