//! Department field validation.

use crate::error::CoreError;

/// Maximum length for a department name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Validate a department name: non-blank, bounded length.
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Department name must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Department name exceeds maximum length of {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}
