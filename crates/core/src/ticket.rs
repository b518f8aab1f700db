//! Ticket status/priority vocabularies, field validation, and lifecycle rules.
//!
//! The status state machine permits every transition between distinct states;
//! `closed` is special only through the `closed_at` invariant: `closed_at` is
//! non-null exactly when the status is `closed`.

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Maximum length for a ticket title.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for a ticket description.
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;

pub const STATUS_OPEN: &str = "open";
pub const STATUS_IN_PROGRESS: &str = "in-progress";
pub const STATUS_RESOLVED: &str = "resolved";
pub const STATUS_CLOSED: &str = "closed";

/// All valid ticket status values.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_OPEN,
    STATUS_IN_PROGRESS,
    STATUS_RESOLVED,
    STATUS_CLOSED,
];

pub const PRIORITY_LOW: &str = "low";
pub const PRIORITY_MEDIUM: &str = "medium";
pub const PRIORITY_HIGH: &str = "high";

/// All valid ticket priority values.
pub const VALID_PRIORITIES: &[&str] = &[PRIORITY_LOW, PRIORITY_MEDIUM, PRIORITY_HIGH];

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

/// Validate that a status string is one of the accepted values.
pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        )))
    }
}

/// Validate that a priority string is one of the accepted values.
pub fn validate_priority(priority: &str) -> Result<(), CoreError> {
    if VALID_PRIORITIES.contains(&priority) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid priority '{priority}'. Must be one of: {}",
            VALID_PRIORITIES.join(", ")
        )))
    }
}

/// Validate a ticket title: non-blank, bounded length.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(
            "Ticket title must not be empty".to_string(),
        ));
    }
    if title.len() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Ticket title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a ticket description's length.
pub fn validate_description(description: &str) -> Result<(), CoreError> {
    if description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Ticket description exceeds maximum length of {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Maximum length for a comment.
pub const MAX_COMMENT_LENGTH: usize = 5_000;

/// Validate a comment: non-blank, bounded length.
pub fn validate_comment(text: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation(
            "Comment text must not be empty".to_string(),
        ));
    }
    if text.len() > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Comment exceeds maximum length of {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Lifecycle rules
-------------------------------------------------------------------------- */

/// The `closed_at` adjustment implied by a status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedAtChange {
    /// Status did not cross the closed boundary; `closed_at` stays as-is.
    Unchanged,
    /// Transition into `closed`; `closed_at` must be stamped with the current time.
    Set,
    /// Transition out of `closed`; `closed_at` must be cleared to null.
    Clear,
}

/// Derive the `closed_at` adjustment for a status transition.
pub fn closed_at_change(old_status: &str, new_status: &str) -> ClosedAtChange {
    match (old_status == STATUS_CLOSED, new_status == STATUS_CLOSED) {
        (false, true) => ClosedAtChange::Set,
        (true, false) => ClosedAtChange::Clear,
        _ => ClosedAtChange::Unchanged,
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_statuses_accepted() {
        for status in VALID_STATUSES {
            assert!(validate_status(status).is_ok());
        }
    }

    #[test]
    fn invalid_status_rejected() {
        assert!(validate_status("pending").is_err());
        assert!(validate_status("").is_err());
        assert!(validate_status("OPEN").is_err());
    }

    #[test]
    fn valid_priorities_accepted() {
        for priority in VALID_PRIORITIES {
            assert!(validate_priority(priority).is_ok());
        }
    }

    #[test]
    fn invalid_priority_rejected() {
        assert!(validate_priority("urgent").is_err());
        assert!(validate_priority("").is_err());
    }

    #[test]
    fn blank_title_rejected() {
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
    }

    #[test]
    fn overlong_title_rejected() {
        let title = "x".repeat(MAX_TITLE_LENGTH + 1);
        let result = validate_title(&title);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("maximum length"));
    }

    #[test]
    fn normal_title_accepted() {
        assert!(validate_title("Printer on fire").is_ok());
    }

    #[test]
    fn overlong_description_rejected() {
        let description = "x".repeat(MAX_DESCRIPTION_LENGTH + 1);
        assert!(validate_description(&description).is_err());
    }

    #[test]
    fn blank_comment_rejected() {
        assert!(validate_comment("").is_err());
        assert!(validate_comment("  \n ").is_err());
    }

    #[test]
    fn overlong_comment_rejected() {
        assert!(validate_comment(&"x".repeat(MAX_COMMENT_LENGTH + 1)).is_err());
    }

    #[test]
    fn closing_sets_closed_at() {
        assert_eq!(
            closed_at_change(STATUS_OPEN, STATUS_CLOSED),
            ClosedAtChange::Set
        );
        assert_eq!(
            closed_at_change(STATUS_RESOLVED, STATUS_CLOSED),
            ClosedAtChange::Set
        );
    }

    #[test]
    fn reopening_clears_closed_at() {
        assert_eq!(
            closed_at_change(STATUS_CLOSED, STATUS_OPEN),
            ClosedAtChange::Clear
        );
        assert_eq!(
            closed_at_change(STATUS_CLOSED, STATUS_IN_PROGRESS),
            ClosedAtChange::Clear
        );
    }

    #[test]
    fn transitions_not_crossing_closed_leave_closed_at_alone() {
        assert_eq!(
            closed_at_change(STATUS_OPEN, STATUS_RESOLVED),
            ClosedAtChange::Unchanged
        );
        assert_eq!(
            closed_at_change(STATUS_CLOSED, STATUS_CLOSED),
            ClosedAtChange::Unchanged
        );
    }
}
