//! User field validation.

use crate::error::CoreError;

/// Maximum length for a username.
pub const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for an email address.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Validate a username: non-blank, bounded, restricted character set.
pub fn validate_username(username: &str) -> Result<(), CoreError> {
    if username.trim().is_empty() {
        return Err(CoreError::Validation(
            "Username must not be empty".to_string(),
        ));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Username exceeds maximum length of {MAX_USERNAME_LENGTH} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(CoreError::Validation(format!(
            "Invalid username '{username}'. Only letters, digits, '_', '-' and '.' are allowed"
        )));
    }
    Ok(())
}

/// Validate an email address.
///
/// Intentionally shallow: one `@` with a non-empty local part and a domain
/// containing a dot. Full RFC validation is the mail server's problem.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(CoreError::Validation(format!(
            "Email exceeds maximum length of {MAX_EMAIL_LENGTH} characters"
        )));
    }
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(CoreError::Validation(format!(
            "Invalid email address '{email}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_usernames_accepted() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("bob_42").is_ok());
        assert!(validate_username("j.doe-jr").is_ok());
    }

    #[test]
    fn blank_username_rejected() {
        assert!(validate_username("").is_err());
        assert!(validate_username("   ").is_err());
    }

    #[test]
    fn username_with_invalid_characters_rejected() {
        assert!(validate_username("alice smith").is_err());
        assert!(validate_username("bob@home").is_err());
    }

    #[test]
    fn overlong_username_rejected() {
        assert!(validate_username(&"x".repeat(MAX_USERNAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn normal_emails_accepted() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("a.b+c@mail.example.org").is_ok());
    }

    #[test]
    fn malformed_emails_rejected() {
        assert!(validate_email("").is_err());
        assert!(validate_email("alice").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@").is_err());
        assert!(validate_email("alice@localhost").is_err());
    }
}
