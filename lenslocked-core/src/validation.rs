use crate::error::ValidationError;
use regex::Regex;
use std::sync::LazyLock;

/// Input validation shared by the services.
///
/// Email addresses are checked against a practical subset of RFC 5322.
static EMAIL_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());

pub const MAX_TITLE_LENGTH: usize = 255;

/// Lower-case and trim an email address.
///
/// Lookups and inserts both go through this so `Bob@Example.com` and
/// `bob@example.com` are the same account.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates an email address
///
/// # Examples
///
/// ```rust
/// use lenslocked_core::validation::validate_email;
///
/// assert!(validate_email("user@example.com").is_ok());
/// assert!(validate_email("invalid-email").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingField(
            "Email is required".to_string(),
        ));
    }

    if email.len() > 254 {
        return Err(ValidationError::InvalidEmail(
            "Email is too long".to_string(),
        ));
    }

    match EMAIL_REGEX.as_ref() {
        Some(regex) if regex.is_match(email) => Ok(()),
        _ => Err(ValidationError::InvalidEmail(email.to_string())),
    }
}

/// Validates a password
///
/// - Minimum 8 characters
/// - Maximum 128 characters
/// - Cannot be whitespace only
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::MissingField(
            "Password is required".to_string(),
        ));
    }

    if password.trim().is_empty() {
        return Err(ValidationError::InvalidPassword(
            "Password cannot be only whitespace".to_string(),
        ));
    }

    let length = password.chars().count();

    if length < 8 {
        return Err(ValidationError::InvalidPassword(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    if length > 128 {
        return Err(ValidationError::InvalidPassword(
            "Password must be no more than 128 characters long".to_string(),
        ));
    }

    Ok(())
}

/// Validate and trim a gallery title.
///
/// Returns the trimmed title so callers store exactly what was checked.
pub fn validate_gallery_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::MissingField(
            "Title is required".to_string(),
        ));
    }

    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ValidationError::InvalidField(format!(
            "Title must be no more than {MAX_TITLE_LENGTH} characters long"
        )));
    }

    Ok(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("test.email+tag@domain.co.uk").is_ok());
        assert!(validate_email("user123@test-domain.com").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(validate_email("").is_err());
        assert!(validate_email("invalid-email").is_err());
        assert!(validate_email("@domain.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());

        let long_email = format!("{}@example.com", "a".repeat(250));
        assert!(validate_email(&long_email).is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Bob@Example.COM "), "bob@example.com");
        assert_eq!(normalize_email("bob@example.com"), "bob@example.com");
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("12345678").is_ok());

        assert!(validate_password("").is_err());
        assert!(validate_password("         ").is_err());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"a".repeat(129)).is_err());

        // Bounds count characters, not bytes
        assert!(validate_password(&"🔒".repeat(40)).is_ok());
        assert!(validate_password(&"🔒".repeat(128)).is_ok());
        assert!(validate_password(&"🔒".repeat(129)).is_err());
        assert!(validate_password("éééé").is_err());
    }

    #[test]
    fn test_validate_gallery_title() {
        assert_eq!(
            validate_gallery_title("  Summer 2024  ").unwrap(),
            "Summer 2024"
        );
        assert_eq!(
            validate_gallery_title(&"é".repeat(MAX_TITLE_LENGTH)).unwrap(),
            "é".repeat(MAX_TITLE_LENGTH)
        );

        assert!(matches!(
            validate_gallery_title("   "),
            Err(ValidationError::MissingField(_))
        ));
        assert!(matches!(
            validate_gallery_title(&"a".repeat(MAX_TITLE_LENGTH + 1)),
            Err(ValidationError::InvalidField(_))
        ));
    }
}
