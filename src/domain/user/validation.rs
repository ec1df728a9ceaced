//! User validation utilities

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::entity::{CreateUserInput, UpdateUserInput};
use crate::domain::DomainError;

/// `local@domain.tld`: no whitespace, an `@`, and a `.` after it
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("{0} cannot be empty")]
    EmptyField(String),

    #[error("Invalid {0} format")]
    InvalidFieldFormat(String),

    #[error("{0} is required")]
    Required(String),
}

impl From<UserValidationError> for DomainError {
    fn from(err: UserValidationError) -> Self {
        DomainError::validation(err.to_string())
    }
}

/// Check an email against the loose `local@domain.tld` shape
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Validate input for user creation
///
/// Rules:
/// - Name cannot be blank
/// - Email cannot be blank
/// - Email must match `local@domain.tld`
pub fn validate_create_input(input: &CreateUserInput) -> Result<(), UserValidationError> {
    if input.name.trim().is_empty() {
        return Err(UserValidationError::EmptyName);
    }

    if input.email.trim().is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }

    if !is_valid_email(&input.email) {
        return Err(UserValidationError::InvalidEmail);
    }

    Ok(())
}

/// Validate a field only when it was provided
///
/// Absent values pass. Present values must be non-blank and, when a
/// format validator is given, satisfy it.
pub fn validate_optional_field(
    value: Option<&str>,
    field_name: &str,
    validator: Option<fn(&str) -> bool>,
) -> Result<(), UserValidationError> {
    let Some(value) = value else {
        return Ok(());
    };

    if value.trim().is_empty() {
        return Err(UserValidationError::EmptyField(field_name.to_string()));
    }

    if let Some(is_valid) = validator {
        if !is_valid(value) {
            return Err(UserValidationError::InvalidFieldFormat(
                field_name.to_lowercase(),
            ));
        }
    }

    Ok(())
}

/// Validate input for a partial update, one field at a time
pub fn validate_update_input(input: &UpdateUserInput) -> Result<(), UserValidationError> {
    validate_optional_field(input.name.as_deref(), "Name", None)?;
    validate_optional_field(input.email.as_deref(), "Email", Some(is_valid_email))?;

    Ok(())
}

/// Validate an identifier or lookup key argument
pub fn validate_required(value: &str, name: &str) -> Result<(), UserValidationError> {
    if value.trim().is_empty() {
        return Err(UserValidationError::Required(name.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Email predicate
    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("john@example.com"));
        assert!(is_valid_email("john.doe@example.co.uk"));
        assert!(is_valid_email("a+tag@sub.domain.io"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("invalid-email"));
        assert!(!is_valid_email("john@example"));
        assert!(!is_valid_email("john doe@example.com"));
        assert!(!is_valid_email("john@exa mple.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("john@.com"));
    }

    // Create input
    #[test]
    fn test_valid_create_input() {
        let input = CreateUserInput::new("John Doe", "john.doe@example.com");
        assert!(validate_create_input(&input).is_ok());
    }

    #[test]
    fn test_create_input_empty_name() {
        let input = CreateUserInput::new("", "test@example.com");
        assert_eq!(
            validate_create_input(&input),
            Err(UserValidationError::EmptyName)
        );
    }

    #[test]
    fn test_create_input_blank_name() {
        let input = CreateUserInput::new("   ", "test@example.com");
        assert_eq!(
            validate_create_input(&input),
            Err(UserValidationError::EmptyName)
        );
    }

    #[test]
    fn test_create_input_empty_email() {
        let input = CreateUserInput::new("Test User", " ");
        assert_eq!(
            validate_create_input(&input),
            Err(UserValidationError::EmptyEmail)
        );
    }

    #[test]
    fn test_create_input_invalid_email() {
        let input = CreateUserInput::new("Test User", "invalid-email");
        let err = validate_create_input(&input).unwrap_err();

        assert_eq!(err, UserValidationError::InvalidEmail);
        assert_eq!(err.to_string(), "Invalid email format");
    }

    // Optional fields
    #[test]
    fn test_optional_field_absent_is_ok() {
        assert!(validate_optional_field(None, "Email", Some(is_valid_email)).is_ok());
    }

    #[test]
    fn test_optional_field_present_but_empty() {
        let err = validate_optional_field(Some(""), "Name", None).unwrap_err();
        assert_eq!(err.to_string(), "Name cannot be empty");
    }

    #[test]
    fn test_optional_field_runs_validator() {
        let err = validate_optional_field(Some("nope"), "Email", Some(is_valid_email)).unwrap_err();
        assert_eq!(err, UserValidationError::InvalidFieldFormat("email".to_string()));
        assert_eq!(err.to_string(), "Invalid email format");
    }

    #[test]
    fn test_update_input() {
        assert!(validate_update_input(&UpdateUserInput::new()).is_ok());
        assert!(validate_update_input(&UpdateUserInput::new().with_name("Jane")).is_ok());
        assert!(validate_update_input(&UpdateUserInput::new().with_name("")).is_err());
        assert!(validate_update_input(&UpdateUserInput::new().with_email("bad")).is_err());
    }

    // Required arguments
    #[test]
    fn test_required() {
        assert!(validate_required("user-1", "User ID").is_ok());

        let err = validate_required("", "User ID").unwrap_err();
        assert_eq!(err.to_string(), "User ID is required");
    }

    #[test]
    fn test_into_domain_error() {
        let err: DomainError = UserValidationError::EmptyEmail.into();
        assert_eq!(err, DomainError::validation("Email cannot be empty"));
    }
}
