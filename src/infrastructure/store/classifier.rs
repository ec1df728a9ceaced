//! Classification of store failures into domain errors

use crate::domain::{DomainError, StoreError, StoreErrorKind};

/// Message used whenever an email is already registered
pub const EMAIL_EXISTS: &str = "Email already exists";

/// Hook that may replace the generic classification of a store failure
pub type ErrorHandler = dyn Fn(&StoreError) -> Option<DomainError> + Send + Sync;

/// Turn a store failure into a classified error labelled with `operation`
///
/// The custom handler gets the first say; a `Some` result is used as is.
/// Failures the store itself tagged as not-found become `NotFound`, every
/// other failure becomes `Repository` carrying the underlying message.
pub fn handle_db_error(
    operation: &str,
    error: StoreError,
    custom_handler: Option<&ErrorHandler>,
) -> DomainError {
    if let Some(handler) = custom_handler {
        if let Some(replacement) = handler(&error) {
            tracing::debug!(operation, error = %error, "Store failure replaced by custom handler");
            return replacement;
        }
    }

    if error.kind() == StoreErrorKind::NotFound {
        return handle_not_found_error(operation, Some(&error));
    }

    tracing::warn!(
        operation,
        kind = ?error.kind(),
        error = %error,
        "Store operation failed"
    );

    DomainError::repository(operation, error.message())
}

/// Classify as not found regardless of the underlying cause
pub fn handle_not_found_error(operation: &str, cause: Option<&StoreError>) -> DomainError {
    if let Some(cause) = cause {
        tracing::debug!(operation, error = %cause, "Store failure classified as not found");
    }

    DomainError::not_found(format!("{}: Resource not found", operation))
}

/// Custom handler mapping a unique violation on the email column to a conflict
///
/// The store constraint is the authoritative uniqueness guard; this turns
/// a lost race between two writers into the same error the pre-check gives.
pub fn email_conflict(error: &StoreError) -> Option<DomainError> {
    if error.kind() != StoreErrorKind::UniqueViolation {
        return None;
    }

    match error.constraint() {
        Some(constraint) if !constraint.contains("email") => None,
        _ => Some(DomainError::conflict(EMAIL_EXISTS)),
    }
}
