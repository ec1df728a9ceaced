use thiserror::Error;

/// Core domain errors
///
/// Every failure leaving a repository operation is one of these kinds.
/// Callers branch on the variant (or the `is_*` predicates), never on the
/// rendered message.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Caller supplied input that failed validation; raised before any I/O
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A uniqueness rule would be violated (e.g. duplicate email)
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// The requested entity does not exist
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// A required resource (query text, settings) is missing or unusable
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unclassified store failure, labelled with the failing operation
    #[error("{operation}: {message}")]
    Repository { operation: String, message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn repository(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Repository {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}
