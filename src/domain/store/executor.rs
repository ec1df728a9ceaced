//! Query executor trait

use async_trait::async_trait;
use thiserror::Error;

use super::record::{QueryOutcome, SqlValue};

#[cfg(test)]
use mockall::automock;

/// Structured cause of a store failure, decided where the failure originates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// A unique constraint rejected the write
    UniqueViolation,
    /// The store reported that no row matched
    NotFound,
    /// The store could not be reached (pool timeout, closed pool, I/O)
    Unavailable,
    /// Anything else
    Other,
}

/// Failure reported by a query executor
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct StoreError {
    kind: StoreErrorKind,
    message: String,
    constraint: Option<String>,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            constraint: None,
        }
    }

    /// Attach the name of the constraint that rejected the statement
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self
    }

    pub fn unique_violation(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::UniqueViolation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::NotFound, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Unavailable, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Other, message)
    }

    pub fn kind(&self) -> StoreErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn constraint(&self) -> Option<&str> {
        self.constraint.as_deref()
    }
}

/// Issues SQL against the store
///
/// Implementations own their connections; callers construct the executor,
/// hand it to repositories and decide when to close it.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run one statement with positional parameters (`$1`, `$2`, ...)
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<QueryOutcome, StoreError>;
}
