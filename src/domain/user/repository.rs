//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{CreateUserInput, UpdateUserInput, User};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Repository contract for user storage
///
/// Not-found outcomes per operation:
/// - `find_by_id` and `update` fail with `DomainError::NotFound`
/// - `find_by_email` returns `Ok(None)`
/// - `delete` returns `Ok(false)`
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Create a user; `Conflict` when the email is already taken
    async fn create(&self, input: &CreateUserInput) -> Result<User, DomainError>;

    /// Get a user by id
    async fn find_by_id(&self, id: &str) -> Result<User, DomainError>;

    /// List all users, oldest first
    async fn find_all(&self) -> Result<Vec<User>, DomainError>;

    /// Apply a partial update and return the stored result
    async fn update(&self, id: &str, input: &UpdateUserInput) -> Result<User, DomainError>;

    /// Delete a user; `true` when a row was removed
    async fn delete(&self, id: &str) -> Result<bool, DomainError>;

    /// Look a user up by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
}
