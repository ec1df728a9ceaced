//! Query source domain
//!
//! SQL text lives outside the code and is looked up by symbolic name.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Symbolic names of the statements the user repository issues
pub mod names {
    pub const CREATE_USER: &str = "create_user";
    pub const FIND_USER_BY_ID: &str = "find_user_by_id";
    pub const FIND_ALL_USERS: &str = "find_all_users";
    pub const FIND_USER_BY_EMAIL: &str = "find_user_by_email";
    pub const UPDATE_USER: &str = "update_user";
    pub const DELETE_USER: &str = "delete_user";
    pub const CREATE_USERS_TABLE: &str = "create_users_table";
    pub const CLEAR_USERS: &str = "clear_users";

    /// Every statement the crate ships with
    pub const ALL: &[&str] = &[
        CLEAR_USERS,
        CREATE_USER,
        CREATE_USERS_TABLE,
        DELETE_USER,
        FIND_ALL_USERS,
        FIND_USER_BY_EMAIL,
        FIND_USER_BY_ID,
        UPDATE_USER,
    ];
}

/// Resolves query names to SQL text
#[cfg_attr(test, automock)]
#[async_trait]
pub trait QuerySource: Send + Sync {
    /// SQL text for `name`; `Configuration` error when it cannot be located
    async fn load_query(&self, name: &str) -> Result<Arc<str>, DomainError>;

    /// Names of every query this source can resolve, sorted
    async fn list_available(&self) -> Result<Vec<String>, DomainError>;

    /// Forget memoized query text
    fn clear_cache(&self);
}
