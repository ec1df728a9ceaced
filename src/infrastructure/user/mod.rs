//! User infrastructure module
//!
//! Repository implementations for users: an in-memory variant and one that
//! issues named SQL through an injected query executor.

mod mapper;
mod repository;
mod sql_repository;

pub use mapper::{map_row_to_user, to_timestamp};
pub use repository::InMemoryUserRepository;
pub use sql_repository::SqlUserRepository;

/// Operation labels carried by classified errors
pub mod operations {
    pub const CREATE: &str = "Failed to create user";
    pub const FIND_BY_ID: &str = "Failed to find user by id";
    pub const FIND_ALL: &str = "Failed to find all users";
    pub const UPDATE: &str = "Failed to update user";
    pub const DELETE: &str = "Failed to delete user";
    pub const FIND_BY_EMAIL: &str = "Failed to find user by email";
    pub const ENSURE_SCHEMA: &str = "Failed to create users table";
    pub const CLEAR: &str = "Failed to clear users";
}
