//! User Registry
//!
//! Persistence for a single `User` entity:
//! - Create/read/update/delete through the `UserRepository` trait
//! - Input validation before any store access
//! - Store failures classified into a small error taxonomy
//! - In-memory and PostgreSQL-backed repositories, SQL text loaded by name

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod registry;

pub use config::AppConfig;
pub use domain::{CreateUserInput, DomainError, UpdateUserInput, User, UserRepository};
pub use registry::{build_query_source, create_user_registry, UserRegistry};
