//! Domain layer - Core entities, contracts and errors

pub mod error;
pub mod query;
pub mod store;
pub mod user;

pub use error::DomainError;
pub use query::QuerySource;
pub use store::{QueryExecutor, QueryOutcome, Record, SqlValue, StoreError, StoreErrorKind};
pub use user::{CreateUserInput, UpdateUserInput, User, UserId, UserRepository};
