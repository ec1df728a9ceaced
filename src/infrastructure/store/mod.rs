//! Store infrastructure
//!
//! The PostgreSQL executor and the classification of store failures.

mod classifier;
mod postgres;

pub use classifier::{
    email_conflict, handle_db_error, handle_not_found_error, ErrorHandler, EMAIL_EXISTS,
};
pub use postgres::{DatabaseInfo, PostgresExecutor};
