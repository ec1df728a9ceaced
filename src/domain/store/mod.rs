//! Store domain
//!
//! The seam between repositories and the relational store: the executor
//! trait, the raw row representation and structured store failures.

mod executor;
mod record;

pub use executor::{QueryExecutor, StoreError, StoreErrorKind};
pub use record::{QueryOutcome, Record, SqlValue};

#[cfg(test)]
pub use executor::MockQueryExecutor;
