//! Infrastructure layer - Store, query source and repository implementations

pub mod logging;
pub mod query;
pub mod store;
pub mod user;
