//! Query source implementations

mod embedded;
mod file;

pub use embedded::EmbeddedQuerySource;
pub use file::FileQuerySource;
