//! Query source over the SQL files bundled into the binary

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::query::names;
use crate::domain::{DomainError, QuerySource};

static BUNDLED: &[(&str, &str)] = &[
    (names::CLEAR_USERS, include_str!("../../../queries/clear_users.sql")),
    (names::CREATE_USER, include_str!("../../../queries/create_user.sql")),
    (
        names::CREATE_USERS_TABLE,
        include_str!("../../../queries/create_users_table.sql"),
    ),
    (names::DELETE_USER, include_str!("../../../queries/delete_user.sql")),
    (names::FIND_ALL_USERS, include_str!("../../../queries/find_all_users.sql")),
    (
        names::FIND_USER_BY_EMAIL,
        include_str!("../../../queries/find_user_by_email.sql"),
    ),
    (names::FIND_USER_BY_ID, include_str!("../../../queries/find_user_by_id.sql")),
    (names::UPDATE_USER, include_str!("../../../queries/update_user.sql")),
];

/// Serves the `queries/` directory compiled in at build time
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedQuerySource;

impl EmbeddedQuerySource {
    pub fn new() -> Self {
        Self
    }

    /// Bundled text for `name`, if any
    pub fn get(name: &str) -> Option<&'static str> {
        BUNDLED
            .iter()
            .find(|(query_name, _)| *query_name == name)
            .map(|(_, sql)| *sql)
    }
}

#[async_trait]
impl QuerySource for EmbeddedQuerySource {
    async fn load_query(&self, name: &str) -> Result<Arc<str>, DomainError> {
        Self::get(name)
            .map(Arc::from)
            .ok_or_else(|| DomainError::configuration(format!("Unknown SQL query '{}'", name)))
    }

    async fn list_available(&self) -> Result<Vec<String>, DomainError> {
        let mut names: Vec<String> = BUNDLED.iter().map(|(name, _)| name.to_string()).collect();
        names.sort();
        Ok(names)
    }

    // Static text, nothing to forget
    fn clear_cache(&self) {}
}
