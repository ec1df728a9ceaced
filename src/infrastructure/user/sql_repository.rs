//! User repository backed by named SQL statements

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::mapper::map_row_to_user;
use super::operations;
use crate::domain::query::names;
use crate::domain::user::{
    now, validate_create_input, validate_required, validate_update_input, CreateUserInput,
    UpdateUserInput, User, UserRepository,
};
use crate::domain::{DomainError, QueryExecutor, QueryOutcome, QuerySource, SqlValue};
use crate::infrastructure::store::{
    email_conflict, handle_db_error, handle_not_found_error, ErrorHandler, EMAIL_EXISTS,
};

/// UserRepository issuing SQL through an injected executor
///
/// The executor and the query source are owned by the caller. The
/// `users.email` unique constraint is the authoritative uniqueness guard;
/// the lookups before insert and update only reject early.
#[derive(Clone)]
pub struct SqlUserRepository {
    executor: Arc<dyn QueryExecutor>,
    queries: Arc<dyn QuerySource>,
}

impl fmt::Debug for SqlUserRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlUserRepository").finish_non_exhaustive()
    }
}

impl SqlUserRepository {
    pub fn new(executor: Arc<dyn QueryExecutor>, queries: Arc<dyn QuerySource>) -> Self {
        Self { executor, queries }
    }

    /// Create the `users` table when it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        self.run(operations::ENSURE_SCHEMA, names::CREATE_USERS_TABLE, &[], None)
            .await?;

        info!("Users table ready");
        Ok(())
    }

    /// Remove every user; returns the number of deleted rows
    pub async fn clear(&self) -> Result<u64, DomainError> {
        let outcome = self
            .run(operations::CLEAR, names::CLEAR_USERS, &[], None)
            .await?;

        info!(deleted = outcome.row_count, "Users table cleared");
        Ok(outcome.row_count)
    }

    /// Current holder of `email`, with store failures labelled as `operation`
    async fn email_owner(&self, operation: &str, email: &str) -> Result<Option<User>, DomainError> {
        self.find_by_email(email).await.map_err(|e| match e {
            DomainError::Repository { message, .. } => DomainError::repository(operation, message),
            other => other,
        })
    }

    async fn run(
        &self,
        operation: &str,
        query: &str,
        params: &[SqlValue],
        handler: Option<&ErrorHandler>,
    ) -> Result<QueryOutcome, DomainError> {
        let sql = self.queries.load_query(query).await?;

        debug!(query, params = params.len(), "Executing query");

        self.executor
            .execute(&sql, params)
            .await
            .map_err(|e| handle_db_error(operation, e, handler))
    }
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    #[instrument(skip(self, input))]
    async fn create(&self, input: &CreateUserInput) -> Result<User, DomainError> {
        validate_create_input(input)?;

        if self.email_owner(operations::CREATE, &input.email).await?.is_some() {
            return Err(DomainError::conflict(EMAIL_EXISTS));
        }

        let user = User::new(&input.name, &input.email);
        let params = [
            SqlValue::from(user.id().as_str()),
            SqlValue::from(user.name()),
            SqlValue::from(user.email()),
            SqlValue::Timestamp(user.created_at().naive_utc()),
            SqlValue::Timestamp(user.updated_at().naive_utc()),
        ];

        let outcome = self
            .run(operations::CREATE, names::CREATE_USER, &params, Some(&email_conflict))
            .await?;

        let row = outcome
            .first()
            .ok_or_else(|| DomainError::repository(operations::CREATE, "Insert returned no rows"))?;
        let created = map_row_to_user(row)?;

        info!(user_id = %created.id(), "User created");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> Result<User, DomainError> {
        validate_required(id, "User ID")?;

        let outcome = self
            .run(operations::FIND_BY_ID, names::FIND_USER_BY_ID, &[SqlValue::from(id)], None)
            .await?;

        match outcome.first() {
            Some(row) => map_row_to_user(row),
            None => Err(handle_not_found_error(operations::FIND_BY_ID, None)),
        }
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        let outcome = self
            .run(operations::FIND_ALL, names::FIND_ALL_USERS, &[], None)
            .await?;

        outcome.rows.iter().map(map_row_to_user).collect()
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: &str, input: &UpdateUserInput) -> Result<User, DomainError> {
        validate_required(id, "User ID")?;
        validate_update_input(input)?;

        if let Some(email) = &input.email {
            if let Some(owner) = self.email_owner(operations::UPDATE, email).await? {
                if owner.id().as_str() != id {
                    return Err(DomainError::conflict(EMAIL_EXISTS));
                }
            }
        }

        // NULL keeps the stored value
        let params = [
            SqlValue::from(id),
            SqlValue::from(input.name.clone()),
            SqlValue::from(input.email.clone()),
            SqlValue::Timestamp(now().naive_utc()),
        ];

        let outcome = self
            .run(operations::UPDATE, names::UPDATE_USER, &params, Some(&email_conflict))
            .await?;

        let row = outcome
            .first()
            .ok_or_else(|| handle_not_found_error(operations::UPDATE, None))?;
        let updated = map_row_to_user(row)?;

        info!(user_id = %updated.id(), "User updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        validate_required(id, "User ID")?;

        let outcome = self
            .run(operations::DELETE, names::DELETE_USER, &[SqlValue::from(id)], None)
            .await?;

        let deleted = outcome.row_count > 0;
        if deleted {
            info!(user_id = %id, "User deleted");
        }

        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        validate_required(email, "Email")?;

        let outcome = self
            .run(
                operations::FIND_BY_EMAIL,
                names::FIND_USER_BY_EMAIL,
                &[SqlValue::from(email)],
                None,
            )
            .await?;

        outcome.first().map(map_row_to_user).transpose()
    }
}
