//! PostgreSQL query executor with connection pooling

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use futures::TryStreamExt;
use serde::Serialize;
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Either, Postgres, Row, TypeInfo};

use crate::config::DatabaseConfig;
use crate::domain::{DomainError, QueryExecutor, QueryOutcome, Record, SqlValue, StoreError};
use crate::infrastructure::store::handle_db_error;

const DATABASE_INFO: &str = "Failed to read database info";

/// Server version and clock as reported by PostgreSQL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseInfo {
    pub version: String,
    pub current_time: DateTime<Utc>,
}

/// Executes statements against a PostgreSQL pool
///
/// The pool is created and closed by the owner of the executor;
/// repositories only borrow it through the `QueryExecutor` trait.
#[derive(Debug, Clone)]
pub struct PostgresExecutor {
    pool: PgPool,
}

impl PostgresExecutor {
    /// Wrap an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a pool from configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DomainError> {
        config.validate()?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| {
                DomainError::configuration(format!("Failed to connect to PostgreSQL: {}", e))
            })?;

        tracing::info!(
            max_connections = config.max_connections,
            "PostgreSQL pool connected"
        );

        Ok(Self::new(pool))
    }

    /// Check the pool can serve a trivial query
    pub async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|value| value == 1)
            .unwrap_or(false)
    }

    /// Server version string and current server time
    pub async fn database_info(&self) -> Result<DatabaseInfo, DomainError> {
        let (version, current_time) =
            sqlx::query_as::<_, (String, DateTime<Utc>)>("SELECT version(), NOW()")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| handle_db_error(DATABASE_INFO, store_error(e), None))?;

        Ok(DatabaseInfo {
            version,
            current_time,
        })
    }

    /// Close every connection; later calls fail with `Unavailable`
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("PostgreSQL pool closed");
    }
}

#[async_trait]
impl QueryExecutor for PostgresExecutor {
    // fetch_many is the one call that yields both returned rows and the command tag
    #[allow(deprecated)]
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<QueryOutcome, StoreError> {
        let query = params.iter().fold(sqlx::query(sql), bind_param);
        let mut stream = query.fetch_many(&self.pool);
        let mut outcome = QueryOutcome::default();

        while let Some(step) = stream.try_next().await.map_err(store_error)? {
            match step {
                Either::Left(done) => outcome.row_count += done.rows_affected(),
                Either::Right(row) => outcome.rows.push(decode_row(&row)?),
            }
        }

        Ok(outcome)
    }
}

fn bind_param<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &SqlValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Bool(v) => query.bind(*v),
        SqlValue::Int(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.clone()),
        SqlValue::Timestamp(v) => query.bind(*v),
        SqlValue::TimestampTz(v) => query.bind(*v),
    }
}

fn decode_row(row: &PgRow) -> Result<Record, StoreError> {
    let mut record = Record::new();

    for column in row.columns() {
        let index = column.ordinal();

        let value = match column.type_info().name() {
            "BOOL" => row.try_get::<Option<bool>, _>(index).map(SqlValue::from),
            "INT2" => row
                .try_get::<Option<i16>, _>(index)
                .map(|v| SqlValue::from(v.map(i64::from))),
            "INT4" => row
                .try_get::<Option<i32>, _>(index)
                .map(|v| SqlValue::from(v.map(i64::from))),
            "INT8" => row.try_get::<Option<i64>, _>(index).map(SqlValue::from),
            "TIMESTAMP" => row
                .try_get::<Option<NaiveDateTime>, _>(index)
                .map(SqlValue::from),
            "TIMESTAMPTZ" => row
                .try_get::<Option<DateTime<Utc>>, _>(index)
                .map(SqlValue::from),
            _ => row.try_get::<Option<String>, _>(index).map(SqlValue::from),
        }
        .map_err(store_error)?;

        record.insert(column.name(), value);
    }

    Ok(record)
}

fn store_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::RowNotFound => StoreError::not_found(err.to_string()),
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            let error = StoreError::unique_violation(db.message());

            match db.constraint() {
                Some(constraint) => error.with_constraint(constraint),
                None => error,
            }
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::unavailable(err.to_string())
        }
        _ => StoreError::other(err.to_string()),
    }
}
