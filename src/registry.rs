//! Wiring of the configured repository and the resources behind it

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::config::{AppConfig, QueriesConfig, StorageBackend};
use crate::domain::{DomainError, QuerySource, UserRepository};
use crate::infrastructure::query::{EmbeddedQuerySource, FileQuerySource};
use crate::infrastructure::store::{DatabaseInfo, PostgresExecutor};
use crate::infrastructure::user::{InMemoryUserRepository, SqlUserRepository};

/// The user repository selected by configuration
///
/// Owns the PostgreSQL pool when the postgres backend is active; callers
/// close it through [`UserRegistry::close`].
#[derive(Clone)]
pub struct UserRegistry {
    repository: Arc<dyn UserRepository>,
    queries: Arc<dyn QuerySource>,
    postgres: Option<Postgres>,
}

#[derive(Debug, Clone)]
struct Postgres {
    executor: PostgresExecutor,
    repository: SqlUserRepository,
}

impl fmt::Debug for UserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRegistry")
            .field("backend", &self.backend())
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}

impl UserRegistry {
    /// Registry over an in-memory repository
    pub fn in_memory(repository: InMemoryUserRepository, queries: Arc<dyn QuerySource>) -> Self {
        Self {
            repository: Arc::new(repository),
            queries,
            postgres: None,
        }
    }

    /// Registry over an already connected PostgreSQL executor
    pub fn postgres(executor: PostgresExecutor, queries: Arc<dyn QuerySource>) -> Self {
        let repository = SqlUserRepository::new(Arc::new(executor.clone()), queries.clone());

        Self {
            repository: Arc::new(repository.clone()),
            queries,
            postgres: Some(Postgres {
                executor,
                repository,
            }),
        }
    }

    pub fn repository(&self) -> Arc<dyn UserRepository> {
        self.repository.clone()
    }

    pub fn queries(&self) -> Arc<dyn QuerySource> {
        self.queries.clone()
    }

    pub fn backend(&self) -> StorageBackend {
        if self.postgres.is_some() {
            StorageBackend::Postgres
        } else {
            StorageBackend::Memory
        }
    }

    /// Create the users table; only meaningful for the postgres backend
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        match &self.postgres {
            Some(postgres) => postgres.repository.ensure_schema().await,
            None => Err(DomainError::configuration(
                "init-schema requires the postgres storage backend",
            )),
        }
    }

    /// Server version and time of the backing database
    pub async fn database_info(&self) -> Result<DatabaseInfo, DomainError> {
        match &self.postgres {
            Some(postgres) => postgres.executor.database_info().await,
            None => Err(DomainError::configuration(
                "db-info requires the postgres storage backend",
            )),
        }
    }

    /// Release the connection pool, if any
    pub async fn close(&self) {
        if let Some(postgres) = &self.postgres {
            postgres.executor.close().await;
        }
    }
}

/// Query source for the configured directory, or the bundled queries
pub fn build_query_source(config: &QueriesConfig) -> Arc<dyn QuerySource> {
    match &config.dir {
        Some(dir) => {
            info!(dir = %dir.display(), "Loading SQL queries from directory");
            Arc::new(FileQuerySource::new(dir))
        }
        None => Arc::new(EmbeddedQuerySource::new()),
    }
}

/// Build the repository selected by `config.storage`
pub async fn create_user_registry(config: &AppConfig) -> Result<UserRegistry, DomainError> {
    let queries = build_query_source(&config.queries);

    info!("Storage backend: {:?}", config.storage);

    match config.storage {
        StorageBackend::Memory => Ok(UserRegistry::in_memory(
            InMemoryUserRepository::new(),
            queries,
        )),
        StorageBackend::Postgres => {
            let executor = PostgresExecutor::connect(&config.database).await?;
            Ok(UserRegistry::postgres(executor, queries))
        }
    }
}
