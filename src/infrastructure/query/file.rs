//! File-backed query source memoized with moka

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;

use crate::domain::{DomainError, QuerySource};

/// Loads `<dir>/<name>.sql`, keeping each text for the lifetime of the source
#[derive(Debug, Clone)]
pub struct FileQuerySource {
    dir: PathBuf,
    cache: Cache<String, Arc<str>>,
}

impl FileQuerySource {
    /// Unbounded: a loaded query is never evicted until `clear_cache`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: Cache::builder().build(),
        }
    }

    // Names map straight onto file names, so anything that could leave the directory is refused
    fn check_name(name: &str) -> Result<(), DomainError> {
        if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
            return Err(DomainError::configuration(format!(
                "Invalid SQL query name '{}'",
                name
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl QuerySource for FileQuerySource {
    async fn load_query(&self, name: &str) -> Result<Arc<str>, DomainError> {
        Self::check_name(name)?;

        let path = self.dir.join(format!("{}.sql", name));

        self.cache
            .try_get_with(name.to_string(), async move {
                tracing::debug!(path = %path.display(), "Loading SQL query from disk");
                tokio::fs::read_to_string(&path).await.map(Arc::<str>::from)
            })
            .await
            .map_err(|e| {
                DomainError::configuration(format!("Failed to load SQL query '{}': {}", name, e))
            })
    }

    async fn list_available(&self) -> Result<Vec<String>, DomainError> {
        let read_dir_error = |e: std::io::Error| {
            DomainError::configuration(format!(
                "Failed to read queries directory '{}': {}",
                self.dir.display(),
                e
            ))
        };

        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(read_dir_error)?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(read_dir_error)? {
            let path = entry.path();

            if path.extension().and_then(|ext| ext.to_str()) != Some("sql") {
                continue;
            }

            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    fn clear_cache(&self) {
        self.cache.invalidate_all();
    }
}
