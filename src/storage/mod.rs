use crate::{
    config::{StorageBackend, StorageConfig},
    domain::{Issue, IssueId, Project, ProjectId, Sprint, SprintId, SprintStatus},
    error::{DeckError, Result},
};
use async_trait::async_trait;
use std::sync::Arc;

#[cfg(feature = "file-storage")]
pub mod file_storage;

#[cfg(feature = "sqlite-storage")]
pub mod sqlite_storage;

/// The persistence collaborator: sole source of truth for projects, sprints and issues.
///
/// Construct one instance at start-up and share it as `Arc<dyn Storage>`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()>;

    /// Checks if the storage has been initialized
    async fn is_initialized(&self) -> bool;

    /// Creates or replaces a project
    async fn save_project(&self, project: &Project) -> Result<()>;

    /// Loads a project by ID
    async fn load_project(&self, id: &ProjectId) -> Result<Project>;

    /// Deletes a project together with its sprints and issues
    async fn delete_project(&self, id: &ProjectId) -> Result<()>;

    /// Creates or replaces a sprint
    async fn save_sprint(&self, sprint: &Sprint) -> Result<()>;

    /// Loads a sprint by ID
    async fn load_sprint(&self, id: &SprintId) -> Result<Sprint>;

    /// Lists the sprints of a project, oldest start date first
    async fn list_sprints(&self, project_id: &ProjectId) -> Result<Vec<Sprint>>;

    /// Changes a sprint's status after re-checking the transition against
    /// the stored record. Returns the stored sprint.
    async fn update_sprint_status(&self, id: &SprintId, status: SprintStatus) -> Result<Sprint>;

    /// Creates or replaces an issue
    async fn save_issue(&self, issue: &Issue) -> Result<()>;

    /// Deletes an issue
    async fn delete_issue(&self, id: &IssueId) -> Result<()>;

    /// Issues of a sprint, sorted by column then order
    async fn fetch_issues_for_sprint(&self, sprint_id: &SprintId) -> Result<Vec<Issue>>;

    /// Stores `status` and `order` of every given issue in one batch
    async fn update_issue_order(&self, issues: &[Issue]) -> Result<()>;
}

/// Builds the configured backend. Call once at start-up and share the handle.
pub fn open_storage(config: &StorageConfig) -> Result<Arc<dyn Storage>> {
    match config.backend {
        #[cfg(feature = "file-storage")]
        StorageBackend::File => Ok(Arc::new(file_storage::FileStorage::new(config.location()))),
        #[cfg(feature = "sqlite-storage")]
        StorageBackend::Sqlite => Ok(Arc::new(sqlite_storage::SqliteStorage::open(
            config.location(),
        )?)),
        #[allow(unreachable_patterns)]
        backend => Err(DeckError::ConfigError(format!(
            "storage backend {:?} is not enabled in this build",
            backend
        ))),
    }
}

#[cfg(all(test, feature = "file-storage"))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_file_backend_from_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig {
            backend: StorageBackend::File,
            path: Some(temp_dir.path().to_path_buf()),
        };

        let storage = open_storage(&config).unwrap();
        assert!(!storage.is_initialized().await);
        storage.initialize().await.unwrap();
        assert!(storage.is_initialized().await);
    }
}
