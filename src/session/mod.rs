//! Per-user controllers that keep a local snapshot in sync with storage.
//!
//! Local state lives behind `tokio::sync::Mutex` and is never held across a
//! storage call, so overlapping requests are fine. Every request is tagged
//! with the local version it was issued from; responses older than the state
//! already applied are dropped.

pub mod board;
pub mod project;
pub mod sprint;

pub use board::{BoardUpdate, SprintBoard};
pub use project::ProjectService;
pub use sprint::SprintController;

#[cfg(all(test, feature = "file-storage"))]
pub(crate) mod test_support {
    use crate::{
        domain::{Issue, IssueId, Project, ProjectId, Sprint, SprintId, SprintStatus},
        error::{DeckError, Result},
        storage::{file_storage::FileStorage, Storage},
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tempfile::TempDir;
    use tokio::sync::{oneshot, Mutex};

    /// File-backed storage with switches for failure injection and call counting
    pub struct TestStorage {
        inner: FileStorage,
        _dir: TempDir,
        pub fail_order_writes: AtomicBool,
        pub order_writes: AtomicUsize,
        pub status_writes: AtomicUsize,
        gate: Mutex<Option<oneshot::Receiver<()>>>,
        status_answer: Mutex<Option<SprintStatus>>,
    }

    impl TestStorage {
        pub async fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let inner = FileStorage::new(dir.path());
            inner.initialize().await.unwrap();
            Self {
                inner,
                _dir: dir,
                fail_order_writes: AtomicBool::new(false),
                order_writes: AtomicUsize::new(0),
                status_writes: AtomicUsize::new(0),
                gate: Mutex::new(None),
                status_answer: Mutex::new(None),
            }
        }

        pub fn fail_orders(&self, fail: bool) {
            self.fail_order_writes.store(fail, Ordering::SeqCst);
        }

        /// Makes status updates store and return `status` whatever was requested,
        /// as when another client changed the sprint first
        pub async fn answer_status_with(&self, status: SprintStatus) {
            *self.status_answer.lock().await = Some(status);
        }

        /// Makes the next order write wait until the returned sender fires
        pub async fn hold_next_order_write(&self) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            *self.gate.lock().await = Some(rx);
            tx
        }
    }

    #[async_trait]
    impl Storage for TestStorage {
        async fn initialize(&self) -> Result<()> {
            self.inner.initialize().await
        }

        async fn is_initialized(&self) -> bool {
            self.inner.is_initialized().await
        }

        async fn save_project(&self, project: &Project) -> Result<()> {
            self.inner.save_project(project).await
        }

        async fn load_project(&self, id: &ProjectId) -> Result<Project> {
            self.inner.load_project(id).await
        }

        async fn delete_project(&self, id: &ProjectId) -> Result<()> {
            self.inner.delete_project(id).await
        }

        async fn save_sprint(&self, sprint: &Sprint) -> Result<()> {
            self.inner.save_sprint(sprint).await
        }

        async fn load_sprint(&self, id: &SprintId) -> Result<Sprint> {
            self.inner.load_sprint(id).await
        }

        async fn list_sprints(&self, project_id: &ProjectId) -> Result<Vec<Sprint>> {
            self.inner.list_sprints(project_id).await
        }

        async fn update_sprint_status(
            &self,
            id: &SprintId,
            status: SprintStatus,
        ) -> Result<Sprint> {
            self.status_writes.fetch_add(1, Ordering::SeqCst);

            let answer = *self.status_answer.lock().await;
            if let Some(answer) = answer {
                let mut sprint = self.inner.load_sprint(id).await?;
                sprint.status = answer;
                self.inner.save_sprint(&sprint).await?;
                return Ok(sprint);
            }
            self.inner.update_sprint_status(id, status).await
        }

        async fn save_issue(&self, issue: &Issue) -> Result<()> {
            self.inner.save_issue(issue).await
        }

        async fn delete_issue(&self, id: &IssueId) -> Result<()> {
            self.inner.delete_issue(id).await
        }

        async fn fetch_issues_for_sprint(&self, sprint_id: &SprintId) -> Result<Vec<Issue>> {
            self.inner.fetch_issues_for_sprint(sprint_id).await
        }

        async fn update_issue_order(&self, issues: &[Issue]) -> Result<()> {
            self.order_writes.fetch_add(1, Ordering::SeqCst);

            let gate = self.gate.lock().await.take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }

            if self.fail_order_writes.load(Ordering::SeqCst) {
                return Err(DeckError::StorageError("simulated outage".to_string()));
            }
            self.inner.update_issue_order(issues).await
        }
    }
}
