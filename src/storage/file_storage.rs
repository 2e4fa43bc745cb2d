use crate::{
    config::DeckConfig,
    domain::{
        sorting::sort_for_board, Issue, IssueId, Project, ProjectId, Sprint, SprintId,
        SprintStatus,
    },
    error::{DeckError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// File-based storage: one JSON document per record
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const DECK_DIR: &'static str = ".sprintdeck";
    const PROJECTS_DIR: &'static str = "projects";
    const SPRINTS_DIR: &'static str = "sprints";
    const ISSUES_DIR: &'static str = "issues";
    const CONFIG_FILE: &'static str = "config.toml";

    /// Creates a new FileStorage instance for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::DECK_DIR),
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn config_file(&self) -> PathBuf {
        self.root_path.join(Self::CONFIG_FILE)
    }

    /// Loads `config.toml` from the storage root, falling back to defaults
    pub async fn load_config(&self) -> Result<DeckConfig> {
        DeckConfig::load(&self.config_file()).await
    }

    fn projects_dir(&self) -> PathBuf {
        self.root_path.join(Self::PROJECTS_DIR)
    }

    fn sprints_dir(&self) -> PathBuf {
        self.root_path.join(Self::SPRINTS_DIR)
    }

    fn issues_dir(&self) -> PathBuf {
        self.root_path.join(Self::ISSUES_DIR)
    }

    fn record_file(dir: PathBuf, id: &str) -> PathBuf {
        dir.join(format!("{}.json", id))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }

    async fn write_record<T: Serialize>(&self, dir: PathBuf, id: &str, record: &T) -> Result<()> {
        self.ensure_directory_exists(&dir).await?;

        let json = serde_json::to_string_pretty(record)?;
        let file_path = Self::record_file(dir, id);
        let tmp_path = file_path.with_extension("json.tmp");

        // Rename so readers never see a half-written record
        fs::write(&tmp_path, json).await?;
        fs::rename(&tmp_path, &file_path).await?;
        Ok(())
    }

    async fn read_record<T: DeserializeOwned>(&self, dir: PathBuf, id: &str) -> Result<Option<T>> {
        let file_path = Self::record_file(dir, id);
        if !file_path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&file_path).await?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    async fn read_all<T: DeserializeOwned>(&self, dir: PathBuf) -> Result<Vec<T>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&dir).await?;
        let mut records = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                let contents = fs::read_to_string(&path).await?;
                records.push(serde_json::from_str(&contents)?);
            }
        }

        Ok(records)
    }

    async fn remove_record(&self, dir: PathBuf, id: &str) -> Result<bool> {
        let file_path = Self::record_file(dir, id);
        if !file_path.exists() {
            return Ok(false);
        }
        fs::remove_file(file_path).await?;
        Ok(true)
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;
        self.ensure_directory_exists(&self.projects_dir()).await?;
        self.ensure_directory_exists(&self.sprints_dir()).await?;
        self.ensure_directory_exists(&self.issues_dir()).await?;

        if !self.config_file().exists() {
            DeckConfig::default().save(&self.config_file()).await?;
        }

        let gitignore_path = self.root_path.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(gitignore_path, "# Local caches\n*.db\n*.db-*\n*.tmp\n").await?;
        }

        info!(root = %self.root_path.display(), "file storage initialized");
        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.issues_dir().exists() && self.sprints_dir().exists()
    }

    async fn save_project(&self, project: &Project) -> Result<()> {
        project.validate()?;
        self.write_record(self.projects_dir(), project.id.as_str(), project)
            .await
    }

    async fn load_project(&self, id: &ProjectId) -> Result<Project> {
        self.read_record(self.projects_dir(), id.as_str())
            .await?
            .ok_or_else(|| DeckError::ProjectNotFound(id.to_string()))
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<()> {
        if !self.remove_record(self.projects_dir(), id.as_str()).await? {
            return Err(DeckError::ProjectNotFound(id.to_string()));
        }

        let sprints: Vec<Sprint> = self.read_all(self.sprints_dir()).await?;
        for sprint in sprints.iter().filter(|s| &s.project_id == id) {
            self.remove_record(self.sprints_dir(), sprint.id.as_str()).await?;
        }

        let issues: Vec<Issue> = self.read_all(self.issues_dir()).await?;
        for issue in issues.iter().filter(|i| &i.project_id == id) {
            self.remove_record(self.issues_dir(), issue.id.as_str()).await?;
        }

        info!(project = %id, "project deleted");
        Ok(())
    }

    async fn save_sprint(&self, sprint: &Sprint) -> Result<()> {
        self.write_record(self.sprints_dir(), sprint.id.as_str(), sprint)
            .await
    }

    async fn load_sprint(&self, id: &SprintId) -> Result<Sprint> {
        self.read_record(self.sprints_dir(), id.as_str())
            .await?
            .ok_or_else(|| DeckError::SprintNotFound(id.to_string()))
    }

    async fn list_sprints(&self, project_id: &ProjectId) -> Result<Vec<Sprint>> {
        let mut sprints: Vec<Sprint> = self
            .read_all::<Sprint>(self.sprints_dir())
            .await?
            .into_iter()
            .filter(|sprint| &sprint.project_id == project_id)
            .collect();

        sprints.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
        Ok(sprints)
    }

    async fn update_sprint_status(&self, id: &SprintId, status: SprintStatus) -> Result<Sprint> {
        let mut sprint = self.load_sprint(id).await?;
        sprint.check_transition(status, Utc::now())?;

        sprint.status = status;
        self.save_sprint(&sprint).await?;

        info!(sprint = %id, status = %status, "sprint status updated");
        Ok(sprint)
    }

    async fn save_issue(&self, issue: &Issue) -> Result<()> {
        self.write_record(self.issues_dir(), issue.id.as_str(), issue)
            .await
    }

    async fn delete_issue(&self, id: &IssueId) -> Result<()> {
        if !self.remove_record(self.issues_dir(), id.as_str()).await? {
            return Err(DeckError::IssueNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn fetch_issues_for_sprint(&self, sprint_id: &SprintId) -> Result<Vec<Issue>> {
        let mut issues: Vec<Issue> = self
            .read_all::<Issue>(self.issues_dir())
            .await?
            .into_iter()
            .filter(|issue| &issue.sprint_id == sprint_id)
            .collect();

        sort_for_board(&mut issues);
        Ok(issues)
    }

    async fn update_issue_order(&self, issues: &[Issue]) -> Result<()> {
        // Load everything first so an unknown id leaves the store untouched
        let mut stored = Vec::with_capacity(issues.len());
        for issue in issues {
            let current: Issue = self
                .read_record(self.issues_dir(), issue.id.as_str())
                .await?
                .ok_or_else(|| DeckError::IssueNotFound(issue.id.to_string()))?;
            stored.push((current, issue));
        }

        let now = Utc::now();
        for (mut current, incoming) in stored {
            if current.status == incoming.status && current.order == incoming.order {
                continue;
            }
            current.status = incoming.status;
            current.order = incoming.order;
            current.updated_at = now;
            self.write_record(self.issues_dir(), current.id.as_str(), &current)
                .await?;
        }

        debug!(count = issues.len(), "issue order stored");
        Ok(())
    }
}
