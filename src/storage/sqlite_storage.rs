use crate::{
    domain::{
        sorting::sort_for_board, Issue, IssueId, Project, ProjectId, Sprint, SprintId,
        SprintStatus,
    },
    error::{DeckError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    data TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS sprints (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    data TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS sprints_project ON sprints(project_id);
CREATE TABLE IF NOT EXISTS issues (
    id TEXT PRIMARY KEY,
    project_id TEXT NOT NULL,
    sprint_id TEXT NOT NULL,
    data TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS issues_sprint ON issues(sprint_id);
CREATE INDEX IF NOT EXISTS issues_project ON issues(project_id);
";

/// SQLite-based storage backend; records are stored as JSON next to their lookup keys
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        })
    }

    fn read_data(conn: &Connection, sql: &str, id: &str) -> Result<Option<String>> {
        Ok(conn
            .query_row(sql, params![id], |row| row.get::<_, String>(0))
            .optional()?)
    }

    fn read_all_data(conn: &Connection, sql: &str, key: &str) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params![key], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn write_sprint(conn: &Connection, sprint: &Sprint) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO sprints (id, project_id, data) VALUES (?1, ?2, ?3)",
            params![
                sprint.id.as_str(),
                sprint.project_id.as_str(),
                serde_json::to_string(sprint)?
            ],
        )?;
        Ok(())
    }

    fn write_issue(conn: &Connection, issue: &Issue) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO issues (id, project_id, sprint_id, data) VALUES (?1, ?2, ?3, ?4)",
            params![
                issue.id.as_str(),
                issue.project_id.as_str(),
                issue.sprint_id.as_str(),
                serde_json::to_string(issue)?
            ],
        )?;
        Ok(())
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn initialize(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch(SCHEMA)?;
        info!("sqlite storage initialized");
        Ok(())
    }

    async fn is_initialized(&self) -> bool {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('projects', 'sprints', 'issues')",
            [],
            |row| row.get::<_, i64>(0),
        )
        .map(|count| count == 3)
        .unwrap_or(false)
    }

    async fn save_project(&self, project: &Project) -> Result<()> {
        project.validate()?;
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO projects (id, data) VALUES (?1, ?2)",
            params![project.id.as_str(), serde_json::to_string(project)?],
        )?;
        Ok(())
    }

    async fn load_project(&self, id: &ProjectId) -> Result<Project> {
        let conn = self.conn.lock().await;
        let data = Self::read_data(&conn, "SELECT data FROM projects WHERE id = ?1", id.as_str())?
            .ok_or_else(|| DeckError::ProjectNotFound(id.to_string()))?;
        Ok(serde_json::from_str(&data)?)
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let removed = tx.execute("DELETE FROM projects WHERE id = ?1", params![id.as_str()])?;
        if removed == 0 {
            return Err(DeckError::ProjectNotFound(id.to_string()));
        }
        tx.execute("DELETE FROM sprints WHERE project_id = ?1", params![id.as_str()])?;
        tx.execute("DELETE FROM issues WHERE project_id = ?1", params![id.as_str()])?;
        tx.commit()?;

        info!(project = %id, "project deleted");
        Ok(())
    }

    async fn save_sprint(&self, sprint: &Sprint) -> Result<()> {
        let conn = self.conn.lock().await;
        Self::write_sprint(&conn, sprint)
    }

    async fn load_sprint(&self, id: &SprintId) -> Result<Sprint> {
        let conn = self.conn.lock().await;
        let data = Self::read_data(&conn, "SELECT data FROM sprints WHERE id = ?1", id.as_str())?
            .ok_or_else(|| DeckError::SprintNotFound(id.to_string()))?;
        Ok(serde_json::from_str(&data)?)
    }

    async fn list_sprints(&self, project_id: &ProjectId) -> Result<Vec<Sprint>> {
        let conn = self.conn.lock().await;
        let mut sprints = Self::read_all_data(
            &conn,
            "SELECT data FROM sprints WHERE project_id = ?1",
            project_id.as_str(),
        )?
        .iter()
        .map(|data| serde_json::from_str::<Sprint>(data))
        .collect::<std::result::Result<Vec<_>, _>>()?;

        sprints.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
        Ok(sprints)
    }

    async fn update_sprint_status(&self, id: &SprintId, status: SprintStatus) -> Result<Sprint> {
        let conn = self.conn.lock().await;
        let data = Self::read_data(&conn, "SELECT data FROM sprints WHERE id = ?1", id.as_str())?
            .ok_or_else(|| DeckError::SprintNotFound(id.to_string()))?;
        let mut sprint: Sprint = serde_json::from_str(&data)?;

        sprint.check_transition(status, Utc::now())?;
        sprint.status = status;
        Self::write_sprint(&conn, &sprint)?;

        info!(sprint = %id, status = %status, "sprint status updated");
        Ok(sprint)
    }

    async fn save_issue(&self, issue: &Issue) -> Result<()> {
        let conn = self.conn.lock().await;
        Self::write_issue(&conn, issue)
    }

    async fn delete_issue(&self, id: &IssueId) -> Result<()> {
        let conn = self.conn.lock().await;
        let removed = conn.execute("DELETE FROM issues WHERE id = ?1", params![id.as_str()])?;
        if removed == 0 {
            return Err(DeckError::IssueNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn fetch_issues_for_sprint(&self, sprint_id: &SprintId) -> Result<Vec<Issue>> {
        let conn = self.conn.lock().await;
        let mut issues = Self::read_all_data(
            &conn,
            "SELECT data FROM issues WHERE sprint_id = ?1",
            sprint_id.as_str(),
        )?
        .iter()
        .map(|data| serde_json::from_str::<Issue>(data))
        .collect::<std::result::Result<Vec<_>, _>>()?;

        sort_for_board(&mut issues);
        Ok(issues)
    }

    async fn update_issue_order(&self, issues: &[Issue]) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let now = Utc::now();

        for incoming in issues {
            let data = Self::read_data(
                &tx,
                "SELECT data FROM issues WHERE id = ?1",
                incoming.id.as_str(),
            )?
            .ok_or_else(|| DeckError::IssueNotFound(incoming.id.to_string()))?;
            let mut current: Issue = serde_json::from_str(&data)?;

            if current.status == incoming.status && current.order == incoming.order {
                continue;
            }
            current.status = incoming.status;
            current.order = incoming.order;
            current.updated_at = now;
            Self::write_issue(&tx, &current)?;
        }

        tx.commit()?;
        debug!(count = issues.len(), "issue order stored");
        Ok(())
    }
}
