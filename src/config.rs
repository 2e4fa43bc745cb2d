use crate::domain::BoardConfig;
use crate::error::{DeckError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Top-level configuration, read from `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub sprint: SprintConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Sqlite,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Project root for the file backend, database file for SQLite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl StorageConfig {
    /// The configured path, or the backend's default location
    pub fn location(&self) -> PathBuf {
        match (&self.path, self.backend) {
            (Some(path), _) => path.clone(),
            (None, StorageBackend::File) => PathBuf::from("."),
            (None, StorageBackend::Sqlite) => PathBuf::from(".sprintdeck/deck.db"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintConfig {
    /// Length used when a sprint is created without an end date
    #[serde(default = "default_sprint_length_days")]
    pub default_length_days: u32,
}

impl Default for SprintConfig {
    fn default() -> Self {
        Self {
            default_length_days: default_sprint_length_days(),
        }
    }
}

impl SprintConfig {
    pub fn default_end(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        start + Duration::days(i64::from(self.default_length_days))
    }
}

fn default_sprint_length_days() -> u32 {
    14
}

impl DeckConfig {
    /// Reads the configuration at `path`; a missing file yields the defaults
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| DeckError::ConfigError(e.to_string()))?;
        fs::write(path, content).await?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.board.validate()?;
        if self.sprint.default_length_days == 0 {
            return Err(DeckError::ConfigError(
                "sprint.default_length_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IssueStatus;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = DeckConfig::parse("").unwrap();
        assert_eq!(config, DeckConfig::default());
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.sprint.default_length_days, 14);
    }

    #[test]
    fn test_parse_custom_board() {
        let config = DeckConfig::parse(
            r#"
[storage]
backend = "sqlite"
path = "deck.db"

[board]
name = "Team Board"

[[board.columns]]
name = "Backlog"
status = "TODO"

[[board.columns]]
name = "Shipped"
status = "DONE"

[sprint]
default_length_days = 7
"#,
        )
        .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.storage.location(), PathBuf::from("deck.db"));
        assert_eq!(config.board.columns.len(), 2);
        assert_eq!(config.board.columns[1].status, IssueStatus::Done);

        let start = Utc::now();
        assert_eq!(config.sprint.default_end(start), start + Duration::days(7));
    }

    #[test]
    fn test_storage_location_defaults_per_backend() {
        let config = DeckConfig::parse("[storage]\nbackend = \"sqlite\"\n").unwrap();
        assert_eq!(config.storage.path, None);
        assert_eq!(config.storage.location(), PathBuf::from(".sprintdeck/deck.db"));
        assert_eq!(StorageConfig::default().location(), PathBuf::from("."));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = DeckConfig::parse("[storage]\nbackend = \"postgres\"\n").unwrap_err();
        assert!(matches!(err, DeckError::ConfigParseError(_)));

        let err = DeckConfig::parse("[sprint]\ndefault_length_days = 0\n").unwrap_err();
        assert!(matches!(err, DeckError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        assert_eq!(DeckConfig::load(&path).await.unwrap(), DeckConfig::default());

        let mut config = DeckConfig::default();
        config.sprint.default_length_days = 10;
        config.save(&path).await.unwrap();

        assert_eq!(DeckConfig::load(&path).await.unwrap(), config);
    }
}
