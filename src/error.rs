use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DeckError>;

/// Why a guarded operation was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// Board edits before the sprint has started
    BoardNotStarted,
    /// Board edits after the sprint has ended
    BoardFrozen,
    /// Sprint status change outside the PLANNED -> ACTIVE -> COMPLETED chain
    InvalidTransition { from: String, to: String },
    /// Sprint start requested outside its date window
    OutsideSprintWindow,
    /// Issues can only be created in the first column of an open sprint
    IssueCreationClosed,
    /// Destructive action attempted without the admin role
    AdminRequired,
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoardNotStarted => write!(f, "Start the sprint to update board"),
            Self::BoardFrozen => write!(f, "Cannot update board after sprint end"),
            Self::InvalidTransition { from, to } => {
                write!(f, "Invalid sprint status transition from {} to {}", from, to)
            }
            Self::OutsideSprintWindow => {
                write!(f, "Sprint can only be started between its start and end dates")
            }
            Self::IssueCreationClosed => write!(f, "Issues cannot be created here"),
            Self::AdminRequired => write!(f, "Only organization admins can do this"),
        }
    }
}

/// Coarse classification used by callers to decide how to surface an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Non-fatal warning, nothing was mutated
    GuardRejected,
    /// The store failed; local state may need reconciling
    PersistenceFailure,
    /// Identifier absent; treated as a no-op
    NotFound,
    /// Bad input or configuration
    Invalid,
}

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("{0}")]
    GuardRejected(Guard),

    #[error("Issue not found: {0}")]
    IssueNotFound(String),

    #[error("Sprint not found: {0}")]
    SprintNotFound(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[cfg(feature = "sqlite-storage")]
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Configuration parse error: {0}")]
    ConfigParseError(#[from] toml::de::Error),
}

impl DeckError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::GuardRejected(_) => ErrorKind::GuardRejected,
            Self::IssueNotFound(_) | Self::SprintNotFound(_) | Self::ProjectNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::InvalidDateRange { .. }
            | Self::Validation(_)
            | Self::ConfigError(_)
            | Self::ConfigParseError(_) => ErrorKind::Invalid,
            Self::StorageError(_)
            | Self::IoError(_)
            | Self::SerializationError(_) => ErrorKind::PersistenceFailure,
            #[cfg(feature = "sqlite-storage")]
            Self::SqliteError(_) => ErrorKind::PersistenceFailure,
        }
    }

    pub fn is_guard_rejected(&self) -> bool {
        self.kind() == ErrorKind::GuardRejected
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<Guard> for DeckError {
    fn from(guard: Guard) -> Self {
        Self::GuardRejected(guard)
    }
}
