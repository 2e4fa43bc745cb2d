use crate::domain::id::{IssueId, ProjectId, SprintId};
use crate::error::DeckError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Column key of an issue on the kanban board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    Todo,
    InProgress,
    InReview,
    Done,
}

impl IssueStatus {
    pub const ALL: [IssueStatus; 4] = [
        IssueStatus::Todo,
        IssueStatus::InProgress,
        IssueStatus::InReview,
        IssueStatus::Done,
    ];

    /// The stored key, e.g. `IN_PROGRESS`
    pub fn key(&self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::InReview => "IN_REVIEW",
            Self::Done => "DONE",
        }
    }

    /// Position in the workflow, left to right
    pub fn rank(&self) -> u8 {
        match self {
            Self::Todo => 0,
            Self::InProgress => 1,
            Self::InReview => 2,
            Self::Done => 3,
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Todo => write!(f, "Todo"),
            Self::InProgress => write!(f, "In Progress"),
            Self::InReview => write!(f, "In Review"),
            Self::Done => write!(f, "Done"),
        }
    }
}

impl FromStr for IssueStatus {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| DeckError::Validation(format!("Unknown issue status '{}'", s)))
    }
}

/// Priority of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssuePriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl fmt::Display for IssuePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Urgent => write!(f, "URGENT"),
        }
    }
}

impl FromStr for IssuePriority {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            "URGENT" => Ok(Self::Urgent),
            _ => Err(DeckError::Validation(format!(
                "Unknown priority '{}'. Valid priorities: LOW, MEDIUM, HIGH, URGENT",
                s
            ))),
        }
    }
}

/// Input for creating an issue; order and id are assigned by the board
#[derive(Debug, Clone)]
pub struct IssueDraft {
    pub title: String,
    pub description: Option<String>,
    pub status: IssueStatus,
    pub priority: IssuePriority,
    pub assignee_id: Option<String>,
    pub reporter_id: Option<String>,
}

impl IssueDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: IssueStatus::Todo,
            priority: IssuePriority::Medium,
            assignee_id: None,
            reporter_id: None,
        }
    }

    pub fn with_priority(mut self, priority: IssuePriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_assignee(mut self, assignee_id: impl Into<String>) -> Self {
        self.assignee_id = Some(assignee_id.into());
        self
    }

    /// Checks the issue form rules
    pub fn validate(&self) -> Result<(), DeckError> {
        if self.title.trim().is_empty() {
            return Err(DeckError::Validation("Title is required".to_string()));
        }
        Ok(())
    }
}

/// An issue placed on a sprint board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: IssueStatus,
    pub priority: IssuePriority,
    pub order: u32,
    pub sprint_id: SprintId,
    pub project_id: ProjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    /// Creates a TODO issue with medium priority at the given position
    pub fn new(
        title: impl Into<String>,
        sprint_id: SprintId,
        project_id: ProjectId,
        order: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: IssueId::generate(),
            title: title.into(),
            description: None,
            status: IssueStatus::Todo,
            priority: IssuePriority::Medium,
            order,
            sprint_id,
            project_id,
            assignee_id: None,
            reporter_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builds an issue from a validated draft
    pub fn from_draft(
        draft: IssueDraft,
        sprint_id: SprintId,
        project_id: ProjectId,
        order: u32,
    ) -> Result<Self, DeckError> {
        draft.validate()?;
        let mut issue = Self::new(draft.title, sprint_id, project_id, order);
        issue.description = draft.description;
        issue.status = draft.status;
        issue.priority = draft.priority;
        issue.assignee_id = draft.assignee_id;
        issue.reporter_id = draft.reporter_id;
        Ok(issue)
    }

    pub fn with_status(mut self, status: IssueStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the title
    pub fn set_title(&mut self, title: String) -> Result<(), DeckError> {
        if title.trim().is_empty() {
            return Err(DeckError::Validation("Title is required".to_string()));
        }
        self.title = title;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Sets the description
    pub fn set_description(&mut self, description: String) {
        self.description = Some(description);
        self.updated_at = Utc::now();
    }

    pub fn set_priority(&mut self, priority: IssuePriority) {
        self.priority = priority;
        self.updated_at = Utc::now();
    }

    pub fn assign_to(&mut self, assignee_id: Option<String>) {
        self.assignee_id = assignee_id;
        self.updated_at = Utc::now();
    }
}
