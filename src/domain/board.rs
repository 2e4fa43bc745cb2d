use crate::domain::issue::{Issue, IssueStatus};
use crate::domain::sprint::SprintStatus;
use crate::error::{DeckError, Guard};
use serde::{Deserialize, Serialize};

/// Configuration for a kanban board column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub status: IssueStatus,
}

impl Column {
    pub fn new(name: impl Into<String>, status: IssueStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }
}

/// Board configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: "Sprint Board".to_string(),
            columns: IssueStatus::ALL
                .into_iter()
                .map(|status| Column::new(status.to_string(), status))
                .collect(),
        }
    }
}

/// Issues of one column in render order
#[derive(Debug, Clone)]
pub struct ColumnView {
    pub column: Column,
    pub issues: Vec<Issue>,
}

impl BoardConfig {
    /// Gets the column configuration for a status
    pub fn column_for_status(&self, status: IssueStatus) -> Option<&Column> {
        self.columns.iter().find(|col| col.status == status)
    }

    /// The intake column; new issues may only be created here
    pub fn intake_column(&self) -> Option<&Column> {
        self.columns.first()
    }

    /// Checks that an issue may be created in `status` while the sprint has `sprint_status`
    pub fn check_issue_creation(
        &self,
        status: IssueStatus,
        sprint_status: SprintStatus,
    ) -> Result<(), DeckError> {
        let is_intake = self
            .intake_column()
            .map(|col| col.status == status)
            .unwrap_or(false);

        if !is_intake || sprint_status == SprintStatus::Completed {
            return Err(Guard::IssueCreationClosed.into());
        }
        Ok(())
    }

    /// Groups issues per configured column, each sorted by order
    pub fn group(&self, issues: &[Issue]) -> Vec<ColumnView> {
        self.columns
            .iter()
            .map(|column| {
                let mut column_issues: Vec<Issue> = issues
                    .iter()
                    .filter(|issue| issue.status == column.status)
                    .cloned()
                    .collect();
                column_issues.sort_by_key(|issue| issue.order);
                ColumnView {
                    column: column.clone(),
                    issues: column_issues,
                }
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), DeckError> {
        if self.columns.is_empty() {
            return Err(DeckError::ConfigError(
                "Board needs at least one column".to_string(),
            ));
        }
        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.status == column.status) {
                return Err(DeckError::ConfigError(format!(
                    "Column status {} is configured twice",
                    column.status.key()
                )));
            }
        }
        Ok(())
    }
}

/// Order value for an issue appended to the end of `status`.
///
/// Deletes leave gaps, so this is one past the highest order rather than the count.
pub fn next_order(issues: &[Issue], status: IssueStatus) -> u32 {
    issues
        .iter()
        .filter(|issue| issue.status == status)
        .map(|issue| issue.order.saturating_add(1))
        .max()
        .unwrap_or(0)
}
