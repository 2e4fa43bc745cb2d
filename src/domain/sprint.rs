use crate::domain::distance::format_distance_to_now;
use crate::domain::id::{ProjectId, SprintId};
use crate::error::{DeckError, Guard};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Lifecycle status of a sprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SprintStatus {
    Planned,
    Active,
    Completed,
}

impl fmt::Display for SprintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planned => write!(f, "PLANNED"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

impl FromStr for SprintStatus {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PLANNED" => Ok(Self::Planned),
            "ACTIVE" => Ok(Self::Active),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(DeckError::Validation(format!("Unknown sprint status '{}'", s))),
        }
    }
}

impl SprintStatus {
    /// Checks if a status transition is part of the lifecycle chain
    pub fn can_transition_to(&self, target: &SprintStatus) -> bool {
        matches!(
            (self, target),
            (Self::Planned, Self::Active) | (Self::Active, Self::Completed)
        )
    }

    /// Checks whether issues on a board with this sprint status may be moved
    pub fn check_board_editable(&self) -> Result<(), DeckError> {
        match self {
            Self::Planned => Err(Guard::BoardNotStarted.into()),
            Self::Completed => Err(Guard::BoardFrozen.into()),
            Self::Active => Ok(()),
        }
    }
}

/// A time-boxed container of issues
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: SprintId,
    pub project_id: ProjectId,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: SprintStatus,
}

impl Sprint {
    /// Creates a planned sprint, validating the name and date range
    pub fn new(
        project_id: ProjectId,
        name: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<Self, DeckError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DeckError::Validation("Sprint name is required".to_string()));
        }
        if start_date > end_date {
            return Err(DeckError::InvalidDateRange {
                start: start_date.to_rfc3339(),
                end: end_date.to_rfc3339(),
            });
        }

        Ok(Self {
            id: SprintId::generate(),
            project_id,
            name,
            start_date,
            end_date,
            status: SprintStatus::Planned,
        })
    }

    /// Name for the next sprint of a project, e.g. `APP-3`
    pub fn generated_name(project_key: &str, existing_sprints: usize) -> String {
        format!("{}-{}", project_key, existing_sprints + 1)
    }

    /// True while `now` lies strictly inside the sprint's dates
    pub fn is_within_window(&self, now: DateTime<Utc>) -> bool {
        self.start_date < now && now < self.end_date
    }

    /// Validates a requested status change at `now`.
    ///
    /// Every status change goes through here before reaching storage.
    pub fn check_transition(
        &self,
        target: SprintStatus,
        now: DateTime<Utc>,
    ) -> Result<(), DeckError> {
        if !self.status.can_transition_to(&target) {
            return Err(Guard::InvalidTransition {
                from: self.status.to_string(),
                to: target.to_string(),
            }
            .into());
        }

        if target == SprintStatus::Active && !self.is_within_window(now) {
            return Err(Guard::OutsideSprintWindow.into());
        }

        Ok(())
    }

    /// Whether the "start sprint" action is available at `now`
    pub fn can_start(&self, now: DateTime<Utc>) -> bool {
        self.check_transition(SprintStatus::Active, now).is_ok()
    }

    /// Whether the "end sprint" action is available
    pub fn can_end(&self) -> bool {
        self.status.can_transition_to(&SprintStatus::Completed)
    }

    /// Badge text describing the sprint's timing at `now`
    pub fn status_text(&self, now: DateTime<Utc>) -> Option<String> {
        match self.status {
            SprintStatus::Completed => Some("Sprint Ended".to_string()),
            SprintStatus::Active if now > self.end_date => Some(format!(
                "Overdue by {}",
                format_distance_to_now(self.end_date, now)
            )),
            SprintStatus::Planned if now < self.start_date => Some(format!(
                "Starts in {}",
                format_distance_to_now(self.start_date, now)
            )),
            _ => None,
        }
    }
}

/// Picks the sprint shown first: the active one, else the first listed
pub fn default_sprint(sprints: &[Sprint]) -> Option<&Sprint> {
    sprints
        .iter()
        .find(|sprint| sprint.status == SprintStatus::Active)
        .or_else(|| sprints.first())
}
