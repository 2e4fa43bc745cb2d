use crate::domain::id::ProjectId;
use crate::error::DeckError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const NAME_MAX: usize = 100;
const KEY_MIN: usize = 2;
const KEY_MAX: usize = 10;
const DESCRIPTION_MAX: usize = 500;

/// A project owned by an organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Short uppercase key used to name sprints, e.g. `APP`
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub organization_id: String,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Creates a project after checking the form rules
    pub fn new(
        name: impl Into<String>,
        key: impl Into<String>,
        description: Option<String>,
        organization_id: impl Into<String>,
    ) -> Result<Self, DeckError> {
        let project = Self {
            id: ProjectId::generate(),
            name: name.into(),
            key: key.into().to_uppercase(),
            description,
            organization_id: organization_id.into(),
            created_at: Utc::now(),
        };
        project.validate()?;
        Ok(project)
    }

    pub fn validate(&self) -> Result<(), DeckError> {
        let name_len = self.name.chars().count();
        if name_len == 0 {
            return Err(DeckError::Validation("Project name is required".to_string()));
        }
        if name_len > NAME_MAX {
            return Err(DeckError::Validation(format!(
                "Project name must be less than {} characters",
                NAME_MAX
            )));
        }

        let key_len = self.key.chars().count();
        if key_len < KEY_MIN {
            return Err(DeckError::Validation("Project key is required".to_string()));
        }
        if key_len > KEY_MAX {
            return Err(DeckError::Validation(format!(
                "Project key must be less than {} characters",
                KEY_MAX
            )));
        }

        if let Some(description) = &self.description {
            if description.chars().count() > DESCRIPTION_MAX {
                return Err(DeckError::Validation(format!(
                    "Project description must be less than {} characters",
                    DESCRIPTION_MAX
                )));
            }
        }

        Ok(())
    }
}
