use crate::{
    config::SprintConfig,
    domain::{MembershipProvider, Project, ProjectId, Sprint},
    error::{Guard, Result},
    storage::Storage,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Project-level actions: creating projects and sprints, deleting projects
pub struct ProjectService {
    storage: Arc<dyn Storage>,
    membership: Arc<dyn MembershipProvider>,
    sprint_config: SprintConfig,
}

impl ProjectService {
    pub fn new(
        storage: Arc<dyn Storage>,
        membership: Arc<dyn MembershipProvider>,
        sprint_config: SprintConfig,
    ) -> Self {
        Self {
            storage,
            membership,
            sprint_config,
        }
    }

    pub async fn create_project(
        &self,
        name: &str,
        key: &str,
        description: Option<String>,
        organization_id: &str,
    ) -> Result<Project> {
        let project = Project::new(name, key, description, organization_id)?;
        self.storage.save_project(&project).await?;
        info!(project = %project.id, key = %project.key, "project created");
        Ok(project)
    }

    /// Creates the project's next sprint, named `<KEY>-<n>`.
    ///
    /// Without an end date the configured default length is used.
    pub async fn create_sprint(
        &self,
        project_id: &ProjectId,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Sprint> {
        let project = self.storage.load_project(project_id).await?;
        let existing = self.storage.list_sprints(project_id).await?.len();

        let end = end.unwrap_or_else(|| self.sprint_config.default_end(start));
        let sprint = Sprint::new(
            project.id.clone(),
            Sprint::generated_name(&project.key, existing),
            start,
            end,
        )?;
        self.storage.save_sprint(&sprint).await?;

        info!(project = %project.id, sprint = %sprint.id, name = %sprint.name, "sprint created");
        Ok(sprint)
    }

    /// Whether the delete control should be shown to the current user
    pub async fn can_delete_projects(&self) -> Result<bool> {
        Ok(self
            .membership
            .current_role()
            .await?
            .map(|role| role.can_delete_projects())
            .unwrap_or(false))
    }

    /// Deletes a project with all its sprints and issues. Admin only.
    pub async fn delete_project(&self, id: &ProjectId) -> Result<()> {
        if !self.can_delete_projects().await? {
            warn!(project = %id, "project deletion refused: admin role required");
            return Err(Guard::AdminRequired.into());
        }
        self.storage.delete_project(id).await
    }
}

#[cfg(all(test, feature = "file-storage"))]
mod tests {
    use super::*;
    use crate::domain::membership::FixedMembership;
    use crate::domain::MembershipRole;
    use crate::session::test_support::TestStorage;
    use chrono::Duration;

    async fn service(role: Option<MembershipRole>) -> ProjectService {
        ProjectService::new(
            Arc::new(TestStorage::new().await),
            Arc::new(FixedMembership(role)),
            SprintConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_sprints_are_numbered_per_project() {
        let service = service(Some(MembershipRole::Member)).await;
        let project = service
            .create_project("Mobile App", "app", None, "org_1")
            .await
            .unwrap();

        let start = Utc::now();
        let first = service.create_sprint(&project.id, start, None).await.unwrap();
        let second = service
            .create_sprint(
                &project.id,
                start + Duration::days(14),
                Some(start + Duration::days(21)),
            )
            .await
            .unwrap();

        assert_eq!(first.name, "APP-1");
        assert_eq!(first.end_date, start + Duration::days(14));
        assert_eq!(second.name, "APP-2");
    }

    #[tokio::test]
    async fn test_create_sprint_rejects_inverted_dates() {
        let service = service(None).await;
        let project = service
            .create_project("Mobile App", "APP", None, "org_1")
            .await
            .unwrap();

        let start = Utc::now();
        let err = service
            .create_sprint(&project.id, start, Some(start - Duration::days(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::DeckError::InvalidDateRange { .. }));
    }

    #[tokio::test]
    async fn test_only_admins_delete_projects() {
        let member = service(Some(MembershipRole::Member)).await;
        let project = member
            .create_project("Mobile App", "APP", None, "org_1")
            .await
            .unwrap();
        assert!(!member.can_delete_projects().await.unwrap());
        let err = member.delete_project(&project.id).await.unwrap_err();
        assert!(err.is_guard_rejected());

        let admin = service(Some(MembershipRole::Admin)).await;
        let project = admin
            .create_project("Mobile App", "APP", None, "org_1")
            .await
            .unwrap();
        assert!(admin.can_delete_projects().await.unwrap());
        admin.delete_project(&project.id).await.unwrap();
        assert!(admin.delete_project(&project.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_non_members_cannot_delete() {
        let outsider = service(None).await;
        assert!(!outsider.can_delete_projects().await.unwrap());
    }
}
