use crate::{
    domain::{default_sprint, ProjectId, Sprint, SprintId, SprintStatus},
    error::{DeckError, Result},
    storage::Storage,
};
use chrono::{DateTime, Utc};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

struct SprintState {
    sprints: Vec<Sprint>,
    current: usize,
    next_tag: u64,
    /// Tag of the newest status response applied, per sprint
    applied: HashMap<SprintId, u64>,
}

impl SprintState {
    fn current(&self) -> &Sprint {
        &self.sprints[self.current]
    }

    fn next_tag(&mut self) -> u64 {
        self.next_tag += 1;
        self.next_tag
    }

    /// Mirrors an authoritative sprint record unless a newer response was already applied
    fn apply_status(&mut self, tag: u64, sprint: &Sprint) -> bool {
        let applied = self.applied.entry(sprint.id.clone()).or_insert(0);
        if tag < *applied {
            return false;
        }
        *applied = tag;

        if let Some(local) = self.sprints.iter_mut().find(|s| s.id == sprint.id) {
            local.status = sprint.status;
        }
        true
    }
}

/// Tracks the sprint currently shown and drives its lifecycle
pub struct SprintController {
    storage: Arc<dyn Storage>,
    state: Mutex<SprintState>,
}

impl SprintController {
    /// Creates a controller over `sprints`, selecting the active sprint if any
    pub fn new(storage: Arc<dyn Storage>, sprints: Vec<Sprint>) -> Result<Self> {
        let selected = default_sprint(&sprints)
            .map(|sprint| sprint.id.clone())
            .ok_or_else(|| DeckError::SprintNotFound("project has no sprints".to_string()))?;
        let current = sprints
            .iter()
            .position(|sprint| sprint.id == selected)
            .unwrap_or(0);

        Ok(Self {
            storage,
            state: Mutex::new(SprintState {
                sprints,
                current,
                next_tag: 0,
                applied: HashMap::new(),
            }),
        })
    }

    /// Loads the sprints of a project from storage
    pub async fn load(storage: Arc<dyn Storage>, project_id: &ProjectId) -> Result<Self> {
        let sprints = storage.list_sprints(project_id).await?;
        Self::new(storage, sprints)
    }

    pub async fn current(&self) -> Sprint {
        self.state.lock().await.current().clone()
    }

    pub async fn sprints(&self) -> Vec<Sprint> {
        self.state.lock().await.sprints.clone()
    }

    /// Switches the current sprint. Unknown ids leave the selection unchanged.
    pub async fn select(&self, id: &SprintId) -> Option<Sprint> {
        let mut state = self.state.lock().await;
        match state.sprints.iter().position(|sprint| &sprint.id == id) {
            Some(index) => {
                state.current = index;
                debug!(sprint = %id, "sprint selected");
                Some(state.current().clone())
            }
            None => {
                debug!(sprint = %id, "ignoring selection of unknown sprint");
                None
            }
        }
    }

    /// Adds or replaces a sprint in the local list
    pub async fn upsert(&self, sprint: Sprint) {
        let mut state = self.state.lock().await;
        match state.sprints.iter_mut().find(|s| s.id == sprint.id) {
            Some(existing) => *existing = sprint,
            None => state.sprints.push(sprint),
        }
    }

    pub async fn status_text(&self) -> Option<String> {
        self.status_text_at(Utc::now()).await
    }

    pub async fn status_text_at(&self, now: DateTime<Utc>) -> Option<String> {
        self.state.lock().await.current().status_text(now)
    }

    pub async fn can_start(&self) -> bool {
        self.state.lock().await.current().can_start(Utc::now())
    }

    pub async fn can_end(&self) -> bool {
        self.state.lock().await.current().can_end()
    }

    /// Moves the current sprint to `target`
    pub async fn change_status(&self, target: SprintStatus) -> Result<Sprint> {
        self.change_status_at(target, Utc::now()).await
    }

    /// Moves the current sprint to `target`, checking date windows against `now`.
    ///
    /// Rejected transitions never reach storage. On success the local copy
    /// takes the status returned by storage, not the requested one.
    pub async fn change_status_at(
        &self,
        target: SprintStatus,
        now: DateTime<Utc>,
    ) -> Result<Sprint> {
        let (sprint_id, tag) = {
            let mut state = self.state.lock().await;
            let sprint = state.current();
            if let Err(e) = sprint.check_transition(target, now) {
                warn!(sprint = %sprint.id, from = %sprint.status, to = %target, "sprint transition rejected: {e}");
                return Err(e);
            }
            let sprint_id = sprint.id.clone();
            (sprint_id, state.next_tag())
        };

        let updated = match self.storage.update_sprint_status(&sprint_id, target).await {
            Ok(updated) => updated,
            Err(e) => {
                warn!(sprint = %sprint_id, to = %target, "sprint status update failed: {e}");
                return Err(e);
            }
        };

        let mut state = self.state.lock().await;
        if state.apply_status(tag, &updated) {
            info!(sprint = %sprint_id, status = %updated.status, "sprint status changed");
        } else {
            debug!(sprint = %sprint_id, tag, "discarding stale sprint status response");
        }
        Ok(updated)
    }
}
