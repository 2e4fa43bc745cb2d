use crate::{
    domain::{
        board::next_order, reorder, BoardConfig, ColumnView, DragEvent, Issue, IssueDraft,
        IssueFilter, IssueId, Sprint, SprintId, SprintStatus,
    },
    error::Result,
    session::sprint::SprintController,
    storage::Storage,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Result of a drag on the board
#[derive(Debug, Clone, PartialEq)]
pub enum BoardUpdate {
    /// Nothing moved; the board is as it was
    Unchanged,
    /// The new order was applied locally and stored
    Moved(Vec<Issue>),
}

#[derive(Debug, Clone)]
struct Snapshot {
    version: u64,
    issues: Vec<Issue>,
}

struct BoardState {
    sprint_id: SprintId,
    issues: Vec<Issue>,
    /// Bumped on every local change
    version: u64,
    /// Versions at or below this belong to a sprint shown earlier
    base: u64,
    /// Last snapshot known to match storage
    confirmed: Snapshot,
    /// Order writes issued and not yet answered
    in_flight: usize,
    /// Set when a write failed or answers arrived out of order
    diverged: bool,
}

impl BoardState {
    fn empty(sprint_id: SprintId, base: u64) -> Self {
        Self {
            sprint_id,
            issues: Vec::new(),
            version: base,
            base,
            confirmed: Snapshot {
                version: base,
                issues: Vec::new(),
            },
            in_flight: 0,
            diverged: false,
        }
    }

    fn replace(&mut self, issues: Vec<Issue>) -> u64 {
        self.version += 1;
        self.issues = issues;
        self.version
    }

    fn confirm(&mut self, version: u64, issues: Vec<Issue>) {
        if version > self.confirmed.version {
            self.confirmed = Snapshot { version, issues };
        }
    }

    /// Records the answer to the order write tagged `tag`.
    ///
    /// Returns true when it was the last write in flight and the local view
    /// may no longer match storage.
    fn settle(&mut self, tag: u64, stored: Option<&[Issue]>) -> bool {
        if tag <= self.base {
            return false;
        }
        self.in_flight = self.in_flight.saturating_sub(1);

        match stored {
            Some(issues) => {
                if tag < self.confirmed.version {
                    self.diverged = true;
                }
                self.confirm(tag, issues.to_vec());
            }
            None => self.diverged = true,
        }

        if self.in_flight == 0 && self.diverged {
            self.diverged = false;
            return true;
        }
        false
    }
}

/// The kanban board of the current sprint.
///
/// Issues are cached locally and updated optimistically; storage stays the
/// source of truth and is re-read whenever the sprint changes.
pub struct SprintBoard {
    storage: Arc<dyn Storage>,
    sprints: SprintController,
    config: BoardConfig,
    state: Mutex<BoardState>,
}

impl SprintBoard {
    /// Builds the board and loads the current sprint's issues
    pub async fn open(
        storage: Arc<dyn Storage>,
        sprints: SprintController,
        config: BoardConfig,
    ) -> Result<Self> {
        let sprint_id = sprints.current().await.id;
        let board = Self {
            storage,
            sprints,
            config,
            state: Mutex::new(BoardState::empty(sprint_id, 0)),
        };
        board.load().await?;
        Ok(board)
    }

    pub fn sprints(&self) -> &SprintController {
        &self.sprints
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub async fn current_sprint(&self) -> Sprint {
        self.sprints.current().await
    }

    /// Cached issues, sorted by order
    pub async fn issues(&self) -> Vec<Issue> {
        self.state.lock().await.issues.clone()
    }

    /// Local snapshot version; changes on every applied update
    pub async fn version(&self) -> u64 {
        self.state.lock().await.version
    }

    /// Issues grouped into the configured columns
    pub async fn columns(&self) -> Vec<ColumnView> {
        let state = self.state.lock().await;
        self.config.group(&state.issues)
    }

    /// Cached issues matching the board filter
    pub async fn filtered(&self, filter: &IssueFilter) -> Vec<Issue> {
        filter.apply(&self.state.lock().await.issues)
    }

    /// Re-reads the current sprint's issues from storage.
    ///
    /// Returns false when the response was dropped because the board changed
    /// while it was in flight.
    pub async fn load(&self) -> Result<bool> {
        let (sprint_id, started_at) = {
            let state = self.state.lock().await;
            (state.sprint_id.clone(), state.version)
        };

        let fetched = self.storage.fetch_issues_for_sprint(&sprint_id).await?;

        let mut state = self.state.lock().await;
        if state.sprint_id != sprint_id || state.version != started_at {
            debug!(sprint = %sprint_id, "discarding stale issue fetch");
            return Ok(false);
        }
        let version = state.replace(fetched.clone());
        state.confirm(version, fetched);
        debug!(sprint = %sprint_id, version, count = state.issues.len(), "issues loaded");
        Ok(true)
    }

    /// Applies a drag result: checks guards, updates locally, then stores the new order.
    ///
    /// Several drags may be in flight at once. When the last of them is
    /// answered and any write failed or answers arrived out of order, the
    /// board is re-read from storage. A failed write returns its error.
    pub async fn on_drag_end(&self, event: DragEvent) -> Result<BoardUpdate> {
        let sprint = self.sprints.current().await;

        let (issues, tag) = {
            let mut state = self.state.lock().await;
            if state.sprint_id != sprint.id {
                debug!(sprint = %sprint.id, "sprint switched during drag, ignoring");
                return Ok(BoardUpdate::Unchanged);
            }
            let result = match reorder(&state.issues, sprint.status, &event) {
                Ok(result) => result,
                Err(e) if e.is_not_found() => {
                    debug!(sprint = %sprint.id, "drag source not on board: {e}");
                    return Ok(BoardUpdate::Unchanged);
                }
                Err(e) => {
                    warn!(sprint = %sprint.id, status = %sprint.status, "board update rejected: {e}");
                    return Err(e);
                }
            };
            if !result.moved {
                return Ok(BoardUpdate::Unchanged);
            }
            let tag = state.replace(result.issues.clone());
            state.in_flight += 1;
            debug!(sprint = %sprint.id, version = tag, "optimistic board update applied");
            (result.issues, tag)
        };

        let stored = self.storage.update_issue_order(&issues).await;

        let resync = {
            let mut state = self.state.lock().await;
            match &stored {
                Ok(()) => state.settle(tag, Some(issues.as_slice())),
                Err(e) => {
                    warn!(sprint = %sprint.id, version = tag, "storing board order failed: {e}");
                    state.settle(tag, None)
                }
            }
        };
        if resync {
            self.resync().await;
        }

        stored.map(|()| BoardUpdate::Moved(issues))
    }

    /// Re-reads storage after diverging writes; falls back to the last confirmed snapshot
    async fn resync(&self) {
        match self.load().await {
            Ok(true) => info!("board resynced with storage"),
            Ok(false) => {
                // Another local change landed meanwhile; its own answer resyncs
                self.state.lock().await.diverged = true;
            }
            Err(e) => {
                warn!("refetching board failed, restoring last stored order: {e}");
                let mut state = self.state.lock().await;
                if state.in_flight == 0 {
                    let restored = state.confirmed.issues.clone();
                    let version = state.replace(restored);
                    info!(version, "board reverted to last stored order");
                }
            }
        }
    }

    /// Switches sprints and reloads the board. Unknown ids are a no-op.
    pub async fn select_sprint(&self, id: &SprintId) -> Result<Option<Sprint>> {
        let Some(sprint) = self.sprints.select(id).await else {
            return Ok(None);
        };
        self.reset(sprint.id.clone()).await;
        self.load().await?;
        Ok(Some(sprint))
    }

    /// Changes the current sprint's status and refreshes the cached issues
    pub async fn change_sprint_status(&self, target: SprintStatus) -> Result<Sprint> {
        let sprint = self.sprints.change_status(target).await?;
        self.load().await?;
        Ok(sprint)
    }

    /// Creates an issue at the end of the intake column
    pub async fn create_issue(&self, draft: IssueDraft) -> Result<Issue> {
        let sprint = self.sprints.current().await;
        self.config.check_issue_creation(draft.status, sprint.status)?;

        let order = {
            let state = self.state.lock().await;
            next_order(&state.issues, draft.status)
        };
        let issue = Issue::from_draft(draft, sprint.id.clone(), sprint.project_id.clone(), order)?;
        self.storage.save_issue(&issue).await?;
        info!(sprint = %sprint.id, issue = %issue.id, "issue created");

        self.load().await?;
        Ok(issue)
    }

    /// Stores an edited issue and refreshes it in the cache
    pub async fn update_issue(&self, issue: Issue) -> Result<()> {
        self.storage.save_issue(&issue).await?;

        let mut state = self.state.lock().await;
        let mut issues = state.issues.clone();
        issues.retain(|cached| cached.id != issue.id);
        if issue.sprint_id == state.sprint_id {
            issues.push(issue);
        }
        issues.sort_by_key(|cached| cached.order);
        state.replace(issues);
        Ok(())
    }

    /// Deletes an issue and reloads the board
    pub async fn delete_issue(&self, id: &IssueId) -> Result<()> {
        self.storage.delete_issue(id).await?;
        self.load().await?;
        Ok(())
    }

    async fn reset(&self, sprint_id: SprintId) {
        let mut state = self.state.lock().await;
        // Versions stay monotonic so answers for the old sprint are never taken as current
        let base = state.version + 1;
        *state = BoardState::empty(sprint_id, base);
    }
}
