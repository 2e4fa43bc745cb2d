pub mod board;
pub mod distance;
pub mod filter;
pub mod id;
pub mod issue;
pub mod membership;
pub mod project;
pub mod reorder;
pub mod sorting;
pub mod sprint;

pub use board::{BoardConfig, Column, ColumnView};
pub use filter::IssueFilter;
pub use id::{IssueId, ProjectId, SprintId};
pub use issue::{Issue, IssueDraft, IssuePriority, IssueStatus};
pub use membership::{MembershipProvider, MembershipRole};
pub use project::Project;
pub use reorder::{reorder, DragEvent, DragLocation, ReorderResult};
pub use sorting::{sort_issues, SortField, SortOrder};
pub use sprint::{default_sprint, Sprint, SprintStatus};
