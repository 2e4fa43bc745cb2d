//! # Sprintdeck Core
//!
//! Core business logic and domain models for Sprintdeck sprint planning and
//! kanban boards.
//!
//! This crate provides the types and rules for sprints, issues and board
//! reordering, plus the session controllers that keep a local view in step
//! with a storage backend, without any dependency on a specific UI.
//!
//! Logging goes through `tracing`; install a subscriber in the host
//! application to see it.

pub mod config;
pub mod domain;
pub mod error;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use config::DeckConfig;
pub use domain::{
    default_sprint, reorder, BoardConfig, Column, DragEvent, DragLocation, Issue, IssueDraft,
    IssueFilter, IssueId, IssuePriority, IssueStatus, MembershipProvider, MembershipRole,
    Project, ProjectId, ReorderResult, Sprint, SprintId, SprintStatus,
};
pub use error::{DeckError, ErrorKind, Guard, Result};
pub use session::{BoardUpdate, ProjectService, SprintBoard, SprintController};
pub use storage::{open_storage, Storage};
