//! Drag-and-drop reordering of issues across board columns.
//!
//! The engine is pure: it takes a snapshot of the sprint's issues and returns
//! a new snapshot. Within every `(sprint, status)` partition touched by a
//! move, `order` values come out as the contiguous sequence `0..n`.

use crate::domain::issue::{Issue, IssueStatus};
use crate::domain::sorting::{sort_issues, SortField, SortOrder};
use crate::domain::sprint::SprintStatus;
use crate::error::{DeckError, Result};
use serde::{Deserialize, Serialize};

/// A position on the board: column key plus index within that column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragLocation {
    pub column: IssueStatus,
    pub index: usize,
}

impl DragLocation {
    pub fn new(column: IssueStatus, index: usize) -> Self {
        Self { column, index }
    }
}

/// Outcome of a drag gesture as reported by the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEvent {
    pub source: DragLocation,
    /// `None` when the card was dropped outside any column
    pub destination: Option<DragLocation>,
}

impl DragEvent {
    pub fn new(source: DragLocation, destination: Option<DragLocation>) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// A drop that leaves everything where it was
    pub fn is_noop(&self) -> bool {
        match self.destination {
            None => true,
            Some(destination) => destination == self.source,
        }
    }
}

/// New issue snapshot produced by a drag
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderResult {
    /// Full collection, sorted by order
    pub issues: Vec<Issue>,
    /// False when the drop was a no-op and `issues` equals the input
    pub moved: bool,
}

/// Applies a drag event to `issues`.
///
/// Fails with a guard rejection unless the sprint is active, and with
/// [`DeckError::IssueNotFound`] when the source index has no issue.
pub fn reorder(
    issues: &[Issue],
    sprint_status: SprintStatus,
    event: &DragEvent,
) -> Result<ReorderResult> {
    sprint_status.check_board_editable()?;

    let destination = match event.destination {
        Some(destination) if !event.is_noop() => destination,
        _ => {
            return Ok(ReorderResult {
                issues: issues.to_vec(),
                moved: false,
            })
        }
    };
    let source = event.source;

    let mut updated = issues.to_vec();
    let mut source_view = column_view(&updated, source.column);

    if source.index >= source_view.len() {
        return Err(DeckError::IssueNotFound(format!(
            "{}[{}]",
            source.column.key(),
            source.index
        )));
    }

    if source.column == destination.column {
        let moved = source_view.remove(source.index);
        let at = destination.index.min(source_view.len());
        source_view.insert(at, moved);
        renumber(&mut updated, &source_view);
    } else {
        let mut destination_view = column_view(&updated, destination.column);
        let moved = source_view.remove(source.index);
        updated[moved].status = destination.column;
        let at = destination.index.min(destination_view.len());
        destination_view.insert(at, moved);
        renumber(&mut updated, &source_view);
        renumber(&mut updated, &destination_view);
    }

    sort_issues(&mut updated, SortField::Order, SortOrder::Ascending);

    Ok(ReorderResult {
        issues: updated,
        moved: true,
    })
}

// Positions in `issues` of the members of `column`, by order then collection position
fn column_view(issues: &[Issue], column: IssueStatus) -> Vec<usize> {
    let mut view: Vec<usize> = issues
        .iter()
        .enumerate()
        .filter(|(_, issue)| issue.status == column)
        .map(|(i, _)| i)
        .collect();
    view.sort_by_key(|&i| issues[i].order);
    view
}

fn renumber(issues: &mut [Issue], view: &[usize]) {
    for (order, &i) in view.iter().enumerate() {
        issues[i].order = u32::try_from(order).unwrap_or(u32::MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::{ProjectId, SprintId};

    fn issue(title: &str, status: IssueStatus, order: u32) -> Issue {
        let mut issue = Issue::new(title, SprintId::from("s1"), ProjectId::from("p1"), order)
            .with_status(status);
        issue.id = title.into();
        issue
    }

    fn titles_in(issues: &[Issue], column: IssueStatus) -> Vec<(String, u32)> {
        let mut in_column: Vec<&Issue> = issues.iter().filter(|i| i.status == column).collect();
        in_column.sort_by_key(|i| i.order);
        in_column
            .iter()
            .map(|i| (i.title.clone(), i.order))
            .collect()
    }

    fn assert_contiguous(issues: &[Issue]) {
        for column in IssueStatus::ALL {
            let mut orders: Vec<u32> = issues
                .iter()
                .filter(|i| i.status == column)
                .map(|i| i.order)
                .collect();
            orders.sort_unstable();
            let expected: Vec<u32> = (0..orders.len() as u32).collect();
            assert_eq!(orders, expected, "column {} not contiguous", column.key());
        }
    }

    fn board() -> Vec<Issue> {
        vec![
            issue("a0", IssueStatus::Todo, 0),
            issue("a1", IssueStatus::Todo, 1),
            issue("a2", IssueStatus::Todo, 2),
            issue("b0", IssueStatus::InProgress, 0),
            issue("b1", IssueStatus::InProgress, 1),
            issue("d0", IssueStatus::Done, 0),
        ]
    }

    fn drag(from: (IssueStatus, usize), to: Option<(IssueStatus, usize)>) -> DragEvent {
        DragEvent::new(
            DragLocation::new(from.0, from.1),
            to.map(|(column, index)| DragLocation::new(column, index)),
        )
    }

    #[test]
    fn test_cross_column_move() {
        let event = drag((IssueStatus::Todo, 1), Some((IssueStatus::InProgress, 0)));
        let result = reorder(&board(), SprintStatus::Active, &event).unwrap();

        assert!(result.moved);
        assert_eq!(
            titles_in(&result.issues, IssueStatus::Todo),
            vec![("a0".to_string(), 0), ("a2".to_string(), 1)]
        );
        assert_eq!(
            titles_in(&result.issues, IssueStatus::InProgress),
            vec![
                ("a1".to_string(), 0),
                ("b0".to_string(), 1),
                ("b1".to_string(), 2)
            ]
        );

        let moved = result.issues.iter().find(|i| i.title == "a1").unwrap();
        assert_eq!(moved.status, IssueStatus::InProgress);
        assert_contiguous(&result.issues);
    }

    #[test]
    fn test_same_column_move_down() {
        let event = drag((IssueStatus::Todo, 0), Some((IssueStatus::Todo, 2)));
        let result = reorder(&board(), SprintStatus::Active, &event).unwrap();

        assert_eq!(
            titles_in(&result.issues, IssueStatus::Todo),
            vec![
                ("a1".to_string(), 0),
                ("a2".to_string(), 1),
                ("a0".to_string(), 2)
            ]
        );
        assert_contiguous(&result.issues);
    }

    #[test]
    fn test_same_column_move_up() {
        let event = drag((IssueStatus::Todo, 2), Some((IssueStatus::Todo, 0)));
        let result = reorder(&board(), SprintStatus::Active, &event).unwrap();

        assert_eq!(
            titles_in(&result.issues, IssueStatus::Todo),
            vec![
                ("a2".to_string(), 0),
                ("a0".to_string(), 1),
                ("a1".to_string(), 2)
            ]
        );
    }

    #[test]
    fn test_unaffected_columns_untouched() {
        let before = board();
        let event = drag((IssueStatus::Todo, 0), Some((IssueStatus::InProgress, 2)));
        let result = reorder(&before, SprintStatus::Active, &event).unwrap();

        let done_before = before.iter().find(|i| i.title == "d0").unwrap();
        let done_after = result.issues.iter().find(|i| i.title == "d0").unwrap();
        assert_eq!(done_before, done_after);
    }

    #[test]
    fn test_move_into_empty_column() {
        let event = drag((IssueStatus::Todo, 2), Some((IssueStatus::InReview, 5)));
        let result = reorder(&board(), SprintStatus::Active, &event).unwrap();

        assert_eq!(
            titles_in(&result.issues, IssueStatus::InReview),
            vec![("a2".to_string(), 0)]
        );
        assert_contiguous(&result.issues);
    }

    #[test]
    fn test_emptying_a_column() {
        let event = drag((IssueStatus::Done, 0), Some((IssueStatus::Todo, 0)));
        let result = reorder(&board(), SprintStatus::Active, &event).unwrap();

        assert!(titles_in(&result.issues, IssueStatus::Done).is_empty());
        assert_eq!(titles_in(&result.issues, IssueStatus::Todo)[0].0, "d0");
        assert_contiguous(&result.issues);
    }

    #[test]
    fn test_gapped_orders_are_compacted() {
        let issues = vec![
            issue("a", IssueStatus::Todo, 3),
            issue("b", IssueStatus::Todo, 7),
            issue("c", IssueStatus::Todo, 12),
        ];
        let event = drag((IssueStatus::Todo, 2), Some((IssueStatus::Todo, 1)));
        let result = reorder(&issues, SprintStatus::Active, &event).unwrap();

        assert_eq!(
            titles_in(&result.issues, IssueStatus::Todo),
            vec![
                ("a".to_string(), 0),
                ("c".to_string(), 1),
                ("b".to_string(), 2)
            ]
        );
    }

    #[test]
    fn test_result_sorted_by_order() {
        let event = drag((IssueStatus::Todo, 1), Some((IssueStatus::InProgress, 0)));
        let result = reorder(&board(), SprintStatus::Active, &event).unwrap();

        let orders: Vec<u32> = result.issues.iter().map(|i| i.order).collect();
        let mut sorted = orders.clone();
        sorted.sort_unstable();
        assert_eq!(orders, sorted);
    }

    #[test]
    fn test_drop_on_same_spot_is_noop() {
        let before = board();
        let event = drag((IssueStatus::Todo, 1), Some((IssueStatus::Todo, 1)));
        let result = reorder(&before, SprintStatus::Active, &event).unwrap();

        assert!(!result.moved);
        assert_eq!(result.issues, before);
    }

    #[test]
    fn test_drop_outside_is_noop() {
        let before = board();
        let event = drag((IssueStatus::Todo, 1), None);
        let result = reorder(&before, SprintStatus::Active, &event).unwrap();

        assert!(!result.moved);
        assert_eq!(result.issues, before);
    }

    #[test]
    fn test_planned_sprint_rejected() {
        let event = drag((IssueStatus::Todo, 1), Some((IssueStatus::Done, 0)));
        let err = reorder(&board(), SprintStatus::Planned, &event).unwrap_err();
        assert!(err.is_guard_rejected());
        assert_eq!(err.to_string(), "Start the sprint to update board");
    }

    #[test]
    fn test_completed_sprint_rejected() {
        // Even a no-op drop is refused on a frozen board
        let event = drag((IssueStatus::Todo, 1), None);
        let err = reorder(&board(), SprintStatus::Completed, &event).unwrap_err();
        assert!(err.is_guard_rejected());
        assert_eq!(err.to_string(), "Cannot update board after sprint end");
    }

    #[test]
    fn test_missing_source_is_not_found() {
        let event = drag((IssueStatus::InReview, 0), Some((IssueStatus::Todo, 0)));
        let err = reorder(&board(), SprintStatus::Active, &event).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_every_move_keeps_columns_contiguous() {
        let before = board();
        for from in IssueStatus::ALL {
            let count = before.iter().filter(|i| i.status == from).count();
            for from_index in 0..count {
                for to in IssueStatus::ALL {
                    for to_index in 0..=4 {
                        let event = drag((from, from_index), Some((to, to_index)));
                        let result = reorder(&before, SprintStatus::Active, &event).unwrap();
                        assert_eq!(result.issues.len(), before.len());
                        assert_contiguous(&result.issues);
                    }
                }
            }
        }
    }
}
