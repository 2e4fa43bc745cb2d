use crate::domain::issue::Issue;
use std::str::FromStr;

/// Fields available for sorting issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Order,
    Title,
    Status,
    Priority,
    Created,
    Updated,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "order" => Ok(SortField::Order),
            "title" => Ok(SortField::Title),
            "status" => Ok(SortField::Status),
            "priority" => Ok(SortField::Priority),
            "created" => Ok(SortField::Created),
            "updated" => Ok(SortField::Updated),
            _ => Err(format!(
                "Invalid sort field '{}'. Valid fields: order, title, status, priority, created, updated",
                s
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(format!(
                "Invalid sort order '{}'. Valid orders: asc, desc",
                s
            )),
        }
    }
}

/// Sorts issues in-place.
///
/// The sort is stable, so issues comparing equal keep their relative
/// position. Sorting a whole board by [`SortField::Order`] therefore keeps
/// each column's internal sequence intact.
///
/// # Examples
/// ```
/// use sprintdeck_core::domain::issue::Issue;
/// use sprintdeck_core::domain::sorting::{sort_issues, SortField, SortOrder};
///
/// let mut issues = vec![
///     Issue::new("B", "s1".into(), "p1".into(), 1),
///     Issue::new("A", "s1".into(), "p1".into(), 0),
/// ];
///
/// sort_issues(&mut issues, SortField::Order, SortOrder::Ascending);
/// assert_eq!(issues[0].title, "A");
/// ```
pub fn sort_issues(issues: &mut [Issue], field: SortField, order: SortOrder) {
    issues.sort_by(|a, b| {
        let cmp = match field {
            SortField::Order => a.order.cmp(&b.order),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Status => a.status.rank().cmp(&b.status.rank()),
            SortField::Priority => a.priority.cmp(&b.priority),
            SortField::Created => a.created_at.cmp(&b.created_at),
            SortField::Updated => a.updated_at.cmp(&b.updated_at),
        };

        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}

/// Board order: by column position, then order within the column
pub fn sort_for_board(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        a.status
            .rank()
            .cmp(&b.status.rank())
            .then(a.order.cmp(&b.order))
    });
}
