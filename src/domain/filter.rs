use crate::domain::issue::{Issue, IssuePriority};

/// Board filter bar state. An empty filter matches every issue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueFilter {
    /// Case-insensitive substring of the title
    pub search: Option<String>,
    /// Keep issues assigned to any of these users
    pub assignees: Vec<String>,
    pub priority: Option<IssuePriority>,
}

impl IssueFilter {
    pub fn is_empty(&self) -> bool {
        self.search.as_deref().map(str::trim).unwrap_or("").is_empty()
            && self.assignees.is_empty()
            && self.priority.is_none()
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        let search_matches = match self.search.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => issue
                .title
                .to_lowercase()
                .contains(&query.to_lowercase()),
            _ => true,
        };

        let assignee_matches = self.assignees.is_empty()
            || issue
                .assignee_id
                .as_ref()
                .map(|assignee| self.assignees.contains(assignee))
                .unwrap_or(false);

        let priority_matches = self
            .priority
            .map(|priority| issue.priority == priority)
            .unwrap_or(true);

        search_matches && assignee_matches && priority_matches
    }

    /// Returns the matching issues, preserving input order
    pub fn apply(&self, issues: &[Issue]) -> Vec<Issue> {
        issues
            .iter()
            .filter(|issue| self.matches(issue))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::{ProjectId, SprintId};

    fn issues() -> Vec<Issue> {
        let mut login = Issue::new("Login page", SprintId::from("s1"), ProjectId::from("p1"), 0);
        login.assign_to(Some("alice".to_string()));
        login.set_priority(IssuePriority::High);

        let mut logout =
            Issue::new("Logout button", SprintId::from("s1"), ProjectId::from("p1"), 1);
        logout.assign_to(Some("bob".to_string()));

        let docs = Issue::new("Write docs", SprintId::from("s1"), ProjectId::from("p1"), 2);

        vec![login, logout, docs]
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let filter = IssueFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&issues()).len(), 3);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let filter = IssueFilter {
            search: Some("LOG".to_string()),
            ..Default::default()
        };
        let titles: Vec<String> = filter.apply(&issues()).into_iter().map(|i| i.title).collect();
        assert_eq!(titles, vec!["Login page", "Logout button"]);
    }

    #[test]
    fn test_assignee_filter_excludes_unassigned() {
        let filter = IssueFilter {
            assignees: vec!["bob".to_string()],
            ..Default::default()
        };
        let matched = filter.apply(&issues());
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].title, "Logout button");
    }

    #[test]
    fn test_filters_combine() {
        let filter = IssueFilter {
            search: Some("log".to_string()),
            assignees: vec!["alice".to_string(), "bob".to_string()],
            priority: Some(IssuePriority::High),
        };
        let matched = filter.apply(&issues());
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].title, "Login page");
    }
}
