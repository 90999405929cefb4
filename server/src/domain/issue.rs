//! Issue Entity
//!
//! Represents a tracked issue with hierarchical structure (single parent) and a
//! fractional sort key within its status column.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// Issue type determines how the issue is displayed as a parent hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    Epic,
    Story,
    #[default]
    Task,
    Bug,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Epic => "epic",
            IssueType::Story => "story",
            IssueType::Task => "task",
            IssueType::Bug => "bug",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "epic" => IssueType::Epic,
            "story" => IssueType::Story,
            "bug" => IssueType::Bug,
            _ => IssueType::Task,
        }
    }
}

/// Denormalized ancestor summary shown in card footers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentRef {
    pub id: String,
    pub title: String,
    pub issue_type: IssueType,
}

/// A tracked issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Unique identifier
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Status doubles as the column the issue sits in
    pub status: String,
    pub issue_type: IssueType,
    /// Parent issue ID (None = top level)
    pub parent_id: Option<String>,
    /// Fractional position within the status column
    pub sort_order: f64,
    /// Resolved on read, never stored
    #[serde(default)]
    pub parent: Option<ParentRef>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Issue {
    /// Check if this is a top-level issue (no parent)
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn parent_ref(&self) -> ParentRef {
        ParentRef {
            id: self.id.clone(),
            title: self.title.clone(),
            issue_type: self.issue_type,
        }
    }
}

impl Entity for Issue {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Payload for creating an issue; position is allocated at the end of its status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIssue {
    /// Explicit ID, otherwise generated from the project prefix
    #[serde(default)]
    pub id: Option<String>,
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    #[serde(default)]
    pub issue_type: IssueType,
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Predicate selecting issues, shared by boards and the issue listing endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl IssueFilter {
    pub fn is_empty(&self) -> bool {
        self.parent_id.is_none() && self.status.is_none()
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        if let Some(parent_id) = &self.parent_id {
            if issue.parent_id.as_ref() != Some(parent_id) {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if &issue.status != status {
                return false;
            }
        }
        true
    }

    /// Narrow this filter with another; fields already set win
    pub fn merged(&self, other: &IssueFilter) -> IssueFilter {
        IssueFilter {
            parent_id: self.parent_id.clone().or_else(|| other.parent_id.clone()),
            status: self.status.clone().or_else(|| other.status.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_issue(id: &str, status: &str, parent_id: Option<&str>) -> Issue {
        Issue {
            id: id.to_string(),
            project_id: "proj".to_string(),
            title: format!("Issue {}", id),
            description: None,
            status: status.to_string(),
            issue_type: IssueType::Task,
            parent_id: parent_id.map(str::to_string),
            sort_order: 0.0,
            parent: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_issue_type_round_trip() {
        assert_eq!(IssueType::Epic.as_str(), "epic");
        assert_eq!(IssueType::parse("bug"), IssueType::Bug);
        assert_eq!(IssueType::parse("unknown"), IssueType::Task);
    }

    #[test]
    fn test_filter_matches() {
        let child = make_issue("A", "todo", Some("EPIC"));
        let root = make_issue("B", "done", None);

        assert!(IssueFilter::default().matches(&child));
        let by_parent = IssueFilter { parent_id: Some("EPIC".into()), status: None };
        assert!(by_parent.matches(&child));
        assert!(!by_parent.matches(&root));
        let by_status = IssueFilter { parent_id: None, status: Some("done".into()) };
        assert!(by_status.matches(&root));
        assert!(!by_status.matches(&child));
    }

    #[test]
    fn test_filter_merge_keeps_own_fields() {
        let board = IssueFilter { parent_id: Some("EPIC".into()), status: None };
        let request = IssueFilter { parent_id: Some("OTHER".into()), status: Some("todo".into()) };
        let merged = board.merged(&request);
        assert_eq!(merged.parent_id.as_deref(), Some("EPIC"));
        assert_eq!(merged.status.as_deref(), Some("todo"));
    }

    #[test]
    fn test_issue_serializes_camel_case() {
        let issue = make_issue("A", "todo", Some("P"));
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["parentId"], "P");
        assert_eq!(json["sortOrder"], 0.0);
        assert!(!issue.is_root());
    }
}
