//! Board Entity
//!
//! A board is a named, ordered list of columns plus a filter selecting which
//! issues it shows. It owns its columns, never its issues.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use super::entity::{DomainError, DomainResult, Entity};
use super::issue::{Issue, IssueFilter};

/// One lane of a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    pub id: String,
    pub title: String,
    /// Issue statuses rendered in this lane; the column id itself always maps
    #[serde(default)]
    pub status_mappings: Vec<String>,
}

impl ColumnConfig {
    pub fn accepts(&self, status: &str) -> bool {
        self.id == status || self.status_mappings.iter().any(|s| s == status)
    }

    pub fn lane(&self) -> Lane {
        let mut accepted = vec![self.id.clone()];
        accepted.extend(self.status_mappings.iter().filter(|s| **s != self.id).cloned());
        Lane { status: self.id.clone(), accepted }
    }
}

/// Every status rendered in one lane. Issues moved into the lane take `status`;
/// neighbour checks and resequencing cover all of `accepted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lane {
    pub status: String,
    pub accepted: Vec<String>,
}

impl Lane {
    /// A lane that is exactly one status
    pub fn single(status: impl Into<String>) -> Self {
        let status = status.into();
        Self { accepted: vec![status.clone()], status }
    }

    pub fn accepts(&self, status: &str) -> bool {
        self.accepted.iter().any(|s| s == status)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub column_config: Vec<ColumnConfig>,
    #[serde(default)]
    pub filter: IssueFilter,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Board {
    /// Lane a move into `status` lands in; unknown statuses form their own lane
    pub fn lane_for(&self, status: &str) -> Lane {
        self.column_config
            .iter()
            .find(|c| c.id == status)
            .map(ColumnConfig::lane)
            .unwrap_or_else(|| Lane::single(status))
    }

    /// Column ids must be non-empty and unique; the order is the display order
    pub fn validate_columns(columns: &[ColumnConfig]) -> DomainResult<()> {
        let mut seen = HashSet::new();
        for column in columns {
            if column.id.trim().is_empty() {
                return Err(DomainError::InvalidInput("column id must not be empty".to_string()));
            }
            if !seen.insert(column.id.as_str()) {
                return Err(DomainError::InvalidInput(format!("duplicate column id '{}'", column.id)));
            }
        }
        Ok(())
    }

    /// Whether an issue is shown on this board at all
    pub fn shows(&self, issue: &Issue) -> bool {
        self.filter.matches(issue) && self.column_config.iter().any(|c| c.accepts(&issue.status))
    }
}

impl Entity for Board {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBoard {
    #[serde(default)]
    pub id: Option<String>,
    pub project_id: String,
    pub name: String,
    pub column_config: Vec<ColumnConfig>,
    #[serde(default)]
    pub filter: IssueFilter,
}

/// Board plus the issues it currently shows, ordered by sort key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardWithIssues {
    #[serde(flatten)]
    pub board: Board,
    pub issues: Vec<Issue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(id: &str) -> ColumnConfig {
        ColumnConfig { id: id.to_string(), title: id.to_uppercase(), status_mappings: vec![] }
    }

    #[test]
    fn test_validate_columns_rejects_duplicates() {
        assert!(Board::validate_columns(&[column("todo"), column("done")]).is_ok());
        let err = Board::validate_columns(&[column("todo"), column("todo")]).unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
        assert!(Board::validate_columns(&[column(" ")]).is_err());
    }

    #[test]
    fn test_lane_for_mapped_column() {
        let mut todo = column("todo");
        todo.status_mappings = vec!["open".to_string(), "todo".to_string()];
        let board = Board {
            id: "b".to_string(),
            project_id: "p".to_string(),
            name: "Board".to_string(),
            column_config: vec![todo, column("done")],
            filter: IssueFilter::default(),
            created_at: None,
            updated_at: None,
        };

        let lane = board.lane_for("todo");
        assert_eq!(lane.status, "todo");
        assert_eq!(lane.accepted, vec!["todo", "open"]);
        assert!(lane.accepts("open"));
        assert_eq!(board.lane_for("archived"), Lane::single("archived"));
    }

    #[test]
    fn test_column_accepts_mapped_statuses() {
        let mut col = column("done");
        col.status_mappings = vec!["closed".to_string()];
        assert!(col.accepts("done"));
        assert!(col.accepts("closed"));
        assert!(!col.accepts("todo"));
    }

    #[test]
    fn test_board_with_issues_flattens() {
        let board = Board {
            id: "b1".into(),
            project_id: "p".into(),
            name: "Main".into(),
            column_config: vec![column("todo")],
            filter: IssueFilter::default(),
            created_at: None,
            updated_at: None,
        };
        let json = serde_json::to_value(BoardWithIssues { board, issues: vec![] }).unwrap();
        assert_eq!(json["id"], "b1");
        assert_eq!(json["columnConfig"][0]["id"], "todo");
        assert!(json["issues"].as_array().unwrap().is_empty());
    }
}
