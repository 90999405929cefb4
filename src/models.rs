//! Frontend Models
//!
//! Wire structures matching the server's JSON, and the render models the
//! board store holds.

use serde::{Deserialize, Serialize};

// ========================
// Wire types
// ========================

/// Ancestor summary shown in card footers (display hint only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentRef {
    pub id: String,
    pub title: String,
    pub issue_type: String,
}

/// Issue as returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    #[serde(default = "default_issue_type")]
    pub issue_type: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub sort_order: f64,
    #[serde(default)]
    pub parent: Option<ParentRef>,
}

fn default_issue_type() -> String {
    "task".to_string()
}

/// Predicate narrowing which issues are shown
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Persisted lane configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status_mappings: Vec<String>,
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
}

/// `GET /api/boards/{id}` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardWithIssues {
    #[serde(flatten)]
    pub board: Board,
    pub issues: Vec<Issue>,
}

/// Body of `POST /api/issues/{id}/move`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveIssue {
    #[serde(skip)]
    pub issue_id: String,
    /// Lets the server resolve `status` to a lane and its mapped statuses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_id: Option<String>,
    pub status: String,
    pub prev_issue_id: Option<String>,
    pub next_issue_id: Option<String>,
}

/// Body of `POST /api/issues`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIssue {
    pub project_id: String,
    pub title: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

// ========================
// Render models
// ========================

/// A card on the board
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Column the card currently sits in
    pub column_id: String,
    pub parent: Option<ParentRef>,
}

/// A lane on the board
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub id: String,
    pub title: String,
    pub status_mappings: Vec<String>,
}

impl Column {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into(), status_mappings: Vec::new() }
    }

    /// Whether an issue with this status belongs in the lane
    pub fn accepts(&self, status: &str) -> bool {
        self.id == status || self.status_mappings.iter().any(|s| s == status)
    }
}

impl From<&ColumnConfig> for Column {
    fn from(config: &ColumnConfig) -> Self {
        Self {
            id: config.id.clone(),
            title: config.title.clone(),
            status_mappings: config.status_mappings.clone(),
        }
    }
}

impl From<&Column> for ColumnConfig {
    fn from(column: &Column) -> Self {
        Self {
            id: column.id.clone(),
            title: column.title.clone(),
            status_mappings: column.status_mappings.clone(),
        }
    }
}

/// Where a dragged card would land if released now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTarget {
    pub column_id: String,
    pub index: usize,
}

/// Columns and tasks ready for the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardData {
    pub columns: Vec<Column>,
    pub tasks: Vec<Task>,
}

impl BoardData {
    /// Issues arrive sorted by key; an issue no lane accepts is not rendered.
    pub fn from_board(payload: &BoardWithIssues) -> Self {
        let columns: Vec<Column> = payload.board.column_config.iter().map(Column::from).collect();
        let tasks = payload
            .issues
            .iter()
            .filter_map(|issue| {
                let column = columns.iter().find(|c| c.accepts(&issue.status))?;
                Some(Task {
                    id: issue.id.clone(),
                    title: issue.title.clone(),
                    description: issue.description.clone(),
                    column_id: column.id.clone(),
                    parent: issue.parent.clone(),
                })
            })
            .collect();
        Self { columns, tasks }
    }
}
