//! Demo data for a fresh database

use crate::domain::{ColumnConfig, DomainResult, IssueFilter, IssueType, NewBoard, NewIssue};
use super::traits::Repository;
use super::{BoardRepository, IssueRepository};

pub const DEMO_PROJECT: &str = "demo";
pub const DEMO_BOARD: &str = "demo-board";

/// Create the demo board and a handful of issues unless the board exists
pub async fn seed_demo(issues: &IssueRepository, boards: &BoardRepository) -> DomainResult<()> {
    if boards.find_by_id(&DEMO_BOARD.to_string()).await?.is_some() {
        return Ok(());
    }

    let column = |id: &str, title: &str| ColumnConfig {
        id: id.to_string(),
        title: title.to_string(),
        status_mappings: Vec::new(),
    };
    boards
        .create(&NewBoard {
            id: Some(DEMO_BOARD.to_string()),
            project_id: DEMO_PROJECT.to_string(),
            name: "Demo".to_string(),
            column_config: vec![
                column("backlog", "Backlog"),
                column("in-progress", "In Progress"),
                column("done", "Done"),
            ],
            filter: IssueFilter::default(),
        })
        .await?;

    let epic = issues
        .create(&NewIssue {
            project_id: DEMO_PROJECT.to_string(),
            title: "Board drag and drop".to_string(),
            status: "in-progress".to_string(),
            issue_type: IssueType::Epic,
            ..Default::default()
        })
        .await?;

    let tasks = [
        ("Allocate fractional keys", "done"),
        ("Persist column order", "in-progress"),
        ("Roll back failed moves", "backlog"),
        ("Keyboard cancel", "backlog"),
    ];
    for (title, status) in tasks {
        issues
            .create(&NewIssue {
                project_id: DEMO_PROJECT.to_string(),
                title: title.to_string(),
                status: status.to_string(),
                parent_id: Some(epic.id.clone()),
                ..Default::default()
            })
            .await?;
    }

    tracing::info!(board = DEMO_BOARD, "seeded demo board");
    Ok(())
}
