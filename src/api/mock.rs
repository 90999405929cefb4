//! In-memory [`BoardApi`] for tests

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::models::{Board, BoardWithIssues, ColumnConfig, Issue, IssueFilter, MoveIssue, NewIssue};
use super::{ApiError, BoardApi};

/// Board with the given lanes and cards, keys spaced 1000 apart
pub(crate) fn board_fixture(lanes: &[(&str, &[&str])]) -> BoardWithIssues {
    let column_config = lanes
        .iter()
        .map(|(id, _)| ColumnConfig { id: id.to_string(), title: id.to_string(), status_mappings: vec![] })
        .collect();
    let issues = lanes
        .iter()
        .flat_map(|(status, ids)| {
            ids.iter().enumerate().map(move |(i, id)| issue(id, status, i as f64 * 1000.0))
        })
        .collect();
    BoardWithIssues {
        board: Board {
            id: "b".to_string(),
            project_id: "p".to_string(),
            name: "Board".to_string(),
            column_config,
            filter: IssueFilter::default(),
        },
        issues,
    }
}

fn issue(id: &str, status: &str, sort_order: f64) -> Issue {
    Issue {
        id: id.to_string(),
        project_id: "p".to_string(),
        title: id.to_string(),
        description: None,
        status: status.to_string(),
        issue_type: "task".to_string(),
        parent_id: None,
        sort_order,
        parent: None,
    }
}

fn rejected(message: &str) -> ApiError {
    ApiError::Rejected { message: message.to_string(), code: "CONFLICT".to_string() }
}

pub(crate) struct MockApi {
    board: Mutex<BoardWithIssues>,
    calls: Mutex<Vec<String>>,
    move_board_ids: Mutex<Vec<Option<String>>>,
    failing_moves: Mutex<HashSet<String>>,
    reject_board_updates: Mutex<bool>,
    offline: Mutex<bool>,
}

impl MockApi {
    pub(crate) fn new(board: BoardWithIssues) -> Arc<Self> {
        Arc::new(Self {
            board: Mutex::new(board),
            calls: Mutex::new(Vec::new()),
            move_board_ids: Mutex::new(Vec::new()),
            failing_moves: Mutex::new(HashSet::new()),
            reject_board_updates: Mutex::new(false),
            offline: Mutex::new(false),
        })
    }

    /// Calls made so far, as readable strings
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Board id each move request carried, in call order
    pub(crate) fn move_board_ids(&self) -> Vec<Option<String>> {
        self.move_board_ids.lock().unwrap().clone()
    }

    pub(crate) fn fail_move_of(&self, issue_id: &str) {
        self.failing_moves.lock().unwrap().insert(issue_id.to_string());
    }

    pub(crate) fn reject_board_updates(&self) {
        *self.reject_board_updates.lock().unwrap() = true;
    }

    pub(crate) fn go_offline(&self) {
        *self.offline.lock().unwrap() = true;
    }

    pub(crate) fn replace_board(&self, board: BoardWithIssues) {
        *self.board.lock().unwrap() = board;
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        if *self.offline.lock().unwrap() {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl BoardApi for MockApi {
    async fn get_board(&self, board_id: &str, filters: &IssueFilter) -> Result<BoardWithIssues, ApiError> {
        self.record(format!("get_board {}", board_id))?;
        let mut board = self.board.lock().unwrap().clone();
        if board.board.id != board_id {
            return Err(ApiError::MissingBoard(board_id.to_string()));
        }
        if let Some(status) = &filters.status {
            board.issues.retain(|i| &i.status == status);
        }
        Ok(board)
    }

    async fn list_issues(&self, project_id: &str, filters: &IssueFilter) -> Result<Vec<Issue>, ApiError> {
        self.record(format!("list_issues {}", project_id))?;
        let board = self.board.lock().unwrap();
        Ok(board
            .issues
            .iter()
            .filter(|i| filters.status.as_ref().map_or(true, |s| &i.status == s))
            .filter(|i| filters.parent_id.is_none() || i.parent_id == filters.parent_id)
            .cloned()
            .collect())
    }

    async fn move_issue(&self, request: &MoveIssue) -> Result<Issue, ApiError> {
        self.record(format!(
            "move {} {} {} {}",
            request.issue_id,
            request.status,
            request.prev_issue_id.as_deref().unwrap_or("-"),
            request.next_issue_id.as_deref().unwrap_or("-"),
        ))?;
        self.move_board_ids.lock().unwrap().push(request.board_id.clone());
        if self.failing_moves.lock().unwrap().contains(&request.issue_id) {
            return Err(rejected("move rejected"));
        }
        Ok(issue(&request.issue_id, &request.status, 0.0))
    }

    async fn update_board(&self, board_id: &str, columns: &[ColumnConfig]) -> Result<Board, ApiError> {
        let ids: Vec<&str> = columns.iter().map(|c| c.id.as_str()).collect();
        self.record(format!("update_board {} {}", board_id, ids.join(",")))?;
        if *self.reject_board_updates.lock().unwrap() {
            return Err(rejected("board update rejected"));
        }
        let mut board = self.board.lock().unwrap();
        board.board.column_config = columns.to_vec();
        Ok(board.board.clone())
    }

    async fn create_issue(&self, new: &NewIssue) -> Result<Issue, ApiError> {
        self.record(format!("create {} {}", new.status, new.title))?;
        let created = issue(&format!("NEW-{}", new.title), &new.status, 0.0);
        self.board.lock().unwrap().issues.push(created.clone());
        Ok(created)
    }

    async fn delete_issue(&self, issue_id: &str) -> Result<(), ApiError> {
        self.record(format!("delete {}", issue_id))?;
        if self.failing_moves.lock().unwrap().contains(issue_id) {
            return Err(rejected("delete rejected"));
        }
        self.board.lock().unwrap().issues.retain(|i| i.id != issue_id);
        Ok(())
    }
}
