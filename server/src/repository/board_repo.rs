//! Board Repository
//!
//! Boards store their column list as JSON; the whole list is rewritten on every
//! change, which keeps reorder, rename, add and remove a single operation.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{
    Board, BoardWithIssues, ColumnConfig, DomainError, DomainResult, IssueFilter, NewBoard,
};
use super::db::{now_ms, SharedConnection};
use super::issue::{attach_parents, row_to_issue, ISSUE_COLUMNS};
use super::traits::Repository;

const BOARD_COLUMNS: &str = "id, project_id, name, column_config, filter, created_at, updated_at";

/// SQLite implementation of Board repository
#[derive(Clone)]
pub struct BoardRepository {
    conn: SharedConnection,
}

impl BoardRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new: &NewBoard) -> DomainResult<Board> {
        if new.name.trim().is_empty() {
            return Err(DomainError::InvalidInput("board name must not be empty".to_string()));
        }
        Board::validate_columns(&new.column_config)?;

        let conn = self.conn.lock().await;
        let id = match &new.id {
            Some(id) => id.clone(),
            None => {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM boards", [], |row| row.get(0))?;
                format!("board-{}", count + 1)
            }
        };
        if find_board(&conn, &id)?.is_some() {
            return Err(DomainError::Conflict(format!("board {} already exists", id)));
        }

        let now = now_ms();
        conn.execute(
            "INSERT INTO boards (id, project_id, name, column_config, filter, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                new.project_id,
                new.name.trim(),
                serde_json::to_string(&new.column_config)?,
                serde_json::to_string(&new.filter)?,
                now,
                now
            ],
        )?;

        find_board(&conn, &id)?.ok_or_else(|| DomainError::NotFound(format!("board {}", id)))
    }

    /// Replace the whole column list
    pub async fn update_columns(&self, id: &str, columns: &[ColumnConfig]) -> DomainResult<Board> {
        Board::validate_columns(columns)?;

        let conn = self.conn.lock().await;
        let affected = conn.execute(
            "UPDATE boards SET column_config = ?, updated_at = ? WHERE id = ?",
            params![serde_json::to_string(columns)?, now_ms(), id],
        )?;
        if affected == 0 {
            return Err(DomainError::NotFound(format!("board {}", id)));
        }
        tracing::debug!(board = %id, columns = columns.len(), "board columns replaced");

        find_board(&conn, id)?.ok_or_else(|| DomainError::NotFound(format!("board {}", id)))
    }

    /// Board plus its issues in column order, narrowed by an extra view filter
    pub async fn with_issues(&self, id: &str, view: &IssueFilter) -> DomainResult<BoardWithIssues> {
        let conn = self.conn.lock().await;
        let board = find_board(&conn, id)?
            .ok_or_else(|| DomainError::NotFound(format!("board {}", id)))?;

        let mut issues = {
            let sql = format!(
                "SELECT {} FROM issues WHERE project_id = ? ORDER BY sort_order, id",
                ISSUE_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![board.project_id], row_to_issue)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        issues.retain(|issue| board.shows(issue) && view.matches(issue));
        attach_parents(&conn, &mut issues)?;

        Ok(BoardWithIssues { board, issues })
    }
}

#[async_trait]
impl Repository<Board> for BoardRepository {
    async fn find_by_id(&self, id: &String) -> DomainResult<Option<Board>> {
        let conn = self.conn.lock().await;
        find_board(&conn, id)
    }

    async fn list(&self) -> DomainResult<Vec<Board>> {
        let conn = self.conn.lock().await;
        let sql = format!("SELECT {} FROM boards ORDER BY created_at, id", BOARD_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], row_to_board_raw)?;
        let mut boards = Vec::new();
        for raw in rows {
            boards.push(raw?.into_board()?);
        }
        Ok(boards)
    }

    async fn delete(&self, id: &String) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        let affected = conn.execute("DELETE FROM boards WHERE id = ?", params![id])?;
        if affected == 0 {
            return Err(DomainError::NotFound(format!("board {}", id)));
        }
        Ok(())
    }
}

/// Row with JSON columns not yet decoded
struct RawBoard {
    id: String,
    project_id: String,
    name: String,
    column_config: String,
    filter: String,
    created_at: Option<i64>,
    updated_at: Option<i64>,
}

impl RawBoard {
    fn into_board(self) -> DomainResult<Board> {
        Ok(Board {
            id: self.id,
            project_id: self.project_id,
            name: self.name,
            column_config: serde_json::from_str(&self.column_config)?,
            filter: serde_json::from_str(&self.filter)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn row_to_board_raw(row: &Row<'_>) -> rusqlite::Result<RawBoard> {
    Ok(RawBoard {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        column_config: row.get(3)?,
        filter: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn find_board(conn: &Connection, id: &str) -> DomainResult<Option<Board>> {
    let sql = format!("SELECT {} FROM boards WHERE id = ?", BOARD_COLUMNS);
    let raw = conn.query_row(&sql, params![id], row_to_board_raw).optional()?;
    raw.map(RawBoard::into_board).transpose()
}
