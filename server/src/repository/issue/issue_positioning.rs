//! Issue Positioning Operations
//!
//! Moves resolve the new sort key from the neighbour issues the client saw,
//! never from a client-computed number.

use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use crate::domain::ordering::{self, Allocation};
use crate::domain::{DomainError, DomainResult, Issue, Lane};
use super::super::db::now_ms;
use super::issue_repo::{attach_parents, find_issue};

/// Trait for issue positioning operations
#[async_trait]
pub trait IssuePositioningOperations: Send + Sync {
    /// Move an issue into a lane, between `prev_issue_id` and `next_issue_id`.
    /// Neighbours may carry any status the lane accepts.
    async fn move_issue_in_lane(
        &self,
        id: &str,
        lane: &Lane,
        prev_issue_id: Option<&str>,
        next_issue_id: Option<&str>,
    ) -> DomainResult<Issue>;

    /// Move into a lane made of `status` alone
    async fn move_issue(
        &self,
        id: &str,
        status: &str,
        prev_issue_id: Option<&str>,
        next_issue_id: Option<&str>,
    ) -> DomainResult<Issue> {
        self.move_issue_in_lane(id, &Lane::single(status), prev_issue_id, next_issue_id).await
    }

    /// Resequence a lane to evenly spaced keys, keeping its order
    async fn resequence_column(&self, project_id: &str, lane: &Lane) -> DomainResult<()>;
}

#[async_trait]
impl IssuePositioningOperations for super::issue_repo::IssueRepository {
    async fn move_issue_in_lane(
        &self,
        id: &str,
        lane: &Lane,
        prev_issue_id: Option<&str>,
        next_issue_id: Option<&str>,
    ) -> DomainResult<Issue> {
        let status = lane.status.as_str();
        if status.trim().is_empty() {
            return Err(DomainError::InvalidInput("status must not be empty".to_string()));
        }
        if prev_issue_id == Some(id) || next_issue_id == Some(id) {
            return Err(DomainError::InvalidInput(format!("issue {} cannot neighbour itself", id)));
        }

        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let issue = find_issue(&tx, id)?
            .ok_or_else(|| DomainError::NotFound(format!("issue {}", id)))?;

        let prev_key = match prev_issue_id {
            Some(prev) => Some(neighbour_key(&tx, prev, &issue.project_id, lane)?),
            None => None,
        };
        let next_key = match next_issue_id {
            Some(next) => Some(neighbour_key(&tx, next, &issue.project_id, lane)?),
            None => None,
        };

        let sort_order = match ordering::plan_insert(prev_key, next_key) {
            Allocation::Key(key) => key,
            Allocation::Rebalance => {
                tracing::info!(%id, %status, "sort gap exhausted, resequencing column");
                splice_and_resequence(&tx, &issue.project_id, lane, id, prev_issue_id, next_issue_id)?
            }
        };

        tx.execute(
            "UPDATE issues SET status = ?, sort_order = ?, updated_at = ? WHERE id = ?",
            params![status, sort_order, now_ms(), id],
        )?;
        tx.commit()?;

        tracing::debug!(%id, %status, sort_order, "issue moved");

        let mut moved = find_issue(&conn, id)?
            .ok_or_else(|| DomainError::NotFound(format!("issue {}", id)))?;
        attach_parents(&conn, std::slice::from_mut(&mut moved))?;
        Ok(moved)
    }

    async fn resequence_column(&self, project_id: &str, lane: &Lane) -> DomainResult<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let ids = column_ids(&tx, project_id, lane, None)?;
        write_keys(&tx, &ids)?;
        tx.commit()?;
        Ok(())
    }
}

/// Sort key of a neighbour, which must already sit in the destination lane
fn neighbour_key(conn: &Connection, id: &str, project_id: &str, lane: &Lane) -> DomainResult<f64> {
    let found: Option<(String, String, f64)> = conn
        .query_row(
            "SELECT project_id, status, sort_order FROM issues WHERE id = ?",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    match found {
        None => Err(DomainError::NotFound(format!("neighbour issue {}", id))),
        Some((p, s, _)) if p != project_id || !lane.accepts(&s) => Err(DomainError::Conflict(format!(
            "neighbour issue {} is not in column {}",
            id, lane.status
        ))),
        Some((_, _, key)) => Ok(key),
    }
}

/// Ids of a lane in display order, optionally leaving one issue out
fn column_ids(
    conn: &Connection,
    project_id: &str,
    lane: &Lane,
    exclude: Option<&str>,
) -> DomainResult<Vec<String>> {
    let placeholders = vec!["?"; lane.accepted.len()].join(", ");
    let sql = format!(
        "SELECT id FROM issues WHERE project_id = ? AND status IN ({}) ORDER BY sort_order, id",
        placeholders
    );
    let mut stmt = conn.prepare(&sql)?;
    let args = std::iter::once(project_id).chain(lane.accepted.iter().map(String::as_str));
    let ids = stmt
        .query_map(params_from_iter(args), |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ids.into_iter().filter(|id| Some(id.as_str()) != exclude).collect())
}

fn write_keys(conn: &Connection, ids: &[String]) -> DomainResult<()> {
    let keys = ordering::resequenced_keys(ids.len());
    let mut stmt = conn.prepare_cached("UPDATE issues SET sort_order = ? WHERE id = ?")?;
    for (id, key) in ids.iter().zip(keys) {
        stmt.execute(params![key, id])?;
    }
    Ok(())
}

/// Insert `moving` next to its neighbours and rewrite the whole lane's keys.
/// Returns the key assigned to `moving`.
fn splice_and_resequence(
    conn: &Connection,
    project_id: &str,
    lane: &Lane,
    moving: &str,
    prev_issue_id: Option<&str>,
    next_issue_id: Option<&str>,
) -> DomainResult<f64> {
    let mut ids = column_ids(conn, project_id, lane, Some(moving))?;

    let at = match (prev_issue_id, next_issue_id) {
        (Some(prev), _) => ids.iter().position(|id| id == prev).map(|i| i + 1),
        (None, Some(next)) => ids.iter().position(|id| id == next),
        (None, None) => None,
    }
    .unwrap_or(ids.len());

    ids.insert(at, moving.to_string());
    write_keys(conn, &ids)?;
    Ok(ordering::resequenced_keys(ids.len())[at])
}
