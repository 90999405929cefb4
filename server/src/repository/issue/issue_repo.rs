//! Issue Repository - Core CRUD Operations
//!
//! SQLite-backed implementation for Issue CRUD operations.
//! Moves live in issue_positioning.

use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::domain::{
    ordering, DomainError, DomainResult, Issue, IssueFilter, IssueType, NewIssue, ParentRef,
};
use super::super::db::{now_ms, SharedConnection};
use super::super::traits::Repository;

pub(crate) const ISSUE_COLUMNS: &str =
    "id, project_id, title, description, status, issue_type, parent_id, sort_order, created_at, updated_at";

/// SQLite implementation of Issue repository
#[derive(Clone)]
pub struct IssueRepository {
    pub(super) conn: SharedConnection,
}

impl IssueRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Create an issue at the end of its status column
    pub async fn create(&self, new: &NewIssue) -> DomainResult<Issue> {
        if new.title.trim().is_empty() {
            return Err(DomainError::InvalidInput("title must not be empty".to_string()));
        }
        if new.status.trim().is_empty() {
            return Err(DomainError::InvalidInput("status must not be empty".to_string()));
        }

        let conn = self.conn.lock().await;

        if let Some(parent_id) = &new.parent_id {
            if find_issue(&conn, parent_id)?.is_none() {
                return Err(DomainError::NotFound(format!("parent issue {}", parent_id)));
            }
        }

        let id = match &new.id {
            Some(id) => {
                if find_issue(&conn, id)?.is_some() {
                    return Err(DomainError::Conflict(format!("issue {} already exists", id)));
                }
                id.clone()
            }
            None => next_issue_id(&conn)?,
        };

        let last: Option<f64> = conn.query_row(
            "SELECT MAX(sort_order) FROM issues WHERE project_id = ? AND status = ?",
            params![new.project_id, new.status],
            |row| row.get(0),
        )?;
        let sort_order = ordering::allocate(last, None);
        let now = now_ms();

        conn.execute(
            "INSERT INTO issues (id, project_id, title, description, status, issue_type, parent_id, sort_order, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                new.project_id,
                new.title.trim(),
                new.description,
                new.status,
                new.issue_type.as_str(),
                new.parent_id,
                sort_order,
                now,
                now
            ],
        )?;
        tracing::debug!(%id, status = %new.status, sort_order, "issue created");

        let mut issue = find_issue(&conn, &id)?
            .ok_or_else(|| DomainError::NotFound(format!("issue {}", id)))?;
        attach_parents(&conn, std::slice::from_mut(&mut issue))?;
        Ok(issue)
    }

    /// List issues matching a filter, optionally within one project
    pub async fn list_filtered(
        &self,
        project_id: Option<&str>,
        filter: &IssueFilter,
    ) -> DomainResult<Vec<Issue>> {
        let mut clauses = Vec::new();
        let mut values: Vec<String> = Vec::new();
        if let Some(project_id) = project_id {
            clauses.push("project_id = ?");
            values.push(project_id.to_string());
        }
        if let Some(parent_id) = &filter.parent_id {
            clauses.push("parent_id = ?");
            values.push(parent_id.clone());
        }
        if let Some(status) = &filter.status {
            clauses.push("status = ?");
            values.push(status.clone());
        }

        let mut sql = format!("SELECT {} FROM issues", ISSUE_COLUMNS);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY status, sort_order, id");

        let conn = self.conn.lock().await;
        let mut issues = {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values.iter()), row_to_issue)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        attach_parents(&conn, &mut issues)?;
        Ok(issues)
    }
}

#[async_trait]
impl Repository<Issue> for IssueRepository {
    async fn find_by_id(&self, id: &String) -> DomainResult<Option<Issue>> {
        let conn = self.conn.lock().await;
        match find_issue(&conn, id)? {
            Some(mut issue) => {
                attach_parents(&conn, std::slice::from_mut(&mut issue))?;
                Ok(Some(issue))
            }
            None => Ok(None),
        }
    }

    async fn list(&self) -> DomainResult<Vec<Issue>> {
        self.list_filtered(None, &IssueFilter::default()).await
    }

    async fn delete(&self, id: &String) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        let affected = conn.execute("DELETE FROM issues WHERE id = ?", params![id])?;
        if affected == 0 {
            return Err(DomainError::NotFound(format!("issue {}", id)));
        }
        Ok(())
    }
}

// ========================
// Row helpers
// ========================

pub(crate) fn row_to_issue(row: &Row<'_>) -> rusqlite::Result<Issue> {
    let issue_type: String = row.get(5)?;
    Ok(Issue {
        id: row.get(0)?,
        project_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status: row.get(4)?,
        issue_type: IssueType::parse(&issue_type),
        parent_id: row.get(6)?,
        sort_order: row.get(7)?,
        parent: None,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

pub(crate) fn find_issue(conn: &Connection, id: &str) -> DomainResult<Option<Issue>> {
    let sql = format!("SELECT {} FROM issues WHERE id = ?", ISSUE_COLUMNS);
    Ok(conn.query_row(&sql, params![id], row_to_issue).optional()?)
}

/// Fill the denormalized parent hint for each issue that has a parent
pub(crate) fn attach_parents(conn: &Connection, issues: &mut [Issue]) -> DomainResult<()> {
    let mut stmt = conn.prepare_cached("SELECT id, title, issue_type FROM issues WHERE id = ?")?;
    for issue in issues.iter_mut() {
        let Some(parent_id) = issue.parent_id.as_deref() else {
            continue;
        };
        issue.parent = stmt
            .query_row(params![parent_id], |row| {
                let issue_type: String = row.get(2)?;
                Ok(ParentRef {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    issue_type: IssueType::parse(&issue_type),
                })
            })
            .optional()?;
    }
    Ok(())
}

fn next_issue_id(conn: &Connection) -> DomainResult<String> {
    let mut n: i64 = conn.query_row("SELECT COUNT(*) FROM issues", [], |row| row.get(0))?;
    loop {
        n += 1;
        let candidate = format!("ISS-{}", n);
        if find_issue(conn, &candidate)?.is_none() {
            return Ok(candidate);
        }
    }
}
