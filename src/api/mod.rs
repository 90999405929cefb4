//! Board API
//!
//! The client's view of the REST server. Components and the reconciler talk
//! to [`BoardApi`]; [`HttpApi`] is the fetch-backed implementation.

mod error;
mod http;
#[cfg(test)]
pub(crate) mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::models::{Board, BoardWithIssues, ColumnConfig, Issue, IssueFilter, MoveIssue, NewIssue};

pub use error::ApiError;
pub use http::HttpApi;

/// Operations the board needs from the server
#[async_trait(?Send)]
pub trait BoardApi {
    /// Board configuration plus its issues in column order
    async fn get_board(&self, board_id: &str, filters: &IssueFilter) -> Result<BoardWithIssues, ApiError>;

    async fn list_issues(&self, project_id: &str, filters: &IssueFilter) -> Result<Vec<Issue>, ApiError>;

    /// Neighbour-based move; the server picks the sort key
    async fn move_issue(&self, request: &MoveIssue) -> Result<Issue, ApiError>;

    /// Replace the board's whole column list
    async fn update_board(&self, board_id: &str, columns: &[ColumnConfig]) -> Result<Board, ApiError>;

    async fn create_issue(&self, issue: &NewIssue) -> Result<Issue, ApiError>;

    async fn delete_issue(&self, issue_id: &str) -> Result<(), ApiError>;
}

pub type SharedApi = Arc<dyn BoardApi + Send + Sync>;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    code: String,
}

/// `{ success: true, data } | { success: false, error: { message, code } }`
#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default)]
    error: Option<ErrorBody>,
}

/// Decode a response body, turning `success: false` into [`ApiError::Rejected`]
pub fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let envelope: Envelope = serde_json::from_str(body)?;
    if !envelope.success {
        let error = envelope.error.unwrap_or(ErrorBody {
            message: "request rejected".to_string(),
            code: "UNKNOWN".to_string(),
        });
        return Err(ApiError::Rejected { message: error.message, code: error.code });
    }
    Ok(serde_json::from_value(envelope.data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let issue: Issue = parse_envelope(
            r#"{"success":true,"data":{"id":"A","projectId":"p","title":"a","status":"todo","sortOrder":500.0}}"#,
        )
        .unwrap();
        assert_eq!(issue.sort_order, 500.0);
        assert_eq!(issue.issue_type, "task");

        parse_envelope::<()>(r#"{"success":true,"data":null}"#).unwrap();
    }

    #[test]
    fn test_rejected_envelope() {
        let err = parse_envelope::<Issue>(
            r#"{"success":false,"error":{"message":"issue X not found","code":"NOT_FOUND"}}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ApiError::Rejected { message: "issue X not found".to_string(), code: "NOT_FOUND".to_string() }
        );
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_malformed_bodies_are_decode_errors() {
        assert!(matches!(parse_envelope::<Issue>("<html>"), Err(ApiError::Decode(_))));
        assert!(matches!(
            parse_envelope::<Issue>(r#"{"success":true,"data":{"id":1}}"#),
            Err(ApiError::Decode(_))
        ));
        assert!(matches!(
            parse_envelope::<Issue>(r#"{"success":false}"#),
            Err(ApiError::Rejected { .. })
        ));
    }
}
