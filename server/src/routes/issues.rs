//! Issue handlers

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::domain::{DomainError, Issue, IssueFilter, Lane, NewIssue};
use crate::repository::{IssuePositioningOperations, Repository};
use super::{json_rejection, query_rejection, ApiResponse, AppState};

/// Neighbour-based move: the server turns neighbours into a sort key.
/// With a board id the status names one of its lanes, and neighbours may
/// carry any status that lane maps.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveIssueRequest {
    pub status: String,
    #[serde(default)]
    pub board_id: Option<String>,
    #[serde(default)]
    pub prev_issue_id: Option<String>,
    #[serde(default)]
    pub next_issue_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListIssuesQuery {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(flatten)]
    pub filter: IssueFilter,
}

pub async fn list_issues(
    State(state): State<AppState>,
    query: Result<Query<ListIssuesQuery>, QueryRejection>,
) -> ApiResponse<Vec<Issue>> {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return ApiResponse::from(Err(query_rejection(rejection))),
    };
    state
        .issues
        .list_filtered(query.project_id.as_deref(), &query.filter)
        .await
        .into()
}

pub async fn create_issue(
    State(state): State<AppState>,
    body: Result<Json<NewIssue>, JsonRejection>,
) -> ApiResponse<Issue> {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return ApiResponse::from(Err(json_rejection(rejection))),
    };
    state.issues.create(&body).await.into()
}

pub async fn move_issue(
    State(state): State<AppState>,
    Path(issue_id): Path<String>,
    body: Result<Json<MoveIssueRequest>, JsonRejection>,
) -> ApiResponse<Issue> {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return ApiResponse::from(Err(json_rejection(rejection))),
    };
    let lane = match &body.board_id {
        Some(board_id) => match state.boards.find_by_id(board_id).await {
            Ok(Some(board)) => board.lane_for(&body.status),
            Ok(None) => return ApiResponse::from(Err(DomainError::NotFound(format!("board {}", board_id)))),
            Err(err) => return ApiResponse::from(Err(err)),
        },
        None => Lane::single(body.status.as_str()),
    };
    state
        .issues
        .move_issue_in_lane(
            &issue_id,
            &lane,
            body.prev_issue_id.as_deref(),
            body.next_issue_id.as_deref(),
        )
        .await
        .into()
}

pub async fn delete_issue(
    State(state): State<AppState>,
    Path(issue_id): Path<String>,
) -> ApiResponse<()> {
    state.issues.delete(&issue_id).await.into()
}
