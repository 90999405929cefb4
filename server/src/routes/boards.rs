//! Board handlers

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::domain::{Board, BoardWithIssues, ColumnConfig, IssueFilter, NewBoard};
use super::{json_rejection, query_rejection, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardRequest {
    pub column_config: Vec<ColumnConfig>,
}

/// Board with its issues; query parameters narrow the board's own filter
pub async fn get_board(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    view: Result<Query<IssueFilter>, QueryRejection>,
) -> ApiResponse<BoardWithIssues> {
    let view = match view {
        Ok(Query(view)) => view,
        Err(rejection) => return ApiResponse::from(Err(query_rejection(rejection))),
    };
    state.boards.with_issues(&board_id, &view).await.into()
}

/// Full column-list replace, used for reorder as well as add/rename/remove
pub async fn update_board(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    body: Result<Json<UpdateBoardRequest>, JsonRejection>,
) -> ApiResponse<Board> {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return ApiResponse::from(Err(json_rejection(rejection))),
    };
    state.boards.update_columns(&board_id, &body.column_config).await.into()
}

pub async fn create_board(
    State(state): State<AppState>,
    body: Result<Json<NewBoard>, JsonRejection>,
) -> ApiResponse<Board> {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return ApiResponse::from(Err(json_rejection(rejection))),
    };
    state.boards.create(&body).await.into()
}
