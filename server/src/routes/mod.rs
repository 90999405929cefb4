//! HTTP Routes
//!
//! Thin axum handlers over the repositories. Every response uses the
//! `{ success, data }` / `{ success, error: { message, code } }` envelope.

mod boards;
mod issues;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use rolling_logger::{LogBuffer, LogRecord};

use crate::domain::DomainError;
use crate::repository::{BoardRepository, IssueRepository, SharedConnection};

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub issues: IssueRepository,
    pub boards: BoardRepository,
    /// Recent log records captured by the rolling layer
    pub logs: LogBuffer,
}

impl AppState {
    pub fn new(conn: SharedConnection, logs: LogBuffer) -> Self {
        Self {
            issues: IssueRepository::new(conn.clone()),
            boards: BoardRepository::new(conn),
            logs,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    code: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Envelope<T> {
    Ok { success: bool, data: T },
    Err { success: bool, error: ErrorBody },
}

/// Handler result rendered through the envelope
pub struct ApiResponse<T>(Result<T, DomainError>);

impl<T> From<Result<T, DomainError>> for ApiResponse<T> {
    fn from(result: Result<T, DomainError>) -> Self {
        ApiResponse(result)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self.0 {
            Ok(data) => (StatusCode::OK, Json(Envelope::Ok { success: true, data })).into_response(),
            Err(err) => {
                let status = match &err {
                    DomainError::NotFound(_) => StatusCode::NOT_FOUND,
                    DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    DomainError::Conflict(_) => StatusCode::CONFLICT,
                    DomainError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    tracing::error!(error = %err, "request failed");
                } else {
                    tracing::warn!(error = %err, "request rejected");
                }
                let body: Envelope<()> = Envelope::Err {
                    success: false,
                    error: ErrorBody { message: err.to_string(), code: err.code() },
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

pub(crate) fn json_rejection(rejection: JsonRejection) -> DomainError {
    DomainError::InvalidInput(rejection.body_text())
}

pub(crate) fn query_rejection(rejection: QueryRejection) -> DomainError {
    DomainError::InvalidInput(rejection.body_text())
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

async fn health() -> ApiResponse<Health> {
    ApiResponse(Ok(Health { status: "ok", version: env!("CARGO_PKG_VERSION") }))
}

async fn recent_logs(State(state): State<AppState>) -> ApiResponse<Vec<LogRecord>> {
    ApiResponse(Ok(state.logs.records()))
}

/// Build the router with all routes.
pub fn router(state: AppState) -> Router {
    // The UI is served from a different origin during development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/logs", get(recent_logs))
        .route("/api/boards", post(boards::create_board))
        .route("/api/boards/{board_id}", get(boards::get_board).put(boards::update_board))
        .route("/api/issues", get(issues::list_issues).post(issues::create_issue))
        .route("/api/issues/{issue_id}", axum::routing::delete(issues::delete_issue))
        .route("/api/issues/{issue_id}/move", post(issues::move_issue))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::repository::{open_in_memory, seed_demo};

    async fn app() -> Router {
        let state = AppState::new(open_in_memory().unwrap(), LogBuffer::new(16));
        seed_demo(&state.issues, &state.boards).await.unwrap();
        router(state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_fetch_board_envelope() {
        let app = app().await;
        let (status, body) = send(&app, "GET", "/api/boards/demo-board", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["columnConfig"].as_array().unwrap().len(), 3);
        assert_eq!(body["data"]["issues"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_missing_board_is_rejected() {
        let app = app().await;
        let (status, body) = send(&app, "GET", "/api/boards/nope", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_move_issue_to_empty_column() {
        let app = app().await;
        let (_, created) = send(
            &app,
            "POST",
            "/api/issues",
            Some(json!({ "projectId": "demo", "title": "New", "status": "backlog" })),
        )
        .await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        // Nothing else is in "review", so this issue gets the origin key.
        let (status, moved) = send(
            &app,
            "POST",
            &format!("/api/issues/{}/move", id),
            Some(json!({ "status": "review", "prevIssueId": null, "nextIssueId": null })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(moved["data"]["status"], "review");
        assert_eq!(moved["data"]["sortOrder"], 0.0);
    }

    #[tokio::test]
    async fn test_recent_logs_endpoint() {
        let app = app().await;
        let (status, body) = send(&app, "GET", "/api/logs", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].is_array());
    }

    #[tokio::test]
    async fn test_malformed_body_uses_envelope() {
        let app = app().await;
        let (status, body) = send(
            &app,
            "PUT",
            "/api/boards/demo-board",
            Some(json!({ "columns": [] })),
        )
        .await;
        assert!(status.is_client_error());
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_update_board_reorders_columns() {
        let app = app().await;
        let (status, body) = send(
            &app,
            "PUT",
            "/api/boards/demo-board",
            Some(json!({ "columnConfig": [
                { "id": "done", "title": "Done" },
                { "id": "backlog", "title": "Backlog" }
            ] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["columnConfig"][0]["id"], "done");
    }

    #[tokio::test]
    async fn test_move_next_to_mapped_status_needs_board_lane() {
        let app = app().await;
        let (status, _) = send(
            &app,
            "PUT",
            "/api/boards/demo-board",
            Some(json!({ "columnConfig": [
                { "id": "backlog", "title": "Backlog", "statusMappings": ["open"] },
                { "id": "done", "title": "Done" }
            ] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let mut ids = Vec::new();
        for issue_status in ["open", "done"] {
            let (_, created) = send(
                &app,
                "POST",
                "/api/issues",
                Some(json!({ "projectId": "demo", "title": issue_status, "status": issue_status })),
            )
            .await;
            ids.push(created["data"]["id"].as_str().unwrap().to_string());
        }
        let uri = format!("/api/issues/{}/move", ids[1]);

        let (_, refused) = send(
            &app,
            "POST",
            &uri,
            Some(json!({ "status": "backlog", "prevIssueId": ids[0], "nextIssueId": null })),
        )
        .await;
        assert_eq!(refused["error"]["code"], "CONFLICT");

        let (status, moved) = send(
            &app,
            "POST",
            &uri,
            Some(json!({
                "status": "backlog",
                "boardId": "demo-board",
                "prevIssueId": ids[0],
                "nextIssueId": null
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(moved["data"]["status"], "backlog");
    }
}
