//! HTTP implementation of [`BoardApi`]

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{Board, BoardWithIssues, ColumnConfig, Issue, IssueFilter, MoveIssue, NewIssue};
use super::{parse_envelope, ApiError, BoardApi};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBoardArgs<'a> {
    column_config: &'a [ColumnConfig],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListIssuesArgs<'a> {
    project_id: &'a str,
    #[serde(flatten)]
    filters: &'a IssueFilter,
}

/// Talks to the board server over fetch
#[derive(Clone, Debug)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client: reqwest::Client::new(), base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// Error statuses still carry an envelope, so the body decides the outcome
    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "api response");
        parse_envelope(&body)
    }
}

#[async_trait(?Send)]
impl BoardApi for HttpApi {
    async fn get_board(&self, board_id: &str, filters: &IssueFilter) -> Result<BoardWithIssues, ApiError> {
        let request = self.client.get(self.url(&format!("boards/{}", board_id))).query(filters);
        match self.send(request).await {
            Err(ApiError::Rejected { code, .. }) if code == "NOT_FOUND" => {
                Err(ApiError::MissingBoard(board_id.to_string()))
            }
            other => other,
        }
    }

    async fn list_issues(&self, project_id: &str, filters: &IssueFilter) -> Result<Vec<Issue>, ApiError> {
        let args = ListIssuesArgs { project_id, filters };
        self.send(self.client.get(self.url("issues")).query(&args)).await
    }

    async fn move_issue(&self, request: &MoveIssue) -> Result<Issue, ApiError> {
        let url = self.url(&format!("issues/{}/move", request.issue_id));
        self.send(self.client.post(url).json(request)).await
    }

    async fn update_board(&self, board_id: &str, columns: &[ColumnConfig]) -> Result<Board, ApiError> {
        let url = self.url(&format!("boards/{}", board_id));
        self.send(self.client.put(url).json(&UpdateBoardArgs { column_config: columns })).await
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<Issue, ApiError> {
        self.send(self.client.post(self.url("issues")).json(issue)).await
    }

    async fn delete_issue(&self, issue_id: &str) -> Result<(), ApiError> {
        self.send(self.client.delete(self.url(&format!("issues/{}", issue_id)))).await
    }
}
