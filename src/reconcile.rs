//! Persistence Reconciler
//!
//! Sends optimistic board changes to the server. Success invalidates the
//! board's cached queries so the next fetch confirms exact positions; failure
//! puts the store back as it was and raises a notice.

use std::future::Future;

use futures::future::join_all;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{ApiError, SharedApi};
use crate::drag::GestureCommit;
use crate::models::{Board, Column, ColumnConfig, Issue, MoveIssue, NewIssue, Task};
use crate::query::QueryCache;
use crate::store::{
    relocate_task, store_remove_column, store_remove_task, store_restore, store_set_columns,
    store_set_tasks, store_snapshot, BoardStateStoreFields, BoardStore,
};

/// Run a reconciler call from an event handler. The call has already logged
/// any failure and raised the notice, so only the outcome is dropped here.
pub fn settle<T: 'static>(call: impl Future<Output = Result<T, ApiError>> + 'static) {
    spawn_local(async move {
        call.await.ok();
    });
}

#[derive(Clone)]
pub struct Reconciler {
    api: SharedApi,
    store: BoardStore,
    cache: QueryCache,
    /// Last failure worth showing to the user
    pub notice: RwSignal<Option<String>>,
}

impl Reconciler {
    pub fn new(api: SharedApi, store: BoardStore, cache: QueryCache) -> Self {
        Self { api, store, cache, notice: RwSignal::new(None) }
    }

    pub fn api(&self) -> &SharedApi {
        &self.api
    }

    pub fn dismiss_notice(&self) {
        self.notice.set(None);
    }

    fn project_id(&self) -> String {
        self.store.project_id().get_untracked()
    }

    fn board_id(&self) -> String {
        self.store.board_id().get_untracked()
    }

    fn invalidate_board(&self) {
        self.cache.invalidate(&self.project_id(), &self.board_id());
    }

    fn report(&self, action: &str, err: &ApiError) {
        tracing::error!(action, code = err.code(), error = %err, "mutation failed, board rolled back");
        self.notice.set(Some(format!("Could not {}: {}", action, err)));
    }

    /// Place one task between two neighbours and persist it
    pub async fn move_task(
        &self,
        task_id: &str,
        status: &str,
        prev_issue_id: Option<&str>,
        next_issue_id: Option<&str>,
    ) -> Result<Issue, ApiError> {
        let snapshot = self.store.tasks().get_untracked();
        match relocate_task(&snapshot, task_id, status, prev_issue_id, next_issue_id) {
            Some(tasks) => store_set_tasks(&self.store, tasks),
            None => tracing::warn!(task = %task_id, "move refers to cards not on the board"),
        }

        let request = MoveIssue {
            issue_id: task_id.to_string(),
            board_id: Some(self.board_id()),
            status: status.to_string(),
            prev_issue_id: prev_issue_id.map(str::to_string),
            next_issue_id: next_issue_id.map(str::to_string),
        };
        let result = self.api.move_issue(&request).await;
        match &result {
            Ok(issue) => {
                tracing::debug!(task = %issue.id, sort_order = issue.sort_order, "task moved");
                self.invalidate_board();
            }
            Err(err) => {
                store_set_tasks(&self.store, snapshot);
                self.report("move the task", err);
            }
        }
        result
    }

    /// Replace the column list, optimistically
    pub async fn update_columns(&self, columns: Vec<Column>) -> Result<Board, ApiError> {
        let previous = self.store.columns().get_untracked();
        let configs: Vec<ColumnConfig> = columns.iter().map(ColumnConfig::from).collect();
        store_set_columns(&self.store, columns);

        let result = self.api.update_board(&self.board_id(), &configs).await;
        match &result {
            Ok(_) => self.invalidate_board(),
            Err(err) => {
                store_set_columns(&self.store, previous);
                self.report("update the columns", err);
            }
        }
        result
    }

    pub async fn add_column(&self, title: &str) -> Result<Board, ApiError> {
        let mut columns = self.store.columns().get_untracked();
        let id = unique_column_id(&columns, title);
        columns.push(Column::new(id, title.trim()));
        self.update_columns(columns).await
    }

    pub async fn rename_column(&self, column_id: &str, title: &str) -> Result<Board, ApiError> {
        let mut columns = self.store.columns().get_untracked();
        if let Some(column) = columns.iter_mut().find(|c| c.id == column_id) {
            column.title = title.trim().to_string();
        }
        self.update_columns(columns).await
    }

    /// Drop a lane and its cards from the board
    pub async fn remove_column(&self, column_id: &str) -> Result<Board, ApiError> {
        let snapshot = store_snapshot(&self.store);
        store_remove_column(&self.store, column_id);
        let configs: Vec<ColumnConfig> =
            self.store.columns().with_untracked(|cols| cols.iter().map(ColumnConfig::from).collect());

        let result = self.api.update_board(&self.board_id(), &configs).await;
        match &result {
            Ok(_) => self.invalidate_board(),
            Err(err) => {
                store_restore(&self.store, snapshot);
                self.report("remove the column", err);
            }
        }
        result
    }

    /// Persist one drag gesture. All requests go out together; if any fails
    /// the whole gesture is undone. The board is invalidated either way.
    pub async fn commit(&self, commit: GestureCommit) -> Result<(), ApiError> {
        let GestureCommit { moves, column_reorder, snapshot } = commit;
        let board_id = self.board_id();
        let requests: Vec<MoveIssue> = moves.iter().map(|m| m.to_request(&board_id)).collect();
        let configs: Option<Vec<ColumnConfig>> =
            column_reorder.map(|columns| columns.iter().map(ColumnConfig::from).collect());

        let task_calls = join_all(requests.iter().map(|request| self.api.move_issue(request)));
        let column_call = async {
            match &configs {
                Some(configs) => Some(self.api.update_board(&board_id, configs).await),
                None => None,
            }
        };
        let (task_results, column_result) = futures::join!(task_calls, column_call);

        let first_error = task_results
            .into_iter()
            .find_map(Result::err)
            .or_else(|| column_result.and_then(Result::err));

        let outcome = match first_error {
            Some(err) => {
                store_restore(&self.store, snapshot);
                self.report("save the board", &err);
                Err(err)
            }
            None => {
                tracing::debug!(moves = requests.len(), reorder = configs.is_some(), "gesture saved");
                Ok(())
            }
        };
        self.invalidate_board();
        outcome
    }

    /// Create an issue at the bottom of a column
    pub async fn create_task(&self, column_id: &str, title: &str) -> Result<Issue, ApiError> {
        let new = NewIssue {
            project_id: self.project_id(),
            title: title.trim().to_string(),
            status: column_id.to_string(),
            parent_id: None,
        };
        match self.api.create_issue(&new).await {
            Ok(issue) => {
                let mut tasks = self.store.tasks().get_untracked();
                tasks.push(Task {
                    id: issue.id.clone(),
                    title: issue.title.clone(),
                    description: issue.description.clone(),
                    column_id: column_id.to_string(),
                    parent: issue.parent.clone(),
                });
                store_set_tasks(&self.store, tasks);
                self.invalidate_board();
                Ok(issue)
            }
            Err(err) => {
                self.report("create the task", &err);
                Err(err)
            }
        }
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<(), ApiError> {
        let snapshot = self.store.tasks().get_untracked();
        store_remove_task(&self.store, task_id);

        let result = self.api.delete_issue(task_id).await;
        match &result {
            Ok(()) => self.invalidate_board(),
            Err(err) => {
                store_set_tasks(&self.store, snapshot);
                self.report("delete the task", err);
            }
        }
        result
    }
}

/// Lower-case dashed id from a title, suffixed until unused
fn unique_column_id(columns: &[Column], title: &str) -> String {
    let base: String = title
        .trim()
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    let base = if base.is_empty() { "column".to_string() } else { base };

    let taken = |id: &str| columns.iter().any(|c| c.id == id);
    if !taken(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|id| !taken(id))
        .unwrap_or(base)
}
