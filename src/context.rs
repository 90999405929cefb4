//! Board Context
//!
//! Everything a board view shares, provided via Leptos Context API.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::api::SharedApi;
use crate::config::UiConfig;
use crate::drag::DragController;
use crate::models::IssueFilter;
use crate::query::{BoardQueryKey, QueryCache};
use crate::reconcile::Reconciler;
use crate::store::{BoardState, BoardStateStoreFields, BoardStore};

#[derive(Clone)]
pub struct BoardContext {
    pub store: BoardStore,
    pub cache: QueryCache,
    pub controller: DragController,
    pub reconciler: Reconciler,
    /// View filter, part of the query key
    pub filters: RwSignal<IssueFilter>,
}

impl BoardContext {
    pub fn new(config: &UiConfig, api: SharedApi) -> Self {
        let store = Store::new(BoardState::new(config.project_id.clone(), config.board_id.clone()));
        let cache = QueryCache::new(config.stale_time_ms);
        Self {
            store,
            cache,
            controller: DragController::new(store),
            reconciler: Reconciler::new(api, store, cache),
            filters: RwSignal::new(IssueFilter::default()),
        }
    }

    /// Key of the query the board shows (tracks the filter)
    pub fn query_key(&self) -> BoardQueryKey {
        BoardQueryKey::new(
            self.store.project_id().get_untracked(),
            self.store.board_id().get_untracked(),
            self.filters.get(),
        )
    }

    /// Force a refetch of every view of this board
    pub fn refresh(&self) {
        self.cache.invalidate(
            &self.store.project_id().get_untracked(),
            &self.store.board_id().get_untracked(),
        );
    }
}

/// Get the board context
pub fn use_board_context() -> BoardContext {
    expect_context::<BoardContext>()
}
