//! Remote Query Cache
//!
//! Caches fetched board data per `(project, board, filters)` key and copies it
//! into the board store. The copy is gated on the store's dragged-task marker:
//! while a drag is live the store belongs to the drag, and fetched data waits.
//!
//! Every successful fetch gets a new version and a version is copied into the
//! store once. A drag that ends without new data arriving keeps its optimistic
//! order until the refetch triggered by invalidation lands.

use std::collections::HashMap;

use leptos::prelude::*;

use crate::api::{ApiError, BoardApi};
use crate::models::{BoardData, IssueFilter};
use crate::store::{store_set_columns, store_set_tasks, BoardStateStoreFields, BoardStore};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoardQueryKey {
    pub project_id: String,
    pub board_id: String,
    pub filters: IssueFilter,
}

impl BoardQueryKey {
    pub fn new(project_id: impl Into<String>, board_id: impl Into<String>, filters: IssueFilter) -> Self {
        Self { project_id: project_id.into(), board_id: board_id.into(), filters }
    }

    /// Whether the key belongs to this board, whatever its filters
    pub fn is_for(&self, project_id: &str, board_id: &str) -> bool {
        self.project_id == project_id && self.board_id == board_id
    }
}

/// What a board query currently holds
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryResult {
    pub is_loading: bool,
    pub data: Option<BoardData>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default)]
struct CacheEntry {
    result: QueryResult,
    fetched_at_ms: Option<i64>,
    invalidated: bool,
    /// Bumped on every successful fetch
    version: u64,
}

#[derive(Clone, Copy)]
pub struct QueryCache {
    entries: RwSignal<HashMap<BoardQueryKey, CacheEntry>>,
    /// Key and version last copied into the store
    applied: StoredValue<Option<(BoardQueryKey, u64)>>,
    /// Bumped by every invalidation; refetch effects subscribe to it
    pub invalidations: RwSignal<u64>,
    stale_time_ms: i64,
}

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl QueryCache {
    pub fn new(stale_time_ms: u64) -> Self {
        Self {
            entries: RwSignal::new(HashMap::new()),
            applied: StoredValue::new(None),
            invalidations: RwSignal::new(0),
            stale_time_ms: i64::try_from(stale_time_ms).unwrap_or(i64::MAX),
        }
    }

    /// Current state of a query (tracked)
    pub fn result(&self, key: &BoardQueryKey) -> QueryResult {
        self.entries.with(|entries| entries.get(key).map(|e| e.result.clone()).unwrap_or_default())
    }

    /// Missing, invalidated or stale, and not already loading
    pub fn needs_fetch(&self, key: &BoardQueryKey, now: i64) -> bool {
        self.entries.with_untracked(|entries| match entries.get(key) {
            None => true,
            Some(entry) if entry.result.is_loading => false,
            Some(entry) if entry.invalidated => true,
            Some(entry) => match entry.fetched_at_ms {
                None => true,
                Some(at) => now.saturating_sub(at) > self.stale_time_ms,
            },
        })
    }

    pub async fn fetch(&self, api: &dyn BoardApi, key: &BoardQueryKey) -> Result<(), ApiError> {
        self.begin(key);
        match api.get_board(&key.board_id, &key.filters).await {
            Ok(payload) => {
                let data = BoardData::from_board(&payload);
                tracing::debug!(board = %key.board_id, tasks = data.tasks.len(), "board fetched");
                self.record_success(key, data, now_ms());
                Ok(())
            }
            Err(err) => {
                tracing::warn!(board = %key.board_id, error = %err, "board fetch failed");
                self.record_failure(key, &err);
                Err(err)
            }
        }
    }

    fn begin(&self, key: &BoardQueryKey) {
        self.entries.update(|entries| {
            let entry = entries.entry(key.clone()).or_default();
            entry.result.is_loading = true;
            entry.invalidated = false;
        });
    }

    fn record_success(&self, key: &BoardQueryKey, data: BoardData, at: i64) {
        let mut invalidated_in_flight = false;
        self.entries.update(|entries| {
            let entry = entries.entry(key.clone()).or_default();
            entry.result = QueryResult { is_loading: false, data: Some(data), error: None };
            entry.fetched_at_ms = Some(at);
            entry.version += 1;
            invalidated_in_flight = entry.invalidated;
        });
        // The data may predate the invalidation; ask for another round
        if invalidated_in_flight {
            self.invalidations.update(|n| *n += 1);
        }
    }

    /// Previous data stays available next to the error
    fn record_failure(&self, key: &BoardQueryKey, err: &ApiError) {
        self.entries.update(|entries| {
            let entry = entries.entry(key.clone()).or_default();
            entry.result.is_loading = false;
            entry.result.error = Some(err.to_string());
        });
    }

    /// Mark every filter variant of a board for refetch. Returns how many
    /// cached queries were affected.
    pub fn invalidate(&self, project_id: &str, board_id: &str) -> usize {
        let mut count = 0;
        self.entries.update(|entries| {
            for (key, entry) in entries.iter_mut() {
                if key.is_for(project_id, board_id) {
                    entry.invalidated = true;
                    count += 1;
                }
            }
        });
        self.invalidations.update(|n| *n += 1);
        tracing::debug!(%board_id, count, "board queries invalidated");
        count
    }

    /// Copy fetched data into the store unless a drag is in progress or this
    /// version was already applied. Reads are tracked, so an effect calling
    /// this re-runs when the drag ends or new data arrives.
    pub fn sync_into_store(&self, store: &BoardStore, key: &BoardQueryKey) -> bool {
        if store.dragged_task().with(|dragged| dragged.is_some()) {
            return false;
        }
        let Some((version, data)) = self.entries.with(|entries| {
            entries
                .get(key)
                .and_then(|e| e.result.data.as_ref().map(|data| (e.version, data.clone())))
        }) else {
            return false;
        };

        let already_applied = self.applied.with_value(|applied| {
            applied.as_ref().is_some_and(|(k, v)| k == key && *v == version)
        });
        if already_applied {
            return false;
        }
        self.applied.set_value(Some((key.clone(), version)));

        // Columns then tasks, nothing read in between
        store_set_columns(store, data.columns);
        store_set_tasks(store, data.tasks);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{board_fixture, MockApi};
    use crate::models::Column;
    use crate::store::{store_set_dragged_task, store_snapshot, BoardState};
    use reactive_stores::Store;

    fn key(filters: IssueFilter) -> BoardQueryKey {
        BoardQueryKey::new("p", "b", filters)
    }

    fn setup() -> (Owner, BoardStore, QueryCache) {
        let owner = Owner::new();
        owner.set();
        (owner, Store::new(BoardState::new("p", "b")), QueryCache::new(1_000))
    }

    fn column_ids(store: &BoardStore) -> Vec<String> {
        store.columns().get_untracked().into_iter().map(|c| c.id).collect()
    }

    #[tokio::test]
    async fn test_fetch_then_sync() {
        let (_owner, store, cache) = setup();
        let api = MockApi::new(board_fixture(&[("todo", &["A", "B"]), ("done", &[])]));
        let k = key(IssueFilter::default());

        assert!(cache.needs_fetch(&k, now_ms()));
        cache.fetch(api.as_ref(), &k).await.unwrap();

        let result = cache.result(&k);
        assert!(!result.is_loading);
        assert_eq!(result.data.as_ref().map(|d| d.tasks.len()), Some(2));
        assert!(!cache.needs_fetch(&k, now_ms()));

        assert!(cache.sync_into_store(&store, &k));
        assert_eq!(column_ids(&store), vec!["todo", "done"]);
        // Same version is not applied twice
        assert!(!cache.sync_into_store(&store, &k));
    }

    #[tokio::test]
    async fn test_cache_update_mid_drag_does_not_touch_store() {
        let (_owner, store, cache) = setup();
        let api = MockApi::new(board_fixture(&[("todo", &["A", "B"]), ("done", &[])]));
        let k = key(IssueFilter::default());
        cache.fetch(api.as_ref(), &k).await.unwrap();
        cache.sync_into_store(&store, &k);

        store_set_dragged_task(&store, Some("A".to_string()));
        let during_drag = store_snapshot(&store);

        api.replace_board(board_fixture(&[("done", &["B", "A"]), ("todo", &[])]));
        cache.fetch(api.as_ref(), &k).await.unwrap();
        assert!(!cache.sync_into_store(&store, &k));
        assert_eq!(store_snapshot(&store), during_drag);

        store_set_dragged_task(&store, None);
        assert!(cache.sync_into_store(&store, &k));
        assert_eq!(column_ids(&store), vec!["done", "todo"]);
    }

    #[tokio::test]
    async fn test_drag_end_without_new_data_keeps_local_order() {
        let (_owner, store, cache) = setup();
        let api = MockApi::new(board_fixture(&[("todo", &["A"])]));
        let k = key(IssueFilter::default());
        cache.fetch(api.as_ref(), &k).await.unwrap();
        cache.sync_into_store(&store, &k);

        store_set_dragged_task(&store, Some("todo".to_string()));
        store.columns().set(vec![Column::new("todo", "Renamed locally")]);
        store_set_dragged_task(&store, None);

        assert!(!cache.sync_into_store(&store, &k));
        assert_eq!(store.columns().get_untracked()[0].title, "Renamed locally");
    }

    #[tokio::test]
    async fn test_invalidate_matches_every_filter_variant() {
        let (_owner, _store, cache) = setup();
        let api = MockApi::new(board_fixture(&[("todo", &["A"])]));
        let plain = key(IssueFilter::default());
        let narrowed = key(IssueFilter { parent_id: None, status: Some("todo".to_string()) });
        cache.fetch(api.as_ref(), &plain).await.unwrap();
        cache.fetch(api.as_ref(), &narrowed).await.unwrap();

        let other = BoardQueryKey::new("p", "other", IssueFilter::default());
        assert!(cache.fetch(api.as_ref(), &other).await.is_err());

        let before = cache.invalidations.get_untracked();
        assert_eq!(cache.invalidate("p", "b"), 2);
        assert_eq!(cache.invalidations.get_untracked(), before + 1);
        assert!(cache.needs_fetch(&plain, now_ms()));
        assert!(cache.needs_fetch(&narrowed, now_ms()));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_data() {
        let (_owner, _store, cache) = setup();
        let api = MockApi::new(board_fixture(&[("todo", &["A"])]));
        let k = key(IssueFilter::default());
        cache.fetch(api.as_ref(), &k).await.unwrap();

        api.go_offline();
        let err = cache.fetch(api.as_ref(), &k).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));

        let result = cache.result(&k);
        assert!(result.error.is_some());
        assert!(result.data.is_some());
    }

    #[test]
    fn test_staleness_and_in_flight_invalidation() {
        let (_owner, _store, cache) = setup();
        let k = key(IssueFilter::default());

        cache.begin(&k);
        assert!(!cache.needs_fetch(&k, 0), "a loading query is not fetched twice");

        cache.invalidate("p", "b");
        let bumps = cache.invalidations.get_untracked();
        cache.record_success(&k, BoardData::default(), 10_000);
        assert_eq!(cache.invalidations.get_untracked(), bumps + 1);
        assert!(cache.needs_fetch(&k, 10_000));

        cache.begin(&k);
        cache.record_success(&k, BoardData::default(), 10_000);
        assert!(!cache.needs_fetch(&k, 10_500));
        assert!(cache.needs_fetch(&k, 11_001));
    }
}
