//! Board View Component
//!
//! Lanes and cards with pointer drag-and-drop. Fetched data reaches the store
//! through the query cache's gated sync; drops go to the reconciler.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::ColumnLane;
use crate::context::use_board_context;
use crate::query::now_ms;
use crate::reconcile::settle;
use crate::store::BoardStateStoreFields;

use leptos_dragdrop::*;

#[component]
pub fn BoardView() -> impl IntoView {
    let ctx = use_board_context();
    let store = ctx.store;

    // Create DnD signals
    let dnd = create_dnd_signals();

    // Fetch on mount, on filter change and after every invalidation
    {
        let ctx = ctx.clone();
        Effect::new(move |_| {
            let _ = ctx.cache.invalidations.get();
            let key = ctx.query_key();
            if !ctx.cache.needs_fetch(&key, now_ms()) {
                return;
            }
            let cache = ctx.cache;
            let api = ctx.reconciler.api().clone();
            // Failures land in the cache entry and the log
            spawn_local(async move {
                cache.fetch(api.as_ref(), &key).await.ok();
            });
        });
    }

    // Copy fetched data in whenever no drag is live
    {
        let ctx = ctx.clone();
        Effect::new(move |_| {
            let key = ctx.query_key();
            ctx.cache.sync_into_store(&ctx.store, &key);
        });
    }

    // Every gesture event goes through the controller; releases commit
    {
        let ctx = ctx.clone();
        bind_global_listeners(dnd, move |event| {
            if let Some(commit) = ctx.controller.handle(event) {
                let reconciler = ctx.reconciler.clone();
                settle(async move { reconciler.commit(commit).await });
            }
        });
    }

    let status = {
        let ctx = ctx.clone();
        move || {
            let result = ctx.cache.result(&ctx.query_key());
            if let Some(err) = result.error {
                Some(format!("Could not load board: {}", err))
            } else if result.is_loading && result.data.is_none() {
                Some("Loading board...".to_string())
            } else {
                None
            }
        }
    };

    view! {
        <div class="board">
            {move || status().map(|text| view! { <p class="board-status">{text}</p> })}
            <div class="board-columns">
                <For
                    each=move || store.columns().get()
                    key=|column| (column.id.clone(), column.title.clone())
                    children=move |column| view! { <ColumnLane column=column dnd=dnd /> }
                />
            </div>
        </div>
    }
}
