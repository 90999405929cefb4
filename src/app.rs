//! Issue Board Frontend App
//!
//! Wires the API client, board context and log ring into the view tree.

use std::sync::Arc;

use leptos::prelude::*;
use rolling_logger::LogBuffer;

use crate::api::{HttpApi, SharedApi};
use crate::components::{BoardView, FilterBar, LogPanel, NoticeToast};
use crate::config::UiConfig;
use crate::context::BoardContext;

#[component]
pub fn App(config: UiConfig, logs: Option<LogBuffer>) -> impl IntoView {
    let api: SharedApi = Arc::new(HttpApi::new(config.api_base_url.clone()));
    let ctx = BoardContext::new(&config, api);

    // Provide context to all children
    provide_context(ctx.store);
    provide_context(ctx);
    if let Some(logs) = logs {
        provide_context(logs);
    }

    view! {
        <div class="app-layout">
            <main class="main-content">
                <h1>"Issue Board"</h1>
                <FilterBar />
                <BoardView />
                <LogPanel />
            </main>
            <NoticeToast />
        </div>
    }
}
