//! Issue Board Frontend Entry Point

mod api;
mod app;
mod components;
mod config;
mod context;
mod drag;
mod models;
mod query;
mod reconcile;
mod store;

use app::App;
use config::UiConfig;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();

    let (config, config_error) = match UiConfig::bundled() {
        Ok(config) => (config, None),
        Err(err) => (UiConfig::default(), Some(err)),
    };
    let logs = rolling_logger::init_logger(config.log_capacity, tracing::Level::DEBUG).ok();
    if let Some(err) = config_error {
        tracing::warn!(error = %err, "bad board.config.json, using defaults");
    }
    tracing::info!(board = %config.board_id, api = %config.api_base_url, "starting board");

    mount_to_body(move || view! { <App config=config logs=logs /> });
}
