//! Issue Board Server Entry Point

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use issue_board_server::config::ServerArgs;
use issue_board_server::repository::{open_database, open_in_memory, seed_demo};
use issue_board_server::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();

    let (ring, recent) = rolling_logger::layer(args.log_capacity);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(ring)
        .try_init()
        .context("failed to install tracing subscriber")?;

    let conn = if args.in_memory() {
        open_in_memory()?
    } else {
        open_database(&args.db)?
    };
    let state = AppState::new(conn, recent);
    if args.seed {
        seed_demo(&state.issues, &state.boards).await?;
    }

    let addr = args.socket_addr().context("invalid --host/--port")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, "issue board API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .context("server error")?;
    Ok(())
}
