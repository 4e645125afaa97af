pub mod error;
pub mod routes;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tracing::info;

pub use routes::{router, AppState};

pub async fn serve(state: AppState, bind_addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {bind_addr}"))?;
    info!(addr = %bind_addr, "nutri gateway listening");

    axum::serve(listener, router(state))
        .await
        .context("HTTP server terminated unexpectedly")
}
