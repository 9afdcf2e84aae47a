//! fraudscope-server: serves the fraud trends dashboard.
//!
//! Usage:
//!   DATA_FILE=deliveries.csv PORT=8050 fraudscope-server
//!   RUST_LOG=debug fraudscope-server
//!
//! The dataset is loaded and aggregated once before the listener binds.

mod assets;
mod charts;
mod render;
mod routes;

use anyhow::{Context, Result};
use fraudscope_core::{config::DashboardConfig, pipeline::Dashboard};
use std::path::PathBuf;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let base_dir = exe_dir();
    let config = DashboardConfig::from_env(&base_dir).context("reading configuration")?;

    let dashboard = Dashboard::build(&config)
        .with_context(|| format!("building dashboard from {}", config.data_file.display()))?;
    if dashboard.aggregates.label_inconsistencies > 0 {
        log::warn!(
            "{} deliveries are marked fraudulent without a chargeback",
            dashboard.aggregates.label_inconsistencies
        );
    }

    let logo_src = assets::logo_data_uri(&config.logo_file);
    let app = routes::router(routes::AppState::new(dashboard, logo_src));

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("binding port {}", config.port))?;
    log::info!("dashboard listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Directory of the running executable; the working directory as a fallback.
fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}
