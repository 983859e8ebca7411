use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

mod app;
mod config;
mod dashboard;
mod detail;
mod error;
mod normalize;
mod polling;
mod scoreboard;
mod season_cache;
mod session;
mod sport;
mod sportsdata;

use app::DashboardApp;
use config::Config;
use scoreboard::Scoreboard;
use season_cache::SeasonCache;
use session::{Session, SettingsStore};
use sportsdata::{SportsDataClient, SportsRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // Open settings store
    let store = SettingsStore::open(&config.database_path)
        .with_context(|| format!("Failed to open settings store {}", config.database_path))?;
    info!("Settings store opened: {}", config.database_path);

    let session = Arc::new(Session::load(store, &config.default_sportsbook_group)?);
    if let Some(key) = config.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        if let Err(e) = session.save_api_key(key) {
            error!("{:#}", e);
        }
        info!("Using API key from the environment");
    }

    let client = SportsDataClient::new(&config.base_url, session.clone())?;
    let registry = SportsRegistry::new(client);
    let scoreboard = Scoreboard::new(
        &registry.schedules,
        SeasonCache::new(config.season_cache_ttl()),
        config.poll_interval(),
    );
    let app = Arc::new(DashboardApp::new(
        session,
        registry,
        scoreboard,
        config.detail_timing(),
        config.competition_probe_batch,
    ));

    // Probe in the background so the API is reachable meanwhile
    let startup = app.clone();
    tokio::spawn(async move { startup.start().await });

    let router = dashboard::router(app);
    let addr: SocketAddr = config
        .dashboard_addr
        .parse()
        .with_context(|| format!("Invalid dashboard address {}", config.dashboard_addr))?;
    info!("Dashboard listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router).await?;

    Ok(())
}
