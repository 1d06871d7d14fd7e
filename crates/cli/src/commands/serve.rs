use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use fas_monitor_core::config_loader::DEFAULT_CONFIG_PATH;
use fas_monitor_core::{RoundStore, SyncStateStore};
use fas_monitor_data::{DatabaseClient, MemoryStore};
use fas_monitor_telegram::TelegramClient;
use fas_monitor_web_api::{ApiServer, AppState, SyncCoordinator};

use super::load_config;

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Listen address, overriding the configured host and port
    #[arg(short, long)]
    pub addr: Option<String>,

    /// Database connection URL (overrides the config file)
    #[arg(long, env = "DATABASE_URL")]
    pub db_url: Option<String>,

    /// Keep everything in memory instead of Postgres (state is lost on exit)
    #[arg(long)]
    pub memory: bool,
}

/// Runs the API server until Ctrl+C.
///
/// # Errors
/// Returns an error if the database or the listen address is unavailable.
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = load_config(&args.config, args.db_url)?;

    let (rounds, mirror): (Arc<dyn RoundStore>, Arc<dyn SyncStateStore>) = if args.memory {
        tracing::warn!("Using in-memory storage, data will not survive a restart");
        let store = Arc::new(MemoryStore::new());
        (store.clone(), store)
    } else {
        let db =
            DatabaseClient::connect_and_migrate(&config.database.url, config.database.max_connections)
                .await?;
        let repos = db.repositories();
        (Arc::new(repos.rounds), Arc::new(repos.sync_state))
    };

    let coordinator = Arc::new(SyncCoordinator::new(
        rounds,
        mirror,
        config.monitor.default_threshold,
    ));
    coordinator.load().await;

    let telegram = TelegramClient::new().with_base_url(config.telegram.api_url.clone());
    if config.telegram.backend_url.is_empty() {
        tracing::warn!("telegram.backend_url is not set, setup-webhook will be refused");
    }

    let addr = args.addr.unwrap_or_else(|| config.server.addr());
    let server = ApiServer::new(AppState::new(coordinator, telegram, config));

    tokio::select! {
        result = server.serve(&addr) => result?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
