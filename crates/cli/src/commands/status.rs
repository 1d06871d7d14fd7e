use anyhow::Result;
use clap::Args;
use fas_monitor_core::config_loader::DEFAULT_CONFIG_PATH;
use fas_monitor_core::{RoundStore, SyncStateStore};
use fas_monitor_data::DatabaseClient;
use serde_json::json;

use super::load_config;

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Database connection URL (overrides the config file)
    #[arg(long, env = "DATABASE_URL")]
    pub db_url: Option<String>,
}

/// Prints collection counts and the saved sync state as JSON.
///
/// # Errors
/// Returns an error if the database cannot be queried.
pub async fn run_status(args: StatusArgs) -> Result<()> {
    let config = load_config(&args.config, args.db_url)?;
    let db = DatabaseClient::new(&config.database.url, config.database.max_connections).await?;
    let repos = db.repositories();

    let total = repos.rounds.count(None).await?;
    let dates = repos.rounds.dates_with_counts().await?;
    let state = repos.sync_state.load_state().await?;

    let report = json!({
        "total_historical": total,
        "dates": dates,
        "sync": state.map(|s| json!({
            "configured": s.is_configured(),
            "history_size": s.history.len(),
            "threshold": s.threshold,
            "last_sync": s.last_sync,
            "templates": s.rendered_templates.keys().collect::<Vec<_>>(),
        })),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
