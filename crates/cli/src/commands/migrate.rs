use anyhow::Result;
use clap::Args;
use fas_monitor_core::config_loader::DEFAULT_CONFIG_PATH;
use fas_monitor_data::DatabaseClient;

use super::load_config;

#[derive(Args, Debug, Clone)]
pub struct MigrateArgs {
    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Database connection URL (overrides the config file)
    #[arg(long, env = "DATABASE_URL")]
    pub db_url: Option<String>,
}

/// # Errors
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let config = load_config(&args.config, args.db_url)?;
    DatabaseClient::connect_and_migrate(&config.database.url, config.database.max_connections)
        .await?;
    Ok(())
}
