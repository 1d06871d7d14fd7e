//! CLI commands for the FAS monitor.

pub mod migrate;
pub mod report;
pub mod serve;
pub mod status;

pub use migrate::{run_migrate, MigrateArgs};
pub use report::{run_report, ReportArgs};
pub use serve::{run_serve, ServeArgs};
pub use status::{run_status, StatusArgs};

use anyhow::Result;
use fas_monitor_core::{AppConfig, ConfigLoader};

/// Loads the config file and applies a `--db-url` override.
pub(crate) fn load_config(path: &str, db_url: Option<String>) -> Result<AppConfig> {
    let mut config = ConfigLoader::load_from(path)?;
    if let Some(url) = db_url {
        config.database.url = url;
    }
    Ok(config)
}
