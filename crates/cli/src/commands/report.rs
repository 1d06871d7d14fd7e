//! Renders a report to stdout, from the database or from a saved push.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use fas_monitor_core::config_loader::DEFAULT_CONFIG_PATH;
use fas_monitor_core::{
    load_chronological, render, IncomingRound, ReportContext, ReportKind, ReportView, RoundRecord,
    RoundStore,
};
use fas_monitor_data::{DatabaseClient, MemoryStore};
use serde_json::Value;

use super::load_config;

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Report kind: history, info, stats, streak, streak_daily
    pub kind: ReportKind,

    /// Partition rows by position or by team
    #[arg(long, default_value = "position")]
    pub view: ReportView,

    /// Data rows only, no header or timestamp
    #[arg(long)]
    pub raw: bool,

    /// Alert threshold (defaults to the configured one)
    #[arg(long)]
    pub threshold: Option<u32>,

    /// JSON file with rounds in the sync push shape, used instead of the database
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Database connection URL (overrides the config file)
    #[arg(long, env = "DATABASE_URL")]
    pub db_url: Option<String>,
}

/// # Errors
/// Returns an error if the input cannot be read or the database is unreachable.
pub async fn run_report(args: ReportArgs) -> Result<()> {
    let config = load_config(&args.config, args.db_url.clone())?;

    let records = match &args.input {
        Some(path) => load_file(path).await?,
        None => {
            let db = DatabaseClient::new(&config.database.url, config.database.max_connections)
                .await?;
            load_chronological(&db.repositories().rounds).await?
        }
    };
    tracing::debug!(records = records.len(), kind = %args.kind, "Rendering report");

    let threshold = args.threshold.unwrap_or(config.monitor.default_threshold);
    let ctx = ReportContext::new(Utc::now().with_timezone(&config.monitor.offset()), threshold)
        .with_view(args.view)
        .raw(args.raw)
        .with_history_limit(config.monitor.history_limit);

    println!("{}", render(args.kind, &records, &ctx));
    Ok(())
}

/// Parses either a bare array of rounds or a whole push body with `history`.
pub(crate) fn parse_batch(text: &str) -> Result<Vec<IncomingRound>> {
    let value: Value = serde_json::from_str(text).context("input is not JSON")?;
    let history = match value {
        Value::Object(mut body) => body.remove("history").unwrap_or(Value::Array(Vec::new())),
        other => other,
    };
    serde_json::from_value(history).context("input does not hold an array of rounds")
}

/// Keys the batch by round identity, as the permanent collection does, and
/// returns it in chronological order.
async fn load_file(path: &Path) -> Result<Vec<RoundRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let batch = parse_batch(&text)?;

    let store = MemoryStore::new();
    for (index, item) in batch.iter().enumerate() {
        store.upsert(&item.to_stored(index)).await?;
    }
    load_chronological(&store).await
}
