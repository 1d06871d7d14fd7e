use clap::{Parser, Subcommand};

mod commands;

use commands::{MigrateArgs, ReportArgs, ServeArgs, StatusArgs};

#[derive(Parser)]
#[command(name = "fas-monitor")]
#[command(about = "FAS league round monitor with Telegram reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web API and Telegram webhook server
    Serve(ServeArgs),
    /// Apply pending database migrations
    Migrate(MigrateArgs),
    /// Render a report to stdout
    Report(ReportArgs),
    /// Show collection and sync state
    Status(StatusArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::Migrate(args) => commands::run_migrate(args).await?,
        Commands::Report(args) => commands::run_report(args).await?,
        Commands::Status(args) => commands::run_status(args).await?,
    }

    Ok(())
}
