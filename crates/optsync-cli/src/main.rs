//! OptSync CLI - textbook opt-out and adoption sync
//!
//! Pushes the bookstore's opt-out export and booklists to the Watchman admin API.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::Cli;

/// Initialize tracing to the console and to `<log_dir>/<name>-<timestamp>.log`.
///
/// The returned guard flushes the file writer on drop and must outlive the run.
fn init_tracing(log_dir: &Path, name: &str, verbose: bool) -> Result<(PathBuf, WorkerGuard)> {
    let default_filter = if verbose {
        "optsync=debug,optsync_sync=debug,optsync_api=debug,optsync_core=debug"
    } else {
        "optsync=info,optsync_sync=debug,optsync_api=info,optsync_core=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_name = format!(
        "{}-{}.log",
        name,
        chrono::Local::now().format("%Y-%m-%dT%H-%M-%S")
    );
    let log_path = log_dir.join(&file_name);

    let appender = tracing_appender::rolling::never(log_dir, &file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();

    Ok((log_path, guard))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (log_path, _guard) = init_tracing(&cli.log_dir, cli.command.log_name(), cli.verbose)?;
    println!("Logging to: {}", log_path.display());

    let result = cli.execute().await;
    if let Err(e) = &result {
        tracing::error!("Fatal error: {:#}", e);
    }
    result
}
