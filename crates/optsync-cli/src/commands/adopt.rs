//! Bulk adoption command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use optsync_core::ingest::booklist::read_booklist;
use optsync_sync::{run_bulk_adoption, BATCH_SIZE};

use crate::output;

pub const DEFAULT_BOOKLIST: &str = "data/full-booklist.csv";

#[derive(Args)]
pub struct AdoptArgs {
    /// Term code the adoptions belong to, e.g. 2026SP
    pub term: String,

    /// Booklist CSV
    #[arg(default_value = DEFAULT_BOOKLIST)]
    pub csv: PathBuf,
}

pub async fn execute(args: AdoptArgs) -> Result<()> {
    let rows = read_booklist(&args.csv)
        .with_context(|| format!("Failed to read booklist {}", args.csv.display()))?;
    info!(
        term = %args.term,
        "Read {} booklist records from {}",
        rows.len(),
        args.csv.display()
    );

    let api = super::connect().await?;
    let report = run_bulk_adoption(&api, &rows, &args.term, BATCH_SIZE).await;

    output::print_bulk_report(&report);
    Ok(())
}
