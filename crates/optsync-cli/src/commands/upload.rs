//! Opt-out upload command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use optsync_core::ingest::parse_file;
use optsync_core::TermMappingCache;
use optsync_sync::OptOutRun;

use crate::output;

#[derive(Args)]
pub struct UploadArgs {
    /// Opt-out export CSV
    pub csv: PathBuf,
}

pub async fn execute(args: UploadArgs, mapping_path: &Path) -> Result<()> {
    let mapping = TermMappingCache::new()
        .load(Some(mapping_path))
        .context("Failed to load term mapping")?;
    info!(path = %mapping_path.display(), entries = mapping.len(), "Loaded term mapping");

    let parsed = parse_file(&args.csv)
        .with_context(|| format!("Failed to read {}", args.csv.display()))?;
    info!(
        "Loaded {} records from {} ({} malformed rows skipped)",
        parsed.rows.len(),
        args.csv.display(),
        parsed.malformed
    );

    let api = super::connect().await?;
    let summary = OptOutRun::new(&api, &mapping).run(&parsed).await;

    output::print_run_summary(&summary);
    Ok(())
}
