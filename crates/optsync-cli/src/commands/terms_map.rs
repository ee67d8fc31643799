//! Term mapping regeneration command.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use optsync_sync::regenerate_mapping;

pub async fn execute(mapping_path: &Path) -> Result<()> {
    let api = super::connect().await?;
    let mapping = regenerate_mapping(&api, mapping_path).await?;

    println!(
        "{} {} term mappings to {}",
        "✓".green(),
        mapping.len(),
        mapping_path.display()
    );
    for (name, code) in &mapping.mappings {
        println!("  {:<30} {}", name, code.cyan());
    }

    Ok(())
}
