//! Terminal output formatting.

use anyhow::Result;
use colored::{Color, ColoredString, Colorize};
use serde_json::Value;

use optsync_sync::bulk::IssueKind;
use optsync_sync::{BulkReport, RunSummary};

/// Print an opt-out run summary.
pub fn print_run_summary(summary: &RunSummary) {
    println!();
    println!("{}", "Opt-out Upload Summary".bold());
    println!("{}", "─".repeat(40));
    println!("  Total:                     {}", summary.total);
    println!("  Successful:                {}", count(summary.successful, Color::Green));
    println!("  Failed:                    {}", count(summary.failed, Color::Red));
    println!(
        "  Skipped (unmapped term):   {}",
        count(summary.skipped_unmapped, Color::Yellow)
    );
    println!(
        "  Skipped (adoption failed): {}",
        count(summary.skipped_adoption, Color::Yellow)
    );
    println!("  Malformed rows:            {}", count(summary.malformed, Color::Yellow));
    println!("{}", "─".repeat(40));
}

/// Print a bulk adoption report.
pub fn print_bulk_report(report: &BulkReport) {
    println!();
    println!("{}", "Bulk Adoption Summary".bold());
    println!("{}", "─".repeat(40));
    println!("  Booklist records:  {}", report.rows);
    println!("  Unique adoptions:  {}", report.unique);
    println!("  Duplicates:        {}", report.duplicates.to_string().dimmed());
    println!("  Batches:           {}", report.summary.batches);
    println!(
        "  Successful:        {}",
        count(report.summary.successful as usize, Color::Green)
    );
    println!(
        "  Errors:            {}",
        count(report.summary.errors as usize, Color::Red)
    );
    println!("{}", "─".repeat(40));

    if !report.summary.issues.is_empty() {
        println!("\n{}", "Issues:".bold());
        for issue in &report.summary.issues {
            let kind = match issue.kind {
                IssueKind::Warning => "warning".yellow(),
                IssueKind::Error => "error".red(),
            };
            println!(
                "  [{}] batch {} entry {}: {}",
                kind, issue.batch, issue.entry_number, issue.message
            );
        }
    }
}

/// Pretty-print a JSON body.
pub fn print_json(data: Option<&Value>) -> Result<()> {
    match data {
        Some(value) => println!("{}", serde_json::to_string_pretty(value)?),
        None => println!("{}", "(empty response)".dimmed()),
    }
    Ok(())
}

/// Highlight non-zero counts.
fn count(n: usize, color: Color) -> ColoredString {
    let text = n.to_string();
    if n == 0 {
        text.as_str().normal()
    } else {
        text.as_str().color(color)
    }
}
