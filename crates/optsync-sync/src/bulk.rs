//! Bulk adoption import.
//!
//! The whole input is deduplicated in memory first (no requests), then
//! submitted in fixed-size batches one after another. A batch that fails as a
//! whole counts all of its records as errors and the next batch still runs.

use std::collections::HashSet;

use tracing::{debug, error, info};

use optsync_api::{AdminApi, Transport};
use optsync_core::ingest::booklist::BooklistRow;
use optsync_core::mapper::map_booklist_row;
use optsync_core::{Adoption, UploadResult};

/// Adoptions per bulk request.
pub const BATCH_SIZE: usize = 500;

/// Result of deduplicating an adoption set.
#[derive(Debug, Clone, Default)]
pub struct Deduplicated {
    pub unique: Vec<Adoption>,
    pub duplicates: usize,
}

/// Keep the first adoption per composite key, in input order.
pub fn dedupe_adoptions(adoptions: impl IntoIterator<Item = Adoption>) -> Deduplicated {
    let mut seen = HashSet::new();
    let mut result = Deduplicated::default();

    for adoption in adoptions {
        let key = adoption.key();
        if seen.insert(key.clone()) {
            result.unique.push(adoption);
        } else {
            debug!(key = %key, "Dropping duplicate adoption");
            result.duplicates += 1;
        }
    }

    result
}

/// Severity of a per-entry message reported by the bulk endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    Warning,
    Error,
}

/// A warning or error for one entry of one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchIssue {
    pub kind: IssueKind,
    /// 1-based batch number.
    pub batch: usize,
    /// 1-based entry number within the batch.
    pub entry_number: u64,
    pub message: String,
}

/// Totals across all batches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkSummary {
    pub batches: usize,
    pub successful: u64,
    pub errors: u64,
    pub issues: Vec<BatchIssue>,
}

/// Submit `adoptions` in batches of `batch_size`.
pub async fn upload_batches<T: Transport>(
    api: &AdminApi<T>,
    adoptions: &[Adoption],
    batch_size: usize,
) -> BulkSummary {
    let mut summary = BulkSummary::default();
    let total = adoptions.len();

    for (index, batch) in adoptions.chunks(batch_size.max(1)).enumerate() {
        let number = index + 1;
        let start = index * batch_size.max(1);
        summary.batches += 1;

        info!(
            "Uploading batch {} ({} adoptions, {}-{} of {})",
            number,
            batch.len(),
            start + 1,
            start + batch.len(),
            total
        );

        let response = match api.import_adoptions(batch).await {
            Ok(response) => response,
            Err(e) => {
                error!("Batch {} exception: {}", number, e);
                summary.errors += batch.len() as u64;
                continue;
            }
        };

        if !response.is_ok() {
            error!(
                "Batch {} failed: {} - {}",
                number,
                response.status,
                response.error_text()
            );
            summary.errors += batch.len() as u64;
            continue;
        }

        match response.data_as::<UploadResult>() {
            Some(result) => record_result(&mut summary, number, result),
            None => {
                error!("Batch {} returned an unreadable result", number);
                summary.errors += batch.len() as u64;
            }
        }
    }

    summary
}

fn record_result(summary: &mut BulkSummary, batch: usize, result: UploadResult) {
    summary.successful += result.successful_records;
    summary.errors += result.error_records;

    info!(
        "Batch {}: {} success, {} errors",
        batch, result.successful_records, result.error_records
    );

    for warning in result.warnings {
        let message = warning.messages.join(", ");
        info!("Batch {} warning at entry {}: {}", batch, warning.entry_number, message);
        summary.issues.push(BatchIssue {
            kind: IssueKind::Warning,
            batch,
            entry_number: warning.entry_number,
            message,
        });
    }

    for entry in result.errors {
        let message = entry.messages.join(", ");
        error!("Batch {} error at entry {}: {}", batch, entry.entry_number, message);
        summary.issues.push(BatchIssue {
            kind: IssueKind::Error,
            batch,
            entry_number: entry.entry_number,
            message,
        });
    }
}

/// Outcome of a bulk adoption run from a booklist.
#[derive(Debug, Clone, Default)]
pub struct BulkReport {
    pub rows: usize,
    pub unique: usize,
    pub duplicates: usize,
    pub summary: BulkSummary,
}

/// Map booklist rows to adoptions for `term_code`, dedupe and upload.
pub async fn run_bulk_adoption<T: Transport>(
    api: &AdminApi<T>,
    rows: &[BooklistRow],
    term_code: &str,
    batch_size: usize,
) -> BulkReport {
    let deduped = dedupe_adoptions(rows.iter().map(|row| map_booklist_row(row, term_code)));

    info!(
        "Extracted {} unique adoptions from {} records ({} duplicates dropped)",
        deduped.unique.len(),
        rows.len(),
        deduped.duplicates
    );

    let mut report = BulkReport {
        rows: rows.len(),
        unique: deduped.unique.len(),
        duplicates: deduped.duplicates,
        summary: BulkSummary::default(),
    };

    if deduped.unique.is_empty() {
        info!("No adoptions to upload");
        return report;
    }

    report.summary = upload_batches(api, &deduped.unique, batch_size).await;

    info!(
        "Bulk adoption complete. Batches: {}, Success: {}, Errors: {}, Total unique: {}",
        report.summary.batches, report.summary.successful, report.summary.errors, report.unique
    );

    report
}
