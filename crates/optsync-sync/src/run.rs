//! Sequential opt-out run: map, reconcile, check, submit, tally.

use tracing::{error, info};

use optsync_api::{AdminApi, Transport};
use optsync_core::ingest::ParsedCsv;
use optsync_core::mapper::map_row;
use optsync_core::{AdoptionCache, CsvRow, EnrollmentCache, TermCodeMapping};

use crate::adoption::ensure_adoption;
use crate::enrollment::check_enrollment;

/// What happened to one CSV row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Submitted,
    Failed,
    SkippedUnmappedTerm,
    SkippedAdoption,
}

/// Tally for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped_unmapped: usize,
    pub skipped_adoption: usize,
    pub malformed: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Submitted => self.successful += 1,
            RowOutcome::Failed => self.failed += 1,
            RowOutcome::SkippedUnmappedTerm => self.skipped_unmapped += 1,
            RowOutcome::SkippedAdoption => self.skipped_adoption += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped_unmapped + self.skipped_adoption
    }
}

/// One opt-out upload. Owns the dedup caches for its lifetime.
pub struct OptOutRun<'a, T> {
    api: &'a AdminApi<T>,
    mapping: &'a TermCodeMapping,
    adoptions: AdoptionCache,
    enrollments: EnrollmentCache,
}

impl<'a, T: Transport> OptOutRun<'a, T> {
    pub fn new(api: &'a AdminApi<T>, mapping: &'a TermCodeMapping) -> Self {
        Self {
            api,
            mapping,
            adoptions: AdoptionCache::new(),
            enrollments: EnrollmentCache::new(),
        }
    }

    pub fn adoptions(&self) -> &AdoptionCache {
        &self.adoptions
    }

    pub fn enrollments(&self) -> &EnrollmentCache {
        &self.enrollments
    }

    /// Process every decoded row in order.
    pub async fn run(&mut self, parsed: &ParsedCsv) -> RunSummary {
        let mut summary = RunSummary {
            total: parsed.rows.len(),
            malformed: parsed.malformed,
            ..RunSummary::default()
        };

        for (index, row) in parsed.rows.iter().enumerate() {
            let outcome = self.process_row(index + 1, summary.total, row).await;
            summary.record(outcome);
        }

        info!(
            "Upload complete. Success: {}, Errors: {}, Skipped: {}, Total: {}",
            summary.successful,
            summary.failed,
            summary.skipped(),
            summary.total
        );

        summary
    }

    /// Process one row. `number` is 1-based.
    pub async fn process_row(&mut self, number: usize, total: usize, row: &CsvRow) -> RowOutcome {
        let record = match map_row(row, self.mapping) {
            Ok(record) => record,
            Err(unmapped) => {
                error!("Record {} skipped: {}", number, unmapped);
                return RowOutcome::SkippedUnmappedTerm;
            }
        };

        info!(
            "Processing record {}/{}: {} - {}",
            number, total, record.student_id, record.item_scan_code
        );

        let adoption = ensure_adoption(self.api, &record, &mut self.adoptions).await;
        if !adoption.is_success() {
            error!(
                "Record {} skipped: adoption for {} could not be ensured",
                number,
                record.adoption_key()
            );
            return RowOutcome::SkippedAdoption;
        }

        check_enrollment(
            self.api,
            &record.term_code,
            &record.student_id,
            &record.course_section(),
            &mut self.enrollments,
        )
        .await;

        match self.api.submit_opt_out(&record.term_code, &record).await {
            Ok(response) if response.is_ok() => {
                info!("Record {} processed successfully", number);
                RowOutcome::Submitted
            }
            Ok(response) => {
                error!(
                    "Record {} failed: {} - {}",
                    number,
                    response.status,
                    response.error_text()
                );
                RowOutcome::Failed
            }
            Err(e) => {
                error!("Record {} exception: {}", number, e);
                RowOutcome::Failed
            }
        }
    }
}
