//! # OptSync Sync
//!
//! Reconciliation of CSV-derived records against the admin API.
//!
//! Everything here runs strictly in sequence: the dedup caches are plain sets
//! read and written in the same control flow, and serial execution is what
//! guarantees at most one adoption create per composite key per run.

pub mod adoption;
pub mod bulk;
pub mod enrollment;
pub mod run;
pub mod terms;

#[cfg(test)]
pub(crate) mod testing;

pub use adoption::{ensure_adoption, AdoptionOutcome};
pub use bulk::{dedupe_adoptions, run_bulk_adoption, upload_batches, BulkReport, BulkSummary, BATCH_SIZE};
pub use enrollment::check_enrollment;
pub use run::{OptOutRun, RowOutcome, RunSummary};
pub use terms::{build_mapping, refresh_mapping, regenerate_mapping};
