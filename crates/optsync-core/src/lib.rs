//! OptSync Core Library
//!
//! Domain records, CSV decoding, term resolution and record mapping for the
//! course-material opt-out synchronizer. Nothing in this crate touches the network.

pub mod error;
pub mod identity;
pub mod ingest;
pub mod mapper;
pub mod record;
pub mod term;

pub use error::{CoreError, CoreResult};
pub use identity::{AdoptionCache, DedupCache, EnrollmentCache};
pub use mapper::UnmappedTerm;
pub use record::model::{
    Adoption, AdoptionList, AdoptionMatch, ContentType, CourseSection, CsvRow, Enrollment, EnrollmentList,
    EntryMessages, OptOutRecord, Term, TermList, UploadResult,
};
pub use term::{TermCodeMapping, TermMappingCache};
