//! Record domain models.
//!
//! Field names on the wire follow the admin API, which is why several
//! structs rename fields (including the API's `firsName` spelling).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::identity;

/// Number of columns in an opt-out CSV export.
pub const CSV_WIDTH: usize = 20;

/// Column names of the opt-out CSV export, in file order.
pub const CSV_HEADERS: [&str; CSV_WIDTH] = [
    "dateSent",
    "term",
    "crn",
    "courseandsectioncode",
    "studentid",
    "firstname",
    "lastname",
    "email",
    "ISBN",
    "title",
    "author",
    "publisher",
    "startdate",
    "censusdate",
    "enddate",
    "coursetitle",
    "coursecode",
    "enrollmentstatus",
    "optout",
    "contenttype",
];

/// One decoded line of an opt-out CSV export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub date_sent: String,
    pub term: String,
    pub crn: String,
    pub course_and_section_code: String,
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub start_date: String,
    pub census_date: String,
    pub end_date: String,
    pub course_title: String,
    pub course_code: String,
    pub enrollment_status: String,
    pub opt_out: String,
    pub content_type: String,
}

impl CsvRow {
    /// Build a row from decoded fields.
    ///
    /// Returns `None` when the field count differs from [`CSV_WIDTH`]; such a
    /// line is never partially mapped.
    pub fn from_fields(fields: Vec<String>) -> Option<Self> {
        let fields: [String; CSV_WIDTH] = fields.try_into().ok()?;
        let [date_sent, term, crn, course_and_section_code, student_id, first_name, last_name, email, isbn, title, author, publisher, start_date, census_date, end_date, course_title, course_code, enrollment_status, opt_out, content_type] =
            fields;

        Some(Self {
            date_sent,
            term,
            crn,
            course_and_section_code,
            student_id,
            first_name,
            last_name,
            email,
            isbn,
            title,
            author,
            publisher,
            start_date,
            census_date,
            end_date,
            course_title,
            course_code,
            enrollment_status,
            opt_out,
            content_type,
        })
    }
}

/// Normalized material content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContentType {
    Digital,
    Courseware,
    Physical,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Digital => "DIGITAL",
            ContentType::Courseware => "COURSEWARE",
            ContentType::Physical => "PHYSICAL",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Department, course and section parsed from a compound code such as `SW-685-MOL2`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseSection {
    pub dept_code: String,
    pub course_code: String,
    pub section: String,
}

/// One student's opt-out/opt-in decision for one course item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptOutRecord {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
    pub term_code: String,
    pub crn: String,
    pub department_code: String,
    pub course_code: String,
    pub section_code: String,
    pub student_id: String,
    #[serde(rename = "firsName")]
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub item_scan_code: String,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub opt_out: bool,
    pub content_type: ContentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_to_process_reason: Option<String>,
}

impl OptOutRecord {
    /// Course coordinates of this record.
    pub fn course_section(&self) -> CourseSection {
        CourseSection {
            dept_code: self.department_code.clone(),
            course_code: self.course_code.clone(),
            section: self.section_code.clone(),
        }
    }

    /// Composite identity of the adoption this record depends on.
    pub fn adoption_key(&self) -> String {
        identity::adoption_key(
            &self.term_code,
            &self.department_code,
            &self.course_code,
            &self.section_code,
            &self.item_scan_code,
        )
    }
}

/// A course's required material for a term and section.
///
/// Carries no student-identifying data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Adoption {
    pub term_code: String,
    pub crn: String,
    pub dept_code: String,
    pub course_code: String,
    pub section: String,
    pub cost_to_student: f64,
    pub publisher: String,
    pub item_scan_code: String,
    pub item_name: String,
}

impl Adoption {
    /// Composite identity `term|dept|course|section|itemScanCode`.
    pub fn key(&self) -> String {
        identity::adoption_key(
            &self.term_code,
            &self.dept_code,
            &self.course_code,
            &self.section,
            &self.item_scan_code,
        )
    }
}

/// Remote enrollment as returned by the enrollment lookup.
///
/// Every field is optional because the remote side does not guarantee them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    #[serde(default)]
    pub term_code: Option<String>,
    #[serde(default)]
    pub dept_code: Option<String>,
    #[serde(default)]
    pub course_code: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    /// Academic metadata the checker does not interpret.
    #[serde(flatten)]
    pub academic: Map<String, Value>,
}

impl Enrollment {
    /// Composite identity, or `None` if any identity field is missing or empty.
    pub fn key(&self) -> Option<String> {
        fn present(field: &Option<String>) -> Option<&str> {
            field.as_deref().filter(|s| !s.is_empty())
        }

        Some(identity::enrollment_key(
            present(&self.term_code)?,
            present(&self.dept_code)?,
            present(&self.course_code)?,
            present(&self.section)?,
            present(&self.customer)?,
        ))
    }
}

/// Identity fields of one adoption returned by the lookup.
///
/// Everything else in the entry is ignored, and `null` reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdoptionMatch {
    pub dept_code: Option<String>,
    pub course_code: Option<String>,
    pub section: Option<String>,
    pub item_scan_code: Option<String>,
}

impl AdoptionMatch {
    /// Composite identity under `term`; absent fields key as empty.
    pub fn key(&self, term: &str) -> String {
        identity::adoption_key(
            term,
            self.dept_code.as_deref().unwrap_or_default(),
            self.course_code.as_deref().unwrap_or_default(),
            self.section.as_deref().unwrap_or_default(),
            self.item_scan_code.as_deref().unwrap_or_default(),
        )
    }
}

/// `{ "adoptions": [...] }` envelope of the adoption lookup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdoptionList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub adoptions: Vec<AdoptionMatch>,
}

/// `{ "enrollments": [...] }` envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrollmentList {
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
}

/// Canonical academic term as listed by the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Term {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
}

/// `{ "terms": [...] }` envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermList {
    pub terms: Vec<Term>,
}

/// Messages attached to one entry of a bulk submission (1-based within its batch).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMessages {
    #[serde(default, deserialize_with = "null_as_default")]
    pub entry_number: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<String>,
}

/// Outcome of one bulk adoption submission.
///
/// The API may send `null` for any count or list; it reads as zero or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadResult {
    #[serde(deserialize_with = "null_as_default")]
    pub total_records: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub successful_records: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub warning_records: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub error_records: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub warnings: Vec<EntryMessages>,
    #[serde(deserialize_with = "null_as_default")]
    pub errors: Vec<EntryMessages>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
