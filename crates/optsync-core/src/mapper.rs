//! Record mapping: CSV rows and booklist rows into API records.

use thiserror::Error;

use crate::ingest::booklist::BooklistRow;
use crate::record::model::{Adoption, ContentType, CourseSection, CsvRow, OptOutRecord};
use crate::term::TermCodeMapping;

/// A row whose term label has no entry in the term mapping.
///
/// The record must be skipped; it never reaches the network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No mapping found for term code: \"{label}\"")]
pub struct UnmappedTerm {
    pub label: String,
}

/// Split a compound code such as `SW-685-MOL2` on `-`.
///
/// Parts past the second are re-joined into the section, so
/// `SW-685-MOL2-LAB` has section `MOL2-LAB`.
pub fn parse_course_section(code: &str) -> CourseSection {
    let mut parts = code.splitn(3, '-');

    match (parts.next(), parts.next(), parts.next()) {
        (Some(dept), Some(course), section) => CourseSection {
            dept_code: dept.to_string(),
            course_code: course.to_string(),
            section: section.unwrap_or_default().to_string(),
        },
        _ => CourseSection {
            dept_code: code.to_string(),
            ..CourseSection::default()
        },
    }
}

/// `ebook` → DIGITAL, `courseware` → COURSEWARE, anything else → PHYSICAL.
pub fn map_content_type(text: &str) -> ContentType {
    match text.trim().to_lowercase().as_str() {
        "ebook" => ContentType::Digital,
        "courseware" => ContentType::Courseware,
        _ => ContentType::Physical,
    }
}

/// `opted out` and `true` (any case, surrounding whitespace ignored) opt out.
pub fn parse_opt_out(text: &str) -> bool {
    matches!(text.trim().to_lowercase().as_str(), "opted out" | "true")
}

/// Map a decoded CSV row to an opt-out record.
pub fn map_row(row: &CsvRow, mapping: &TermCodeMapping) -> Result<OptOutRecord, UnmappedTerm> {
    let term_code = mapping.resolve(&row.term).ok_or_else(|| UnmappedTerm {
        label: row.term.clone(),
    })?;

    let course = parse_course_section(&row.course_and_section_code);

    Ok(OptOutRecord {
        record_type: None,
        term_code: term_code.to_string(),
        crn: row.crn.clone(),
        department_code: course.dept_code,
        course_code: course.course_code,
        section_code: course.section,
        student_id: row.student_id.clone(),
        first_name: row.first_name.clone(),
        last_name: row.last_name.clone(),
        email: row.email.clone(),
        item_scan_code: row.isbn.clone(),
        title: row.title.clone(),
        author: row.author.clone(),
        publisher: row.publisher.clone(),
        opt_out: parse_opt_out(&row.opt_out),
        content_type: map_content_type(&row.content_type),
        processed: None,
        failed_to_process_reason: None,
    })
}

/// Project an opt-out record down to the adoption it depends on.
pub fn record_to_adoption(record: &OptOutRecord) -> Adoption {
    Adoption {
        term_code: record.term_code.clone(),
        crn: record.crn.clone(),
        dept_code: record.department_code.clone(),
        course_code: record.course_code.clone(),
        section: record.section_code.clone(),
        cost_to_student: 0.0,
        publisher: record.publisher.clone(),
        item_scan_code: record.item_scan_code.clone(),
        item_name: record.title.clone(),
    }
}

/// Map a booklist row to an adoption for `term_code`.
pub fn map_booklist_row(row: &BooklistRow, term_code: &str) -> Adoption {
    Adoption {
        term_code: term_code.to_string(),
        crn: row.crn.clone(),
        dept_code: row.department_code.clone(),
        course_code: row.course_code.clone(),
        section: row.section_code.clone(),
        cost_to_student: 0.0,
        publisher: row.publisher.clone(),
        item_scan_code: row.isbn.clone(),
        item_name: row.title.clone(),
    }
}
