//! Best-effort enrollment verification before an opt-out is submitted.
//!
//! A missing enrollment is informational only. Nothing here can fail or
//! block the record being processed.

use tracing::{debug, warn};

use optsync_api::{AdminApi, Transport};
use optsync_core::identity::enrollment_key;
use optsync_core::{CourseSection, EnrollmentCache, EnrollmentList};

/// Check whether `student_id` is enrolled in `course` for `term`.
///
/// Every complete enrollment in the response is cached, so later rows for the
/// same student skip the lookup. Remote records missing any identity field are
/// ignored for caching.
pub async fn check_enrollment<T: Transport>(
    api: &AdminApi<T>,
    term: &str,
    student_id: &str,
    course: &CourseSection,
    cache: &mut EnrollmentCache,
) {
    let key = enrollment_key(term, &course.dept_code, &course.course_code, &course.section, student_id);

    if cache.has(&key) {
        return;
    }

    match api.get_enrollment(term, student_id).await {
        Ok(response) if response.is_ok() => {
            let list = response.data_as::<EnrollmentList>().unwrap_or_default();
            for enrollment in &list.enrollments {
                if let Some(found) = enrollment.key() {
                    cache.add(found);
                }
            }
            if cache.has(&key) {
                return;
            }
        }
        Ok(response) => {
            debug!(status = response.status, student_id, "Enrollment lookup did not succeed");
        }
        Err(e) => {
            warn!(error = %e, student_id, "Enrollment lookup failed");
        }
    }

    debug!(
        "Student {} not enrolled in {}-{}-{} for term {}",
        student_id, course.dept_code, course.course_code, course.section, term
    );
}
