//! Typed admin API endpoints.

use serde_json::json;
use tracing::debug;

use optsync_core::{Adoption, OptOutRecord};

use crate::error::ApiResult;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// Filter for the adoption lookup. Empty optional filters are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdoptionFilter {
    pub dept: String,
    pub course: String,
    pub section: String,
    pub item_scan_code: String,
    pub crn: String,
}

/// Admin API endpoints over any [`Transport`].
pub struct AdminApi<T> {
    transport: T,
}

impl<T: Transport> AdminApi<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Health check.
    pub async fn status(&self) -> ApiResult<ApiResponse> {
        self.transport
            .request(&ApiRequest::get(&["cart", "v1", "admin", "status"]))
            .await
    }

    /// Enumerate canonical term codes.
    pub async fn term_list(&self) -> ApiResult<ApiResponse> {
        self.transport
            .request(&ApiRequest::get(&["bursar_billing", "v1", "term", "list"]))
            .await
    }

    /// Find existing adoptions for a term.
    pub async fn find_adoptions(&self, term: &str, filter: &AdoptionFilter) -> ApiResult<ApiResponse> {
        let mut request =
            ApiRequest::get(&["cart", "v1", "admin", "adoption", term]).query("dept", filter.dept.as_str());

        for (key, value) in [
            ("course", &filter.course),
            ("section", &filter.section),
            ("itemScanCode", &filter.item_scan_code),
            ("crn", &filter.crn),
        ] {
            if !value.is_empty() {
                request = request.query(key, value.as_str());
            }
        }

        self.transport.request(&request).await
    }

    /// Create one adoption.
    pub async fn create_adoption(&self, term: &str, adoption: &Adoption) -> ApiResult<ApiResponse> {
        let body = serde_json::to_value(adoption)?;
        self.transport
            .request(&ApiRequest::post(&["cart", "v1", "admin", "adoption", term], body))
            .await
    }

    /// Bulk-create adoptions; a 200 response carries an `UploadResult`.
    pub async fn import_adoptions(&self, adoptions: &[Adoption]) -> ApiResult<ApiResponse> {
        debug!(count = adoptions.len(), "Bulk adoption request");
        let body = json!({ "adoptions": adoptions });
        self.transport
            .request(&ApiRequest::post(&["bursar_billing", "v1", "adoption", "json"], body))
            .await
    }

    /// Every adoption for a term.
    pub async fn list_adoptions(&self, term: &str) -> ApiResult<ApiResponse> {
        let request = ApiRequest::get(&["bursar_billing", "v1", "adoption", "list"]).query("termCode", term);
        self.transport.request(&request).await
    }

    /// Enrollments of one student for a term.
    pub async fn get_enrollment(&self, term: &str, student_id: &str) -> ApiResult<ApiResponse> {
        self.transport
            .request(&ApiRequest::get(&[
                "bursar_billing",
                "v1",
                "enrollment",
                "get",
                term,
                student_id,
            ]))
            .await
    }

    /// Submit one opt-out decision. The API takes a one-element array.
    pub async fn submit_opt_out(&self, term: &str, record: &OptOutRecord) -> ApiResult<ApiResponse> {
        let body = json!([record]);
        self.transport
            .request(&ApiRequest::post(&["cart", "v1", "admin", "opt_out", term], body))
            .await
    }
}
