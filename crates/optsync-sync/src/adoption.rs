//! Adoption reconciliation: lookup-before-create against the admin API.
//!
//! Many CSV rows (one per enrolled student) point at the same course item.
//! The cache short-circuits repeats; the remote lookup seeds the cache with
//! every sibling adoption of the course; only a confirmed miss creates.

use tracing::{error, info, warn};

use optsync_api::{AdminApi, AdoptionFilter, Transport};
use optsync_core::mapper::record_to_adoption;
use optsync_core::{AdoptionCache, AdoptionList, OptOutRecord};

/// How an adoption was ensured, or why it could not be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdoptionOutcome {
    /// Already confirmed earlier in this run; no request sent.
    Cached,
    /// Found by the remote lookup.
    Found,
    /// Created by this run.
    Created,
    /// Neither found nor created.
    Failed,
}

impl AdoptionOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, AdoptionOutcome::Failed)
    }
}

/// Make sure the adoption behind `record` exists remotely.
pub async fn ensure_adoption<T: Transport>(
    api: &AdminApi<T>,
    record: &OptOutRecord,
    cache: &mut AdoptionCache,
) -> AdoptionOutcome {
    let term = record.term_code.as_str();
    let key = record.adoption_key();

    if cache.has(&key) {
        return AdoptionOutcome::Cached;
    }

    let filter = AdoptionFilter {
        dept: record.department_code.clone(),
        course: record.course_code.clone(),
        section: record.section_code.clone(),
        item_scan_code: record.item_scan_code.clone(),
        ..AdoptionFilter::default()
    };

    match api.find_adoptions(term, &filter).await {
        Ok(response) if response.is_ok() => match response.data_as::<AdoptionList>() {
            Some(found) => {
                for adoption in &found.adoptions {
                    cache.add(adoption.key(term));
                }
                if cache.has(&key) {
                    return AdoptionOutcome::Found;
                }
            }
            None => {
                warn!(key = %key, "Adoption lookup returned an unreadable body");
            }
        },
        // Non-200 lookups are indistinguishable from "not found"; fall through to create.
        Ok(response) => {
            warn!(status = response.status, key = %key, "Adoption lookup did not succeed");
        }
        Err(e) => {
            error!(error = %e, key = %key, "Adoption lookup failed");
            return AdoptionOutcome::Failed;
        }
    }

    info!(
        "Creating adoption for {}-{}-{} ISBN {} in term {}",
        record.department_code, record.course_code, record.section_code, record.item_scan_code, term
    );

    let adoption = record_to_adoption(record);
    match api.create_adoption(term, &adoption).await {
        Ok(response) if response.is_ok() => {
            cache.add(key);
            AdoptionOutcome::Created
        }
        Ok(response) => {
            error!(
                "Adoption creation failed: {} - {}",
                response.status,
                response.error_text()
            );
            AdoptionOutcome::Failed
        }
        Err(e) => {
            error!(error = %e, "Adoption creation failed");
            AdoptionOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fake_api;
    use optsync_api::{ApiResponse, Method};
    use optsync_core::ContentType;
    use serde_json::json;

    const LOOKUP: &str = "/cart/v1/admin/adoption/2026SP";

    fn record(section: &str, isbn: &str) -> OptOutRecord {
        OptOutRecord {
            record_type: None,
            term_code: "2026SP".into(),
            crn: "1001".into(),
            department_code: "SW".into(),
            course_code: "685".into(),
            section_code: section.into(),
            student_id: "S1".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.edu".into(),
            item_scan_code: isbn.into(),
            title: "Social Work Practice".into(),
            author: "Smith".into(),
            publisher: "OUP".into(),
            opt_out: true,
            content_type: ContentType::Physical,
            processed: None,
            failed_to_process_reason: None,
        }
    }

    fn remote(section: &str, isbn: &str) -> serde_json::Value {
        json!({ "deptCode": "SW", "courseCode": "685", "section": section, "itemScanCode": isbn })
    }

    #[tokio::test]
    async fn test_cached_key_skips_network() {
        let api = fake_api();
        let mut cache = AdoptionCache::new();
        cache.add("2026SP|SW|685|MOL2|111");

        let outcome = ensure_adoption(&api, &record("MOL2", "111"), &mut cache).await;
        assert_eq!(outcome, AdoptionOutcome::Cached);
        assert!(api.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_found_remotely_caches_all_siblings() {
        let api = fake_api();
        api.transport().respond(
            Method::GET,
            LOOKUP,
            ApiResponse::ok(json!({ "adoptions": [remote("MOL2", "111"), remote("MOL2", "222")] })),
        );
        let mut cache = AdoptionCache::new();

        let outcome = ensure_adoption(&api, &record("MOL2", "111"), &mut cache).await;
        assert_eq!(outcome, AdoptionOutcome::Found);
        assert_eq!(cache.size(), 2);
        assert!(cache.has("2026SP|SW|685|MOL2|222"));
        assert_eq!(api.transport().count(Method::POST, LOOKUP), 0);

        // The sibling is now served from the cache.
        let outcome = ensure_adoption(&api, &record("MOL2", "222"), &mut cache).await;
        assert_eq!(outcome, AdoptionOutcome::Cached);
        assert_eq!(api.transport().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_found_with_null_non_identity_fields() {
        let api = fake_api();
        api.transport().respond(
            Method::GET,
            LOOKUP,
            ApiResponse::ok(json!({ "adoptions": [{
                "termCode": "2026SP",
                "crn": null,
                "costToStudent": null,
                "publisher": null,
                "deptCode": "SW",
                "courseCode": "685",
                "section": "MOL2",
                "itemScanCode": "111"
            }]})),
        );
        let mut cache = AdoptionCache::new();

        let outcome = ensure_adoption(&api, &record("MOL2", "111"), &mut cache).await;
        assert_eq!(outcome, AdoptionOutcome::Found);
        assert_eq!(api.transport().count(Method::POST, LOOKUP), 0);
    }

    #[tokio::test]
    async fn test_missing_adoption_created_once() {
        let api = fake_api();
        api.transport()
            .respond(Method::GET, LOOKUP, ApiResponse::ok(json!({ "adoptions": [] })))
            .respond(Method::POST, LOOKUP, ApiResponse::ok(json!({})));
        let mut cache = AdoptionCache::new();

        for _ in 0..5 {
            let outcome = ensure_adoption(&api, &record("MOL2", "111"), &mut cache).await;
            assert!(outcome.is_success());
        }

        assert_eq!(api.transport().count(Method::GET, LOOKUP), 1);
        assert_eq!(api.transport().count(Method::POST, LOOKUP), 1);

        let body = &api.transport().bodies(Method::POST, LOOKUP)[0];
        assert_eq!(body["itemScanCode"], "111");
        assert_eq!(body["costToStudent"], 0.0);
        assert!(body.get("studentId").is_none());
    }

    #[tokio::test]
    async fn test_lookup_sends_filters() {
        let api = fake_api();
        api.transport().respond(Method::POST, LOOKUP, ApiResponse::ok(json!({})));
        let mut cache = AdoptionCache::new();

        ensure_adoption(&api, &record("", "111"), &mut cache).await;

        let lookup = &api.transport().calls()[0];
        assert_eq!(lookup.method, Method::GET);
        assert!(lookup.query.contains(&("dept".to_string(), "SW".to_string())));
        assert!(lookup.query.contains(&("itemScanCode".to_string(), "111".to_string())));
        assert!(!lookup.query.iter().any(|(k, _)| k == "section"));
    }

    #[tokio::test]
    async fn test_non_200_lookup_falls_through_to_create() {
        let api = fake_api();
        api.transport()
            .respond(Method::GET, LOOKUP, ApiResponse::failed(404, "no adoptions"))
            .respond(Method::POST, LOOKUP, ApiResponse::ok(json!({})));
        let mut cache = AdoptionCache::new();

        let outcome = ensure_adoption(&api, &record("MOL2", "111"), &mut cache).await;
        assert_eq!(outcome, AdoptionOutcome::Created);
        assert!(cache.has("2026SP|SW|685|MOL2|111"));
    }

    #[tokio::test]
    async fn test_create_rejected_is_failure_and_not_cached() {
        let api = fake_api();
        api.transport()
            .respond(Method::POST, LOOKUP, ApiResponse::failed(400, "invalid isbn"));
        let mut cache = AdoptionCache::new();

        let outcome = ensure_adoption(&api, &record("MOL2", "111"), &mut cache).await;
        assert_eq!(outcome, AdoptionOutcome::Failed);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_transport_error_does_not_create() {
        let api = fake_api();
        api.transport().fail(Method::GET, LOOKUP, "connection reset");
        let mut cache = AdoptionCache::new();

        let outcome = ensure_adoption(&api, &record("MOL2", "111"), &mut cache).await;
        assert_eq!(outcome, AdoptionOutcome::Failed);
        assert_eq!(api.transport().count(Method::POST, LOOKUP), 0);
    }
}
