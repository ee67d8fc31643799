//! Term mapping regeneration from the API's term list.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use optsync_api::{AdminApi, Transport};
use optsync_core::term::write_mapping;
use optsync_core::{TermCodeMapping, TermList, TermMappingCache};

const DESCRIPTION: &str = "Maps CSV term names to Watchman API term codes";

/// Build `name -> code` for every term that has both.
pub fn build_mapping(terms: &TermList) -> TermCodeMapping {
    let mappings: BTreeMap<String, String> = terms
        .terms
        .iter()
        .filter(|term| !term.name.is_empty() && !term.code.is_empty())
        .map(|term| (term.name.clone(), term.code.clone()))
        .collect();

    TermCodeMapping {
        description: Some(DESCRIPTION.to_string()),
        mappings,
    }
}

/// Fetch the term list, write the mapping file and drop the cached mapping.
pub async fn refresh_mapping<T: Transport>(
    api: &AdminApi<T>,
    path: &Path,
    cache: &mut TermMappingCache,
) -> Result<TermCodeMapping> {
    let mapping = regenerate_mapping(api, path).await?;
    cache.clear();
    Ok(mapping)
}

/// Fetch the term list and write the mapping file.
pub async fn regenerate_mapping<T: Transport>(api: &AdminApi<T>, path: &Path) -> Result<TermCodeMapping> {
    let response = api.term_list().await.context("Failed to fetch term list")?;

    if let Some(error) = &response.error {
        anyhow::bail!("Term list fetch failed: {} - {}", response.status, error);
    }

    let terms: TermList = response
        .data_as()
        .context("Invalid response format: expected terms array")?;

    let mapping = build_mapping(&terms);
    write_mapping(path, &mapping)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), entries = mapping.len(), "Wrote term mappings");
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fake_api;
    use optsync_api::{ApiResponse, Method};
    use serde_json::json;

    const TERM_LIST: &str = "/bursar_billing/v1/term/list";

    #[tokio::test]
    async fn test_refresh_writes_file_and_clears_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("term-code-mapping.json");
        std::fs::write(&path, r#"{"mappings": {"Old Term": "OLD"}}"#).unwrap();

        let mut cache = TermMappingCache::new();
        let old = cache.load(Some(&path)).unwrap();
        assert_eq!(old.resolve("Old Term"), Some("OLD"));

        let api = fake_api();
        api.transport().respond(
            Method::GET,
            TERM_LIST,
            ApiResponse::ok(json!({ "terms": [
                { "code": "2026SP", "name": "Spring 2026" },
                { "code": "2025FA", "name": "Fall 2025" },
                { "code": "", "name": "Broken" }
            ]})),
        );

        let mapping = refresh_mapping(&api, &path, &mut cache).await.unwrap();
        assert_eq!(mapping.len(), 2);
        assert!(!cache.is_loaded());

        let reloaded = cache.load(Some(&path)).unwrap();
        assert_eq!(reloaded.resolve("Spring 2026"), Some("2026SP"));
        assert_eq!(reloaded.resolve("Old Term"), None);
        assert!(reloaded.description.is_some());
    }

    #[tokio::test]
    async fn test_regenerate_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("term-code-mapping.json");

        let api = fake_api();
        api.transport().respond(
            Method::GET,
            TERM_LIST,
            ApiResponse::ok(json!({ "terms": [{ "code": "2026SU", "name": "Summer 2026" }] })),
        );

        regenerate_mapping(&api, &path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.ends_with('\n'));
        let mapping = TermCodeMapping::from_json(&written).unwrap();
        assert_eq!(mapping.resolve("Summer 2026"), Some("2026SU"));
    }

    #[tokio::test]
    async fn test_refresh_rejects_bad_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("term-code-mapping.json");

        let api = fake_api();
        api.transport()
            .respond(Method::GET, TERM_LIST, ApiResponse::ok(json!({ "items": [] })));

        let err = refresh_mapping(&api, &path, &mut TermMappingCache::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("expected terms array"));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_refresh_surfaces_error_body() {
        let dir = tempfile::tempdir().unwrap();
        let api = fake_api();
        api.transport()
            .respond(Method::GET, TERM_LIST, ApiResponse::failed(503, "maintenance"));

        let err = refresh_mapping(&api, &dir.path().join("m.json"), &mut TermMappingCache::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("maintenance"));
    }
}
