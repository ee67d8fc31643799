//! Term code resolution.
//!
//! CSV exports label terms in free text ("Spring 2026"); the API wants its own
//! codes. The mapping lives in `term-code-mapping.json`, regenerated from the
//! API's term list with `optsync terms-map`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{CoreError, CoreResult};

/// Default location of the mapping file, relative to the working directory.
pub const DEFAULT_MAPPING_PATH: &str = "data/term-code-mapping.json";

/// Free-text term label to canonical API term code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCodeMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub mappings: BTreeMap<String, String>,
}

impl TermCodeMapping {
    /// Parse and validate a mapping document.
    pub fn from_json(content: &str) -> CoreResult<Self> {
        let value: Value = serde_json::from_str(content)?;

        match value.get("mappings") {
            Some(Value::Object(_)) => {}
            _ => {
                return Err(CoreError::invalid_mapping(
                    "missing or invalid 'mappings' object",
                ))
            }
        }

        serde_json::from_value(value).map_err(|e| CoreError::invalid_mapping(e.to_string()))
    }

    /// Exact, case-sensitive lookup. No trimming or fuzzy matching.
    pub fn resolve(&self, label: &str) -> Option<&str> {
        self.mappings.get(label).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// Resolve a term label against a mapping.
pub fn resolve<'m>(label: &str, mapping: &'m TermCodeMapping) -> Option<&'m str> {
    mapping.resolve(label)
}

/// Load-once holder for the term mapping.
///
/// The first successful [`load`](Self::load) is kept and handed out again on
/// every later call until [`clear`](Self::clear).
#[derive(Debug, Default)]
pub struct TermMappingCache {
    cached: Option<Arc<TermCodeMapping>>,
}

impl TermMappingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached mapping, loading it from `path` (or the default
    /// location) on first use.
    pub fn load(&mut self, path: Option<&Path>) -> CoreResult<Arc<TermCodeMapping>> {
        if let Some(mapping) = &self.cached {
            return Ok(Arc::clone(mapping));
        }

        let path: PathBuf = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MAPPING_PATH));

        if !path.exists() {
            return Err(CoreError::MappingNotFound { path });
        }

        let content = std::fs::read_to_string(&path)?;
        let mapping = Arc::new(TermCodeMapping::from_json(&content)?);
        debug!(path = %path.display(), entries = mapping.len(), "Loaded term code mapping");

        self.cached = Some(Arc::clone(&mapping));
        Ok(mapping)
    }

    /// Drop the cached mapping so the next load reads the file again.
    pub fn clear(&mut self) {
        self.cached = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.is_some()
    }
}

/// Write a mapping document as pretty JSON with a trailing newline.
pub fn write_mapping(path: &Path, mapping: &TermCodeMapping) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut json = serde_json::to_string_pretty(mapping)?;
    json.push('\n');
    std::fs::write(path, json)?;
    Ok(())
}
