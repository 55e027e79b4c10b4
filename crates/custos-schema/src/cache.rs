//! # Schema Cache
//!
//! Assembly walks every plugin in the catalog, so callers that validate many
//! documents keep the result. Entries are keyed by the catalog revision and
//! the requested resource-type filter; any registration bumps the revision
//! and invalidates every entry.
//!
//! The `custos` CLI holds one cache per process and takes every schema it
//! dumps or validates against from it.

use std::collections::HashMap;
use std::sync::Arc;

use custos_core::{Catalog, ConfigurationError};
use serde_json::Value;

use crate::assemble::SchemaAssembler;

/// Assembled schemas of one catalog.
#[derive(Debug, Default)]
pub struct SchemaCache {
    revision: Option<u64>,
    entries: HashMap<Vec<String>, Arc<Value>>,
}

impl SchemaCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The schema for `resource_types`, assembling it on a miss.
    ///
    /// # Errors
    ///
    /// Propagates assembly errors; nothing is cached on failure.
    pub fn get_or_generate(
        &mut self,
        catalog: &Catalog,
        resource_types: &[&str],
    ) -> Result<Arc<Value>, ConfigurationError> {
        let revision = catalog.revision();
        if self.revision != Some(revision) {
            if self.revision.is_some() {
                tracing::debug!(revision, "catalog changed, dropping cached schemas");
            }
            self.entries.clear();
            self.revision = Some(revision);
        }

        let mut key: Vec<String> = resource_types.iter().map(|s| s.to_string()).collect();
        key.sort_unstable();
        key.dedup();
        if let Some(schema) = self.entries.get(&key) {
            return Ok(Arc::clone(schema));
        }

        let schema = Arc::new(SchemaAssembler::new(catalog).generate(resource_types)?);
        self.entries.insert(key, Arc::clone(&schema));
        Ok(schema)
    }

    /// Number of cached schemas.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
