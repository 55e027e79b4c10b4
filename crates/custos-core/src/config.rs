//! # Engine Configuration
//!
//! Settings that shape catalog population and schema assembly. All fields
//! have defaults, so an empty YAML mapping is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::registry::DuplicatePolicy;

/// Provider whose resource types also accept their unqualified name.
pub const DEFAULT_PRIMARY_PROVIDER: &str = "aws";

/// `id` of the assembled schema document.
pub const DEFAULT_SCHEMA_ID: &str = "https://schema.custos.dev/v0/custos.json";

/// Engine-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Provider whose resource types may be named without qualification.
    pub primary_provider: String,
    /// `id` written into the assembled schema.
    pub schema_id: String,
    /// Re-registration policy applied to every registry in the catalog.
    pub on_duplicate: DuplicatePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            primary_provider: DEFAULT_PRIMARY_PROVIDER.to_string(),
            schema_id: DEFAULT_SCHEMA_ID.to_string(),
            on_duplicate: DuplicatePolicy::Overwrite,
        }
    }
}
