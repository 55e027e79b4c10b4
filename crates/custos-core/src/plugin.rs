//! # Plugin Contract
//!
//! Every filter, action, and execution mode is a [`Plugin`]: it exposes the
//! JSON Schema fragment describing its own configuration, and whether that
//! fragment is a schema alias shared verbatim across resource types.
//!
//! The runtime behavior of a plugin (matching logic, side effects) lives
//! outside this workspace. Most built-ins are therefore plain [`Component`]
//! values: a schema plus the alias flag.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A schema-bearing component registered into a [`PluginRegistry`].
///
/// [`PluginRegistry`]: crate::PluginRegistry
pub trait Plugin: Send + Sync {
    /// JSON Schema fragment describing a valid configuration of this component.
    fn schema(&self) -> Value;

    /// Whether the fragment is shared across resource types under the
    /// component's registered name.
    ///
    /// Aliased fragments are stored once in the assembled schema's global
    /// definitions and referenced from every resource type that registers
    /// them. Every registration under one alias name must carry an identical
    /// fragment.
    fn schema_alias(&self) -> bool {
        false
    }
}

/// The category of component a registry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// Predicate over resources.
    Filter,
    /// Effect applied to matched resources.
    Action,
    /// Execution mode (polling, event triggers).
    Mode,
    /// Resource type within a provider.
    Resource,
    /// Cloud provider.
    Provider,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Filter => "filter",
            Self::Action => "action",
            Self::Mode => "mode",
            Self::Resource => "resource",
            Self::Provider => "provider",
        };
        f.write_str(s)
    }
}

/// A data-only plugin: a schema fragment and its alias flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    schema: Value,
    schema_alias: bool,
}

impl Component {
    /// A resource-local component; its schema is copied per resource type.
    pub fn new(schema: Value) -> Self {
        Self {
            schema,
            schema_alias: false,
        }
    }

    /// A schema-alias component; its schema is stored once, by name.
    pub fn shared(schema: Value) -> Self {
        Self {
            schema,
            schema_alias: true,
        }
    }
}

impl Plugin for Component {
    fn schema(&self) -> Value {
        self.schema.clone()
    }

    fn schema_alias(&self) -> bool {
        self.schema_alias
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_component_alias_flag() {
        let local = Component::new(json!({"type": "object"}));
        let shared = Component::shared(json!({"type": "object"}));
        assert!(!local.schema_alias());
        assert!(shared.schema_alias());
        assert_eq!(local.schema(), shared.schema());
    }

    #[test]
    fn test_component_kind_display() {
        assert_eq!(ComponentKind::Filter.to_string(), "filter");
        assert_eq!(ComponentKind::Mode.to_string(), "mode");
    }
}
