//! # Plugin Registry
//!
//! A name → component catalog. One registry type serves filters, actions,
//! execution modes, resource types, and providers.
//!
//! ## Re-registration
//!
//! Registering an existing name replaces the binding (last write wins) and
//! logs a warning. Registries built with [`DuplicatePolicy::Reject`] refuse
//! the second binding instead.
//!
//! ## Ordering
//!
//! Entries are kept in a `BTreeMap`, so iteration is sorted by name. Callers
//! must not attach meaning to that order; it only keeps output stable.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigurationError;
use crate::plugin::{ComponentKind, Plugin};

/// What a registry does when a name is registered twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Replace the existing binding and log a warning.
    #[default]
    Overwrite,
    /// Fail with [`ConfigurationError::DuplicateRegistration`].
    Reject,
}

/// A registry of schema-bearing plugins (filters, actions, modes).
pub type ComponentRegistry = PluginRegistry<dyn Plugin>;

/// Name-keyed catalog of shared components.
pub struct PluginRegistry<P: ?Sized> {
    kind: ComponentKind,
    on_duplicate: DuplicatePolicy,
    entries: BTreeMap<String, Arc<P>>,
    revision: u64,
}

impl<P: ?Sized> PluginRegistry<P> {
    /// Create an empty registry for one component kind.
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            on_duplicate: DuplicatePolicy::default(),
            entries: BTreeMap::new(),
            revision: 0,
        }
    }

    /// Set the re-registration policy.
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.on_duplicate = policy;
        self
    }

    /// The component kind this registry holds.
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// The re-registration policy in force.
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.on_duplicate
    }

    /// Bind `name` to `component`, returning the binding it replaced.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::DuplicateRegistration`] if `name` is
    /// already bound and the registry rejects duplicates.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        component: Arc<P>,
    ) -> Result<Option<Arc<P>>, ConfigurationError> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            match self.on_duplicate {
                DuplicatePolicy::Reject => {
                    return Err(ConfigurationError::DuplicateRegistration {
                        kind: self.kind,
                        name,
                    });
                }
                DuplicatePolicy::Overwrite => {
                    tracing::warn!(kind = %self.kind, name = %name, "replacing existing registration");
                }
            }
        }
        self.revision += 1;
        Ok(self.entries.insert(name, component))
    }

    /// Look up a component by name.
    pub fn get(&self, name: &str) -> Option<&Arc<P>> {
        self.entries.get(name)
    }

    /// Whether `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All registered names.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// All `(name, component)` bindings.
    pub fn items(&self) -> impl Iterator<Item = (&str, &Arc<P>)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Bindings with each distinct component yielded once.
    ///
    /// A component registered under several names (aliases) is yielded under
    /// the first name in iteration order only.
    pub fn distinct_items(&self) -> Vec<(&str, &Arc<P>)> {
        let mut seen = HashSet::new();
        self.items()
            .filter(|(_, component)| seen.insert(component_id(component)))
            .collect()
    }

    /// Number of bindings (aliases counted separately).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no bindings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count of successful registrations; grows on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl<P: ?Sized + Plugin> PluginRegistry<P> {
    /// Resolve one declaration and bind it to `context`.
    ///
    /// A declaration is either a bare name (`"delete"`) or a mapping whose
    /// `type` key names the component (`{"type": "tag", "key": "owner"}`).
    /// The mapping becomes the instance configuration.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::MissingType`] when a mapping has no string `type`.
    /// - [`ConfigurationError::UnknownType`] when the name is not registered;
    ///   the error lists every valid name.
    /// - [`ConfigurationError::InvalidDeclaration`] for any other JSON value.
    pub fn factory<C: Clone>(
        &self,
        data: &Value,
        context: &C,
    ) -> Result<Instance<P, C>, ConfigurationError> {
        let (type_name, config) = match data {
            Value::String(name) => (name.clone(), Map::new()),
            Value::Object(map) => match map.get("type").and_then(Value::as_str) {
                Some(name) => (name.to_string(), map.clone()),
                None => {
                    return Err(ConfigurationError::MissingType {
                        kind: self.kind,
                        data: data.to_string(),
                    });
                }
            },
            other => {
                return Err(ConfigurationError::InvalidDeclaration {
                    kind: self.kind,
                    data: other.to_string(),
                });
            }
        };

        let plugin = self
            .get(&type_name)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownType {
                kind: self.kind,
                name: type_name.clone(),
                valid: self.keys().map(str::to_string).collect(),
            })?;

        Ok(Instance {
            type_name,
            data: config,
            plugin,
            context: context.clone(),
        })
    }

    /// Resolve an ordered list of declarations, preserving order.
    ///
    /// # Errors
    ///
    /// Fails on the first declaration [`factory`](Self::factory) rejects.
    pub fn parse<C: Clone>(
        &self,
        data: &[Value],
        context: &C,
    ) -> Result<Vec<Instance<P, C>>, ConfigurationError> {
        data.iter().map(|d| self.factory(d, context)).collect()
    }
}

impl<P: ?Sized> fmt::Debug for PluginRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("kind", &self.kind)
            .field("on_duplicate", &self.on_duplicate)
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .field("revision", &self.revision)
            .finish()
    }
}

/// A registered component bound to configuration and a context.
pub struct Instance<P: ?Sized, C> {
    /// Name the declaration resolved through.
    pub type_name: String,
    /// Configuration mapping; empty for bare-name declarations.
    pub data: Map<String, Value>,
    /// The registered component.
    pub plugin: Arc<P>,
    /// Context the instance is bound to.
    pub context: C,
}

impl<P: ?Sized, C: fmt::Debug> fmt::Debug for Instance<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name)
            .field("data", &self.data)
            .field("context", &self.context)
            .finish()
    }
}

/// Identity of the allocation behind an `Arc`, ignoring vtable metadata.
fn component_id<P: ?Sized>(component: &Arc<P>) -> usize {
    Arc::as_ptr(component) as *const () as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::Component;
    use serde_json::json;

    fn component(name: &str) -> Arc<dyn Plugin> {
        Arc::new(Component::new(json!({"properties": {"type": {"enum": [name]}}})))
    }

    fn actions() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new(ComponentKind::Action);
        registry.register("delete", component("delete")).unwrap();
        registry.register("tag", component("tag")).unwrap();
        registry
    }

    #[test]
    fn test_register_and_get() {
        let registry = actions();
        assert!(registry.get("delete").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["delete", "tag"]);
    }

    #[test]
    fn test_overwrite_replaces_binding() {
        let mut registry = actions();
        let replacement = component("delete-v2");
        let previous = registry.register("delete", replacement.clone()).unwrap();
        assert!(previous.is_some());
        assert!(Arc::ptr_eq(registry.get("delete").unwrap(), &replacement));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_reject_policy_refuses_duplicate() {
        let mut registry =
            ComponentRegistry::new(ComponentKind::Filter).with_duplicate_policy(DuplicatePolicy::Reject);
        registry.register("value", component("value")).unwrap();
        let err = registry.register("value", component("value")).err().unwrap();
        assert_eq!(
            err,
            ConfigurationError::DuplicateRegistration {
                kind: ComponentKind::Filter,
                name: "value".to_string(),
            }
        );
        assert_eq!(registry.revision(), 1);
    }

    #[test]
    fn test_revision_counts_registrations() {
        let mut registry = actions();
        assert_eq!(registry.revision(), 2);
        registry.register("tag", component("tag")).unwrap();
        assert_eq!(registry.revision(), 3);
    }

    #[test]
    fn test_distinct_items_skips_aliases() {
        let mut registry = ComponentRegistry::new(ComponentKind::Action);
        let tag = component("tag");
        registry.register("tag", tag.clone()).unwrap();
        registry.register("mark", tag).unwrap();
        registry.register("delete", component("delete")).unwrap();
        let names: Vec<&str> = registry.distinct_items().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["delete", "mark"]);
    }

    #[test]
    fn test_factory_bare_name() {
        let registry = actions();
        let instance = registry.factory(&json!("delete"), &"ctx").unwrap();
        assert_eq!(instance.type_name, "delete");
        assert!(instance.data.is_empty());
        assert_eq!(instance.context, "ctx");
    }

    #[test]
    fn test_factory_mapping_keeps_configuration() {
        let registry = actions();
        let instance = registry
            .factory(&json!({"type": "tag", "key": "owner"}), &())
            .unwrap();
        assert_eq!(instance.type_name, "tag");
        assert_eq!(instance.data["key"], "owner");
    }

    #[test]
    fn test_factory_missing_type() {
        let registry = actions();
        let err = registry.factory(&json!({"key": "owner"}), &()).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingType { .. }));
    }

    #[test]
    fn test_factory_unknown_type_lists_valid_names() {
        let registry = actions();
        let err = registry.factory(&json!({"type": "explode"}), &()).unwrap_err();
        match err {
            ConfigurationError::UnknownType { name, valid, .. } => {
                assert_eq!(name, "explode");
                assert_eq!(valid, vec!["delete".to_string(), "tag".to_string()]);
            }
            other => panic!("Expected UnknownType, got: {other}"),
        }
    }

    #[test]
    fn test_factory_rejects_non_declaration() {
        let registry = actions();
        let err = registry.factory(&json!(42), &()).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidDeclaration { .. }));
    }

    #[test]
    fn test_parse_preserves_order() {
        let registry = actions();
        let instances = registry
            .parse(&[json!("tag"), json!({"type": "delete"}), json!("tag")], &())
            .unwrap();
        let names: Vec<&str> = instances.iter().map(|i| i.type_name.as_str()).collect();
        assert_eq!(names, vec!["tag", "delete", "tag"]);
    }
}
