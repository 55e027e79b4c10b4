//! # Resource Types and Providers
//!
//! A [`ResourceType`] owns its filter and action vocabularies. A
//! [`Provider`] owns its resource types. Both are registered behind `Arc`
//! and are read-only from then on.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::ConfigurationError;
use crate::plugin::{ComponentKind, Plugin};
use crate::registry::{ComponentRegistry, DuplicatePolicy, PluginRegistry};

/// A class of governed entities within one provider.
#[derive(Debug)]
pub struct ResourceType {
    name: String,
    filters: ComponentRegistry,
    actions: ComponentRegistry,
    policy_properties: Map<String, Value>,
}

impl ResourceType {
    /// Create a resource type with empty filter and action registries.
    pub fn new(name: impl Into<String>, on_duplicate: DuplicatePolicy) -> Self {
        Self {
            name: name.into(),
            filters: ComponentRegistry::new(ComponentKind::Filter).with_duplicate_policy(on_duplicate),
            actions: ComponentRegistry::new(ComponentKind::Action).with_duplicate_policy(on_duplicate),
            policy_properties: Map::new(),
        }
    }

    /// Unqualified type name, e.g. `cloudtrail`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filters valid in policies for this resource type.
    pub fn filters(&self) -> &ComponentRegistry {
        &self.filters
    }

    /// Actions valid in policies for this resource type.
    pub fn actions(&self) -> &ComponentRegistry {
        &self.actions
    }

    /// Register a filter.
    ///
    /// # Errors
    ///
    /// Propagates the registry's duplicate policy.
    pub fn register_filter(
        &mut self,
        name: impl Into<String>,
        filter: Arc<dyn Plugin>,
    ) -> Result<(), ConfigurationError> {
        self.filters.register(name, filter).map(|_| ())
    }

    /// Register an action.
    ///
    /// # Errors
    ///
    /// Propagates the registry's duplicate policy.
    pub fn register_action(
        &mut self,
        name: impl Into<String>,
        action: Arc<dyn Plugin>,
    ) -> Result<(), ConfigurationError> {
        self.actions.register(name, action).map(|_| ())
    }

    /// Policy-level properties specific to this type. The assembler admits
    /// their names in the policy skeleton and constrains their values only in
    /// this type's policy schema.
    pub fn policy_properties(&self) -> &Map<String, Value> {
        &self.policy_properties
    }

    /// Accept an extra policy-level property for this type.
    pub fn with_policy_property(mut self, name: impl Into<String>, schema: Value) -> Self {
        self.policy_properties.insert(name.into(), schema);
        self
    }
}

/// A cloud provider and the resource types it declares.
#[derive(Debug)]
pub struct Provider {
    name: String,
    resources: PluginRegistry<ResourceType>,
}

impl Provider {
    /// Create a provider with no resource types.
    pub fn new(name: impl Into<String>, on_duplicate: DuplicatePolicy) -> Self {
        Self {
            name: name.into(),
            resources: PluginRegistry::new(ComponentKind::Resource).with_duplicate_policy(on_duplicate),
        }
    }

    /// Provider name, e.g. `aws`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resource types keyed by unqualified name.
    pub fn resources(&self) -> &PluginRegistry<ResourceType> {
        &self.resources
    }

    /// Register a fully built resource type under its own name.
    ///
    /// # Errors
    ///
    /// Propagates the registry's duplicate policy.
    pub fn register_resource(&mut self, resource: ResourceType) -> Result<(), ConfigurationError> {
        let name = resource.name().to_string();
        self.resources.register(name, Arc::new(resource)).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::Component;
    use serde_json::json;

    #[test]
    fn test_resource_registries_are_independent() {
        let mut resource = ResourceType::new("queue", DuplicatePolicy::Overwrite);
        resource
            .register_filter("value", Arc::new(Component::new(json!({}))))
            .unwrap();
        resource
            .register_action("delete", Arc::new(Component::new(json!({}))))
            .unwrap();
        assert!(resource.filters().contains("value"));
        assert!(!resource.actions().contains("value"));
        assert_eq!(resource.filters().revision(), 1);
    }

    #[test]
    fn test_provider_registers_under_resource_name() {
        let mut resource = ResourceType::new("queue", DuplicatePolicy::Overwrite);
        resource
            .register_action("delete", Arc::new(Component::new(json!({}))))
            .unwrap();
        let mut provider = Provider::new("aws", DuplicatePolicy::Overwrite);
        provider.register_resource(resource).unwrap();
        assert_eq!(provider.resources().revision(), 1);
        assert!(provider.resources().contains("queue"));
    }

    #[test]
    fn test_policy_properties() {
        let resource = ResourceType::new("instance", DuplicatePolicy::Overwrite)
            .with_policy_property("query", json!({}));
        assert!(resource.policy_properties().contains_key("query"));
    }
}
