//! Fluent construction of resource types with the default registry members.

use std::sync::Arc;

use custos_core::{ConfigurationError, DuplicatePolicy, Plugin, ResourceType, BOOLEAN_FILTERS};
use serde_json::Value;

use crate::{actions, filters};

/// Builds one [`ResourceType`].
///
/// Every resource starts with the `value`, `event`, `or`, `and`, and `not`
/// filters and the `notify` action.
pub(crate) struct ResourceBuilder {
    resource: ResourceType,
}

impl ResourceBuilder {
    pub(crate) fn new(name: &str, on_duplicate: DuplicatePolicy) -> Result<Self, ConfigurationError> {
        let mut resource = ResourceType::new(name, on_duplicate);
        resource.register_filter("value", filters::value())?;
        resource.register_filter("event", filters::event())?;
        for op in BOOLEAN_FILTERS {
            resource.register_filter(op, filters::boolean_group(op))?;
        }
        resource.register_action("notify", actions::notify())?;
        Ok(Self { resource })
    }

    pub(crate) fn filter(mut self, name: &str, filter: Arc<dyn Plugin>) -> Result<Self, ConfigurationError> {
        self.resource.register_filter(name, filter)?;
        Ok(self)
    }

    pub(crate) fn action(mut self, name: &str, action: Arc<dyn Plugin>) -> Result<Self, ConfigurationError> {
        self.resource.register_action(name, action)?;
        Ok(self)
    }

    /// Register one action under several names.
    pub(crate) fn action_aliases(
        mut self,
        names: &[&str],
        action: Arc<dyn Plugin>,
    ) -> Result<Self, ConfigurationError> {
        for name in names {
            self.resource.register_action(*name, Arc::clone(&action))?;
        }
        Ok(self)
    }

    pub(crate) fn policy_property(mut self, name: &str, schema: Value) -> Self {
        self.resource = self.resource.with_policy_property(name, schema);
        self
    }

    pub(crate) fn build(self) -> ResourceType {
        self.resource
    }
}
