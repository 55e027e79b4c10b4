//! # Policy Binding
//!
//! Turns one policy mapping into live plugin instances: the resource type is
//! resolved through the catalog, then the policy's `filters` and `actions`
//! arrays are run through the resource type's registries with
//! [`PluginRegistry::parse`](crate::PluginRegistry::parse).
//!
//! Filters accept two shorthands that carry no `type` key:
//!
//! - `{"or": [...]}` (also `and`, `not`): a boolean group whose children are
//!   bound recursively.
//! - `{"tag:Owner": "absent"}`: a single key/value pair, bound as a `value`
//!   filter with `key` and `value` set.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::catalog::Catalog;
use crate::error::ConfigurationError;
use crate::plugin::Plugin;
use crate::registry::{ComponentRegistry, Instance};

/// Filter names that combine nested filters rather than match resources.
pub const BOOLEAN_FILTERS: [&str; 3] = ["or", "and", "not"];

/// What a bound plugin instance knows about its enclosing policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyContext {
    /// Policy name.
    pub policy: String,
    /// Qualified resource type.
    pub resource_type: String,
}

/// A filter or action bound to its policy.
pub type BoundComponent = Instance<dyn Plugin, Arc<PolicyContext>>;

/// A bound filter with the children of a boolean group.
#[derive(Debug)]
pub struct BoundFilter {
    /// The filter itself.
    pub instance: BoundComponent,
    /// Nested filters for `or`/`and`/`not`; empty otherwise.
    pub children: Vec<BoundFilter>,
}

/// A policy whose every filter and action resolved against the catalog.
#[derive(Debug)]
pub struct BoundPolicy {
    /// Shared context every instance is bound to.
    pub context: Arc<PolicyContext>,
    /// Filters in declaration order.
    pub filters: Vec<BoundFilter>,
    /// Actions in declaration order.
    pub actions: Vec<BoundComponent>,
}

/// Bind a policy mapping against the catalog.
///
/// # Errors
///
/// - [`ConfigurationError::UnknownResource`] when `resource` names no
///   registered resource type.
/// - Any [`PluginRegistry::factory`](crate::PluginRegistry::factory) error for
///   a filter or action declaration.
pub fn bind_policy(catalog: &Catalog, policy: &Value) -> Result<BoundPolicy, ConfigurationError> {
    let resource_name = policy.get("resource").and_then(Value::as_str).unwrap_or_default();
    let resource = catalog
        .resolve_resource(resource_name)
        .ok_or_else(|| ConfigurationError::UnknownResource {
            name: resource_name.to_string(),
            valid: catalog.qualified_names(),
        })?;

    let context = Arc::new(PolicyContext {
        policy: policy
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
        resource_type: resource.qualified_name(),
    });

    let filters = declarations(policy, "filters")
        .iter()
        .map(|f| bind_filter(resource.resource.filters(), f, &context))
        .collect::<Result<Vec<_>, _>>()?;
    let actions = resource
        .resource
        .actions()
        .parse(declarations(policy, "actions"), &context)?;

    Ok(BoundPolicy {
        context,
        filters,
        actions,
    })
}

fn declarations<'a>(policy: &'a Value, key: &str) -> &'a [Value] {
    policy
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn bind_filter(
    registry: &ComponentRegistry,
    data: &Value,
    context: &Arc<PolicyContext>,
) -> Result<BoundFilter, ConfigurationError> {
    let Some((key, value)) = shorthand(data) else {
        return Ok(BoundFilter {
            instance: registry.factory(data, context)?,
            children: Vec::new(),
        });
    };

    if BOOLEAN_FILTERS.contains(&key) {
        let children = value
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|child| bind_filter(registry, child, context))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(BoundFilter {
            instance: registry.factory(&json!({ "type": key }), context)?,
            children,
        });
    }

    let declaration = json!({ "type": "value", "key": key, "value": value });
    Ok(BoundFilter {
        instance: registry.factory(&declaration, context)?,
        children: Vec::new(),
    })
}

/// A single-entry mapping without a `type` key.
fn shorthand(data: &Value) -> Option<(&str, &Value)> {
    let map: &Map<String, Value> = data.as_object()?;
    if map.len() != 1 || map.contains_key("type") {
        return None;
    }
    map.iter().next().map(|(k, v)| (k.as_str(), v))
}
