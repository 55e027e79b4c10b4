//! # Standard Filters
//!
//! Filter plugins shared by the built-in resource types. Filters that
//! inherit from the value filter copy its schema (`rinherit`) and keep its
//! `$ref`s into `definitions.filters_common`.

use std::sync::Arc;

use custos_core::common::{event_filter_schema, value_filter_schema, VALUE_FILTER_REF, VALUE_KV_FILTER_REF};
use custos_core::{Component, Plugin, TypeSchema};
use serde_json::json;

/// The generic value filter.
pub fn value() -> Arc<dyn Plugin> {
    Arc::new(Component::new(value_filter_schema()))
}

/// Value filter over the triggering event.
pub fn event() -> Arc<dyn Plugin> {
    Arc::new(Component::new(event_filter_schema()))
}

/// Boolean combinator (`or`, `and`, `not`) over nested filters.
pub fn boolean_group(op: &str) -> Arc<dyn Plugin> {
    Arc::new(Component::new(json!({
        "type": "object",
        "additionalProperties": false,
        "required": [op],
        "properties": {op: {"type": "array"}}
    })))
}

/// Filter matching attributes of a related resource (subnet, vpc, key).
pub fn related(name: &str) -> Arc<dyn Plugin> {
    Arc::new(Component::new(
        TypeSchema::new(name)
            .rinherit(&value_filter_schema())
            .property("match-resource", json!({"type": "boolean"}))
            .property("operator", json!({"enum": ["and", "or"]}))
            .build(),
    ))
}

/// Value filter over a resource's status document.
pub fn status() -> Arc<dyn Plugin> {
    Arc::new(Component::new(
        TypeSchema::new("status").rinherit(&value_filter_schema()).build(),
    ))
}

/// Whether a trail is a shadow copy from another region.
pub fn is_shadow() -> Arc<dyn Plugin> {
    Arc::new(Component::new(
        TypeSchema::new("is-shadow")
            .property("state", json!({"type": "boolean"}))
            .build(),
    ))
}

/// Asserts the absence of resources matched by an embedded policy.
pub fn missing() -> Arc<dyn Plugin> {
    Arc::new(Component::new(
        TypeSchema::new("missing")
            .property("policy", json!({"type": "object"}))
            .required(&["policy"])
            .build(),
    ))
}

/// Whether a resource has been locked through an external lock service.
pub fn locked() -> Arc<dyn Plugin> {
    Arc::new(Component::new(
        TypeSchema::new("locked")
            .property("role", json!({"type": "string"}))
            .property("endpoint", json!({"type": "string"}))
            .property("region", json!({"type": "string"}))
            .required(&["endpoint"])
            .build(),
    ))
}

/// Compliance with one or more config rules; shared across resource types.
pub fn config_compliance() -> Arc<dyn Plugin> {
    Arc::new(Component::shared(
        TypeSchema::new("config-compliance")
            .property("op", json!({"enum": ["or", "and"]}))
            .property(
                "eval_filters",
                json!({
                    "type": "array",
                    "items": {"oneOf": [
                        {"$ref": VALUE_KV_FILTER_REF},
                        {"$ref": VALUE_FILTER_REF}
                    ]}
                }),
            )
            .property(
                "states",
                json!({
                    "type": "array",
                    "items": {"enum": [
                        "COMPLIANT", "NON_COMPLIANT", "NOT_APPLICABLE", "INSUFFICIENT_DATA"
                    ]}
                }),
            )
            .property("rules", json!({"type": "array", "items": {"type": "string"}}))
            .required(&["rules"])
            .build(),
    ))
}

/// Security findings related to a resource; shared across resource types.
pub fn finding() -> Arc<dyn Plugin> {
    Arc::new(Component::shared(
        TypeSchema::new("finding")
            .property("region", json!({"type": "string"}))
            .property("query", json!({"type": "object"}))
            .build(),
    ))
}
