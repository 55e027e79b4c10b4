//! # Fixed Definitions
//!
//! Fragments every assembled schema carries regardless of which plugins are
//! registered: the access-statement shape, the generic policy skeleton, the
//! max-resources shape, and the value-filter family from
//! [`custos_core::common`].

use custos_core::common::{
    age_filter_schema, comparison_value_schema, event_filter_schema, value_filter_schema, value_from_schema,
    value_kv_schema, OPERATORS, VALUE_TYPES,
};
use serde_json::{json, Value};

/// Pattern every policy name must match.
pub const POLICY_NAME_PATTERN: &str = "^[A-z][A-z0-9]*(-[A-z0-9]+)*$";

/// Shape of one statement in a resource access policy.
pub fn iam_statement() -> Value {
    let string_or_array = json!({"anyOf": [{"type": "string"}, {"type": "array"}]});
    let mut one_of = Vec::with_capacity(8);
    for principal in ["Principal", "NotPrincipal"] {
        for action in ["Action", "NotAction"] {
            for resource in ["Resource", "NotResource"] {
                one_of.push(json!({"required": [principal, action, resource]}));
            }
        }
    }

    json!({
        "additionalProperties": false,
        "type": "object",
        "properties": {
            "Sid": {"type": "string"},
            "Effect": {"type": "string", "enum": ["Allow", "Deny"]},
            "Principal": {"anyOf": [{"type": "string"}, {"type": "object"}, {"type": "array"}]},
            "NotPrincipal": {"anyOf": [{"type": "object"}, {"type": "array"}]},
            "Action": string_or_array,
            "NotAction": string_or_array,
            "Resource": string_or_array,
            "NotResource": string_or_array,
            "Condition": {"type": "object"}
        },
        "required": ["Sid", "Effect"],
        "oneOf": one_of
    })
}

/// Generic policy skeleton. Resource policies narrow `resource`, `filters`,
/// and `actions` on top of it.
pub fn policy() -> Value {
    json!({
        "type": "object",
        "required": ["name", "resource"],
        "additionalProperties": false,
        "properties": {
            "name": {"type": "string", "pattern": POLICY_NAME_PATTERN},
            "region": {"type": "string"},
            "tz": {"type": "string"},
            "start": {"format": "date-time"},
            "end": {"format": "date-time"},
            "resource": {"type": "string"},
            "max-resources": {"anyOf": [
                {"type": "integer", "minimum": 1},
                {"$ref": "#/definitions/max-resources-properties"}
            ]},
            "max-resources-percent": {"type": "number", "minimum": 0, "maximum": 100},
            "comment": {"type": "string"},
            "comments": {"type": "string"},
            "description": {"type": "string"},
            "tags": {"type": "array", "items": {"type": "string"}},
            "mode": {"$ref": "#/definitions/policy-mode"},
            "source": {"enum": ["describe", "config"]},
            "actions": {"type": "array"},
            "filters": {"type": "array"},
            "query": {"type": "array", "items": {"type": "object"}}
        }
    })
}

/// Object form of `max-resources`.
pub fn max_resources_properties() -> Value {
    json!({
        "type": "object",
        "properties": {
            "amount": {"type": "integer", "minimum": 1},
            "op": {"enum": ["or", "and"]},
            "percent": {"type": "number", "minimum": 0, "maximum": 100}
        }
    })
}

/// Seed of `definitions.filters`; aliased filters are added during assembly.
pub fn filters() -> Value {
    json!({
        "value": value_filter_schema(),
        "event": event_filter_schema(),
        "age": age_filter_schema(),
        "valuekv": value_kv_schema()
    })
}

/// `definitions.filters_common`.
pub fn filters_common() -> Value {
    json!({
        "comparison_operators": {"enum": OPERATORS},
        "value_types": {"enum": VALUE_TYPES},
        "value_from": value_from_schema(),
        "value": comparison_value_schema()
    })
}
