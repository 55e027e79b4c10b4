//! # Common Filter Vocabulary
//!
//! The value-filter family (the generic `value` filter, `event`, and every
//! filter that inherits from `value`) shares one schema and a few
//! enumerations. The assembler publishes these once under
//! `definitions.filters` and `definitions.filters_common`; filter plugins
//! refer to them by `$ref`.

use serde_json::{json, Value};

use crate::schema::TypeSchema;

/// Comparison operators accepted by value filters.
pub const OPERATORS: [&str; 20] = [
    "eq",
    "equal",
    "ne",
    "not-equal",
    "gt",
    "greater-than",
    "ge",
    "gte",
    "le",
    "lte",
    "lt",
    "less-than",
    "glob",
    "regex",
    "in",
    "ni",
    "not-in",
    "contains",
    "difference",
    "intersect",
];

/// Value transformations applied before comparison.
pub const VALUE_TYPES: [&str; 11] = [
    "age",
    "integer",
    "expiration",
    "normalize",
    "size",
    "cidr",
    "cidr_size",
    "swap",
    "resource_count",
    "expr",
    "unique_size",
];

/// Reference to the shared `value` filter schema.
pub const VALUE_FILTER_REF: &str = "#/definitions/filters/value";
/// Reference to the shared `event` filter schema.
pub const EVENT_FILTER_REF: &str = "#/definitions/filters/event";
/// Reference to the single key/value shorthand filter schema.
pub const VALUE_KV_FILTER_REF: &str = "#/definitions/filters/valuekv";

/// Schema of the generic `value` filter.
pub fn value_filter_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["type"],
        "properties": {
            "type": {"enum": ["value"]},
            "key": {"type": "string"},
            "value_type": {"$ref": "#/definitions/filters_common/value_types"},
            "default": {"type": "object"},
            "value_regex": {"type": "string"},
            "value_from": {"$ref": "#/definitions/filters_common/value_from"},
            "value": {"$ref": "#/definitions/filters_common/value"},
            "op": {"$ref": "#/definitions/filters_common/comparison_operators"}
        }
    })
}

/// Schema of the `event` filter: a value filter over the triggering event.
pub fn event_filter_schema() -> Value {
    TypeSchema::new("event").rinherit(&value_filter_schema()).build()
}

/// Schema of the generic age filter.
pub fn age_filter_schema() -> Value {
    TypeSchema::new("age")
        .property("days", json!({"type": "number"}))
        .property("hours", json!({"type": "number"}))
        .property("minutes", json!({"type": "number"}))
        .property("op", json!({"$ref": "#/definitions/filters_common/comparison_operators"}))
        .build()
}

/// Shorthand filter: a mapping with exactly one key/value pair.
pub fn value_kv_schema() -> Value {
    json!({
        "type": "object",
        "minProperties": 1,
        "maxProperties": 1
    })
}

/// Schema of an external value source (`value_from`).
pub fn value_from_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["url"],
        "properties": {
            "url": {"type": "string"},
            "format": {"enum": ["csv", "json", "txt", "csv2dict"]},
            "expr": {"oneOf": [{"type": "integer"}, {"type": "string"}]}
        }
    })
}

/// Schema of a comparison operand.
pub fn comparison_value_schema() -> Value {
    json!({
        "oneOf": [
            {"type": "array"},
            {"type": "string"},
            {"type": "boolean"},
            {"type": "number"},
            {"type": "null"}
        ]
    })
}
