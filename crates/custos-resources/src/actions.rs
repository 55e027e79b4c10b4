//! # Standard Actions
//!
//! Action plugins used by the built-in resource types. Actions registered
//! under several names (`tag` / `mark`) share one `Arc`, so the assembler
//! emits their schema once.

use std::sync::Arc;

use custos_core::{Component, Plugin, TypeSchema};
use serde_json::{json, Value};

const VALUE_FROM_REF: &str = "#/definitions/filters_common/value_from";
const IAM_STATEMENT_REF: &str = "#/definitions/iam-statement";

fn string_array() -> Value {
    json!({"type": "array", "items": {"type": "string"}})
}

/// Send a notification through a message transport.
///
/// Either `to` or `to_from` must name the recipients.
pub fn notify() -> Arc<dyn Plugin> {
    Arc::new(Component::new(json!({
        "type": "object",
        "anyOf": [
            {"required": ["type", "transport", "to"]},
            {"required": ["type", "transport", "to_from"]}
        ],
        "properties": {
            "type": {"enum": ["notify"]},
            "to": string_array(),
            "owner_absent_contact": string_array(),
            "to_from": {"$ref": VALUE_FROM_REF},
            "cc": string_array(),
            "cc_from": {"$ref": VALUE_FROM_REF},
            "cc_manager": {"type": "boolean"},
            "from": {"type": "string"},
            "subject": {"type": "string"},
            "template": {"type": "string"},
            "assume_role": {"type": "boolean"},
            "transport": {
                "oneOf": [
                    {
                        "type": "object",
                        "required": ["type", "queue"],
                        "properties": {
                            "queue": {"type": "string"},
                            "type": {"enum": ["sqs"]}
                        }
                    },
                    {
                        "type": "object",
                        "required": ["type", "topic"],
                        "properties": {
                            "topic": {"type": "string"},
                            "type": {"enum": ["sns"]}
                        }
                    }
                ]
            }
        }
    })))
}

/// Add tags. Registered as both `tag` and `mark`.
pub fn tag() -> Arc<dyn Plugin> {
    Arc::new(Component::new(
        TypeSchema::new("tag")
            .alias("mark")
            .property("tags", json!({"type": "object"}))
            .property("key", json!({"type": "string"}))
            .property("value", json!({"type": "string"}))
            .property("tag", json!({"type": "string"}))
            .build(),
    ))
}

/// Remove tags. Registered as `remove-tag`, `unmark`, and `untag`.
pub fn remove_tag() -> Arc<dyn Plugin> {
    Arc::new(Component::new(
        TypeSchema::new("remove-tag")
            .alias("unmark")
            .alias("untag")
            .property("tags", string_array())
            .build(),
    ))
}

/// Delete the resource.
pub fn delete() -> Arc<dyn Plugin> {
    Arc::new(Component::new(TypeSchema::new("delete").build()))
}

/// Delete with an optional forced cascade.
pub fn force_delete() -> Arc<dyn Plugin> {
    Arc::new(Component::new(
        TypeSchema::new("delete")
            .property("force", json!({"type": "boolean"}))
            .build(),
    ))
}

/// Invoke a serverless function with the matched resources.
pub fn invoke_lambda() -> Arc<dyn Plugin> {
    Arc::new(Component::shared(
        TypeSchema::new("invoke-lambda")
            .property("function", json!({"type": "string"}))
            .property("region", json!({"type": "string"}))
            .property("async", json!({"type": "boolean"}))
            .property("qualifier", json!({"type": "string"}))
            .property("batch_size", json!({"type": "integer"}))
            .property("timeout", json!({"type": "integer"}))
            .property("vars", json!({"type": "object"}))
            .required(&["function"])
            .build(),
    ))
}

/// Add or remove statements of a resource policy.
pub fn modify_policy() -> Arc<dyn Plugin> {
    Arc::new(Component::shared(
        TypeSchema::new("modify-policy")
            .property(
                "add-statements",
                json!({"type": "array", "items": {"$ref": IAM_STATEMENT_REF}}),
            )
            .property(
                "remove-statements",
                json!({
                    "type": ["array", "string"],
                    "oneOf": [
                        {"enum": ["matched", "*"]},
                        {"type": "array", "items": {"type": "string"}}
                    ]
                }),
            )
            .build(),
    ))
}

/// Remove statements from a resource policy.
pub fn remove_statements() -> Arc<dyn Plugin> {
    Arc::new(Component::new(
        TypeSchema::new("remove-statements")
            .property(
                "statement_ids",
                json!({
                    "oneOf": [
                        {"enum": ["matched", "*"]},
                        {"type": "array", "items": {"type": "string"}}
                    ]
                }),
            )
            .required(&["statement_ids"])
            .build(),
    ))
}

/// Report matched resources as security findings.
pub fn post_finding() -> Arc<dyn Plugin> {
    Arc::new(Component::shared(
        TypeSchema::new("post-finding")
            .property("title", json!({"type": "string"}))
            .property("description", json!({"type": "string"}))
            .property("severity", json!({"type": "number", "default": 0}))
            .property("severity_normalized", json!({"type": "number", "min": 0, "max": 100}))
            .property("confidence", json!({"type": "number", "min": 0, "max": 100}))
            .property("criticality", json!({"type": "number", "min": 0, "max": 100}))
            .property(
                "compliance_status",
                json!({"enum": ["PASSED", "WARNING", "FAILED", "NOT_AVAILABLE"]}),
            )
            .property("recommendation", json!({"type": "string"}))
            .property("recommendation_url", json!({"type": "string"}))
            .property("fields", json!({"type": "object"}))
            .property("batch_size", json!({"type": "integer", "minimum": 1, "maximum": 10}))
            .property("types", json!({"type": "array", "minItems": 1, "items": {"type": "string"}}))
            .required(&["types"])
            .build(),
    ))
}

/// Update a trail's attributes.
pub fn update_trail() -> Arc<dyn Plugin> {
    Arc::new(Component::new(
        TypeSchema::new("update-trail")
            .property("attributes", json!({"type": "object"}))
            .required(&["attributes"])
            .build(),
    ))
}

/// Start or stop a trail's logging.
pub fn set_logging() -> Arc<dyn Plugin> {
    Arc::new(Component::new(
        TypeSchema::new("set-logging")
            .property("enabled", json!({"type": "boolean"}))
            .build(),
    ))
}

/// Update a cluster's configuration.
///
/// Exactly one of the logging or network access sections may be set per
/// update.
pub fn update_config() -> Arc<dyn Plugin> {
    let logging = json!({
        "type": "object",
        "properties": {
            "clusterLogging": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "types": string_array(),
                        "enabled": {"type": "boolean"}
                    }
                }
            }
        }
    });
    let access = json!({
        "type": "object",
        "properties": {
            "subnetIds": string_array(),
            "securityGroupIds": string_array(),
            "endpointPublicAccess": {"type": "boolean"},
            "endpointPrivateAccess": {"type": "boolean"},
            "publicAccessCidrs": string_array()
        }
    });
    Arc::new(Component::new(json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["type"],
        "properties": {
            "type": {"enum": ["update-config"]},
            "logging": logging,
            "resourcesVpcConfig": access,
            "clientRequestToken": {"type": "string"}
        },
        "oneOf": [
            {"required": ["type", "logging"]},
            {"required": ["type", "resourcesVpcConfig"]}
        ]
    })))
}

/// Snapshot the resource.
pub fn snapshot() -> Arc<dyn Plugin> {
    Arc::new(Component::new(
        TypeSchema::new("snapshot")
            .property("copy-tags", json!({"type": "array", "items": {"type": "string"}}))
            .build(),
    ))
}

/// Stop a compute instance or cluster.
pub fn stop() -> Arc<dyn Plugin> {
    Arc::new(Component::new(TypeSchema::new("stop").build()))
}

/// Replace role bindings of a resource's IAM policy.
pub fn set_iam_policy() -> Arc<dyn Plugin> {
    let binding = |members: Value| {
        json!({
            "type": "array",
            "minItems": 1,
            "items": {
                "type": "object",
                "required": ["role", "members"],
                "properties": {
                    "role": {"type": "string"},
                    "members": members
                }
            }
        })
    };
    Arc::new(Component::new(
        TypeSchema::new("set-iam-policy")
            .property("add-bindings", binding(string_array()))
            .property(
                "remove-bindings",
                binding(json!({"oneOf": [string_array(), {"enum": ["*"]}]})),
            )
            .build(),
    ))
}
