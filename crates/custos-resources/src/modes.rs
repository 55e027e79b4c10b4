//! # Execution Modes
//!
//! How a policy is run: polled on demand (`pull`), or deployed as a
//! serverless function triggered by a schedule or an event source. The
//! serverless modes share one property set.

use std::sync::Arc;

use custos_core::{Catalog, Component, ConfigurationError, Plugin, TypeSchema};
use serde_json::{json, Value};

fn serverless_base() -> Value {
    json!({
        "type": "object",
        "properties": {
            "execution-options": {"type": "object"},
            "function-prefix": {"type": "string"},
            "member-role": {"type": "string"},
            "packages": {"type": "array"},
            "layers": {"type": "array", "items": {"type": "string"}},
            "concurrency": {"type": "integer"},
            "runtime": {"enum": ["python3.8", "python3.9", "python3.10", "python3.11", "python3.12"]},
            "role": {"type": "string"},
            "handler": {"type": "string"},
            "pattern": {"type": "object"},
            "timeout": {"type": "number"},
            "memory": {"type": "number"},
            "environment": {"type": "object"},
            "tags": {"type": "object"},
            "dead_letter_config": {"type": "object"},
            "kms_key_arn": {"type": "string"},
            "tracing_config": {"type": "object"},
            "security_groups": {"type": "array"},
            "subnets": {"type": "array"}
        }
    })
}

fn serverless(schema: TypeSchema) -> Arc<dyn Plugin> {
    Arc::new(Component::new(schema.rinherit(&serverless_base()).build()))
}

/// Register every built-in execution mode.
///
/// # Errors
///
/// Propagates the catalog's duplicate policy.
pub fn register(catalog: &mut Catalog) -> Result<(), ConfigurationError> {
    catalog.register_mode("pull", Arc::new(Component::new(TypeSchema::new("pull").build())))?;

    catalog.register_mode(
        "periodic",
        serverless(
            TypeSchema::new("periodic")
                .property("schedule", json!({"type": "string"}))
                .required(&["schedule"]),
        ),
    )?;

    catalog.register_mode(
        "cloudtrail",
        serverless(
            TypeSchema::new("cloudtrail")
                .property("delay", json!({"type": "integer"}))
                .property(
                    "events",
                    json!({
                        "type": "array",
                        "items": {"oneOf": [
                            {"type": "string"},
                            {
                                "type": "object",
                                "required": ["event", "source", "ids"],
                                "properties": {
                                    "source": {"type": "string"},
                                    "ids": {"type": "string"},
                                    "event": {"type": "string"}
                                }
                            }
                        ]}
                    }),
                ),
        ),
    )?;

    catalog.register_mode("config-rule", serverless(TypeSchema::new("config-rule")))?;
    catalog.register_mode("guard-duty", serverless(TypeSchema::new("guard-duty")))?;

    catalog.register_mode(
        "phd",
        serverless(
            TypeSchema::new("phd")
                .property("events", json!({"type": "array", "items": {"type": "string"}}))
                .property(
                    "categories",
                    json!({"type": "array", "items": {"enum": [
                        "issue", "accountNotification", "scheduledChange"
                    ]}}),
                )
                .property(
                    "statuses",
                    json!({"type": "array", "items": {"enum": ["open", "upcoming", "closed"]}}),
                ),
        ),
    )?;

    let hub = serverless(TypeSchema::new("hub-finding").alias("hub-action"));
    catalog.register_mode("hub-finding", Arc::clone(&hub))?;
    catalog.register_mode("hub-action", hub)?;

    catalog.register_mode(
        "ec2-instance-state",
        serverless(TypeSchema::new("ec2-instance-state").property(
            "events",
            json!({"type": "array", "items": {"enum": [
                "pending", "running", "shutting-down", "stopped", "stopping", "terminated"
            ]}}),
        )),
    )?;

    Ok(())
}
