//! # aws Provider
//!
//! The primary provider: its resource types also accept their unqualified
//! name in policies.

use std::sync::Arc;

use custos_core::{Component, ConfigurationError, DuplicatePolicy, Plugin, Provider, ResourceType, TypeSchema};
use serde_json::json;

use crate::builder::ResourceBuilder;
use crate::{actions, filters};

/// Provider name.
pub const PROVIDER: &str = "aws";

fn network_filters(builder: ResourceBuilder) -> Result<ResourceBuilder, ConfigurationError> {
    builder
        .filter("subnet", filters::related("subnet"))?
        .filter("security-group", filters::related("security-group"))?
        .filter("vpc", filters::related("vpc"))
}

fn tagging(builder: ResourceBuilder) -> Result<ResourceBuilder, ConfigurationError> {
    builder
        .action_aliases(&["tag", "mark"], actions::tag())?
        .action_aliases(&["remove-tag", "unmark", "untag"], actions::remove_tag())
}

fn encrypt() -> Arc<dyn Plugin> {
    Arc::new(Component::new(
        TypeSchema::new("encrypt")
            .property("key", json!({"type": "string"}))
            .required(&["key"])
            .build(),
    ))
}

fn cache_delete() -> Arc<dyn Plugin> {
    Arc::new(Component::new(
        TypeSchema::new("delete")
            .property("skip-snapshot", json!({"type": "boolean"}))
            .build(),
    ))
}

fn resources(on_duplicate: DuplicatePolicy) -> Result<Vec<ResourceType>, ConfigurationError> {
    let new = |name: &str| ResourceBuilder::new(name, on_duplicate);

    Ok(vec![
        tagging(new("step-machine")?)?.build(),
        network_filters(new("eks")?)?
            .action("update-config", actions::update_config())?
            .action("delete", actions::delete())?
            .build(),
        new("cloudtrail")?
            .filter("is-shadow", filters::is_shadow())?
            .filter("status", filters::status())?
            .action("update-trail", actions::update_trail())?
            .action("set-logging", actions::set_logging())?
            .build(),
        tagging(new("sns")?)?
            .filter("kms-key", filters::related("kms-key"))?
            .filter("config-compliance", filters::config_compliance())?
            .action("remove-statements", actions::remove_statements())?
            .action("modify-policy", actions::modify_policy())?
            .action("delete", actions::delete())?
            .build(),
        new("efs")?
            .filter("kms-key", filters::related("kms-key"))?
            .action("delete", actions::delete())?
            .build(),
        new("kinesis")?
            .action("encrypt", encrypt())?
            .action("delete", actions::delete())?
            .build(),
        new("waf")?.build(),
        new("waf-regional")?.build(),
        new("backup-plan")?.build(),
        new("acm-certificate")?.action("delete", actions::delete())?.build(),
        new("codecommit")?.action("delete", actions::delete())?.build(),
        network_filters(new("codebuild")?)?
            .action("delete", actions::delete())?
            .build(),
        new("config-rule")?
            .filter("status", filters::status())?
            .action("delete", actions::delete())?
            .build(),
        new("cache-cluster")?
            .filter("security-group", filters::related("security-group"))?
            .filter("subnet", filters::related("subnet"))?
            .action("delete", cache_delete())?
            .action("snapshot", actions::snapshot())?
            .build(),
        new("account")?
            .filter("missing", filters::missing())?
            .filter("locked", filters::locked())?
            .filter("config-compliance", filters::config_compliance())?
            .build(),
        tagging(network_filters(new("ec2")?)?)?
            .filter("kms-key", filters::related("kms-key"))?
            .filter("config-compliance", filters::config_compliance())?
            .action("stop", actions::stop())?
            .action("terminate", actions::force_delete())?
            .action("modify-policy", actions::modify_policy())?
            .policy_property("query", json!({"type": "array", "items": {"type": "object"}}))
            .build(),
    ])
}

/// Attach the cross-cutting plugins every aws resource type carries.
fn with_universal(resource: ResourceType) -> Result<ResourceType, ConfigurationError> {
    let mut resource = resource;
    resource.register_action("invoke-lambda", actions::invoke_lambda())?;
    resource.register_action("post-finding", actions::post_finding())?;
    resource.register_filter("finding", filters::finding())?;
    Ok(resource)
}

/// Build the aws provider with every built-in resource type.
///
/// # Errors
///
/// Propagates `on_duplicate` when a plugin is registered twice.
pub fn provider(on_duplicate: DuplicatePolicy) -> Result<Provider, ConfigurationError> {
    let mut provider = Provider::new(PROVIDER, on_duplicate);
    for resource in resources(on_duplicate)? {
        provider.register_resource(with_universal(resource)?)?;
    }
    Ok(provider)
}
