//! # gcp Provider

use custos_core::{ConfigurationError, DuplicatePolicy, Provider};

use crate::actions;
use crate::builder::ResourceBuilder;

/// Provider name.
pub const PROVIDER: &str = "gcp";

/// Build the gcp provider with every built-in resource type.
///
/// # Errors
///
/// Propagates `on_duplicate` when a plugin is registered twice.
pub fn provider(on_duplicate: DuplicatePolicy) -> Result<Provider, ConfigurationError> {
    let mut provider = Provider::new(PROVIDER, on_duplicate);
    provider.register_resource(
        ResourceBuilder::new("instance", on_duplicate)?
            .action("stop", actions::stop())?
            .action("delete", actions::delete())?
            .build(),
    )?;
    provider.register_resource(
        ResourceBuilder::new("bucket", on_duplicate)?
            .action("set-iam-policy", actions::set_iam_policy())?
            .build(),
    )?;
    Ok(provider)
}
