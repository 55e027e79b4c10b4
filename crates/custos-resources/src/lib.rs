//! # custos-resources: Built-in Plugin Population
//!
//! The explicit "register all built-ins" startup phase. Nothing is
//! registered as a side effect of linking this crate; callers build a
//! [`Catalog`] and hand it to [`register_builtins`], or use
//! [`builtin_catalog`].
//!
//! ## Contents
//!
//! - [`filters`] / [`actions`]: the standard plugin schemas.
//! - [`modes`]: execution modes.
//! - [`aws`] (the default primary provider) and [`gcp`].
//!
//! Every resource filter registry starts with `value`, `event`, `or`,
//! `and`, and `not`; every action registry starts with `notify`.

pub mod actions;
pub mod aws;
mod builder;
pub mod filters;
pub mod gcp;
pub mod modes;

use custos_core::{Catalog, ConfigurationError, EngineConfig};

/// Register every built-in mode and provider into `catalog`.
///
/// # Errors
///
/// Propagates the catalog's duplicate policy; with
/// [`DuplicatePolicy::Reject`](custos_core::DuplicatePolicy::Reject) a second
/// call fails.
pub fn register_builtins(catalog: &mut Catalog) -> Result<(), ConfigurationError> {
    let on_duplicate = catalog.config().on_duplicate;
    modes::register(catalog)?;
    catalog.register_provider(aws::provider(on_duplicate)?)?;
    catalog.register_provider(gcp::provider(on_duplicate)?)?;
    tracing::info!(
        providers = catalog.providers().len(),
        resources = catalog.resource_types().count(),
        modes = catalog.modes().len(),
        "registered built-in plugins"
    );
    Ok(())
}

/// A catalog holding every built-in plugin.
///
/// # Errors
///
/// See [`register_builtins`].
pub fn builtin_catalog(config: EngineConfig) -> Result<Catalog, ConfigurationError> {
    let mut catalog = Catalog::new(config);
    register_builtins(&mut catalog)?;
    Ok(catalog)
}
