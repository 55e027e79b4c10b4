//! # Runtime Catalog
//!
//! The explicit, constructed registry root: providers (each holding its
//! resource types) plus the execution-mode registry. The catalog is built
//! during a single population phase and handed to the schema assembler.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::ConfigurationError;
use crate::plugin::{ComponentKind, Plugin};
use crate::registry::{ComponentRegistry, PluginRegistry};
use crate::resource::{Provider, ResourceType};

/// Every registered plugin, reachable from one value.
#[derive(Debug)]
pub struct Catalog {
    config: EngineConfig,
    providers: PluginRegistry<Provider>,
    modes: ComponentRegistry,
}

/// A resource type together with the provider that declares it.
#[derive(Debug, Clone, Copy)]
pub struct QualifiedResource<'a> {
    /// Provider name.
    pub provider: &'a str,
    /// The resource type.
    pub resource: &'a ResourceType,
}

impl QualifiedResource<'_> {
    /// `provider.type`, e.g. `aws.cloudtrail`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.provider, self.resource.name())
    }
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new(config: EngineConfig) -> Self {
        let on_duplicate = config.on_duplicate;
        Self {
            config,
            providers: PluginRegistry::new(ComponentKind::Provider).with_duplicate_policy(on_duplicate),
            modes: ComponentRegistry::new(ComponentKind::Mode).with_duplicate_policy(on_duplicate),
        }
    }

    /// The configuration the catalog was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Name of the provider whose types accept unqualified names.
    pub fn primary_provider(&self) -> &str {
        &self.config.primary_provider
    }

    /// Registered providers.
    pub fn providers(&self) -> &PluginRegistry<Provider> {
        &self.providers
    }

    /// Registered execution modes.
    pub fn modes(&self) -> &ComponentRegistry {
        &self.modes
    }

    /// Register a fully populated provider.
    ///
    /// # Errors
    ///
    /// Propagates the configured duplicate policy.
    pub fn register_provider(&mut self, provider: Provider) -> Result<(), ConfigurationError> {
        let name = provider.name().to_string();
        self.providers.register(name, Arc::new(provider)).map(|_| ())
    }

    /// Register an execution mode.
    ///
    /// # Errors
    ///
    /// Propagates the configured duplicate policy.
    pub fn register_mode(
        &mut self,
        name: impl Into<String>,
        mode: Arc<dyn Plugin>,
    ) -> Result<(), ConfigurationError> {
        self.modes.register(name, mode).map(|_| ())
    }

    /// Every resource type of every provider.
    pub fn resource_types(&self) -> impl Iterator<Item = QualifiedResource<'_>> + '_ {
        self.providers.items().flat_map(|(provider, p)| {
            p.resources()
                .items()
                .map(move |(_, resource)| QualifiedResource {
                    provider,
                    resource: resource.as_ref(),
                })
        })
    }

    /// Qualified names of every resource type.
    pub fn qualified_names(&self) -> Vec<String> {
        self.resource_types().map(|r| r.qualified_name()).collect()
    }

    /// Resolve `provider.type`, or an unqualified name against the primary
    /// provider.
    pub fn resolve_resource(&self, name: &str) -> Option<QualifiedResource<'_>> {
        let (provider_name, type_name) = match name.split_once('.') {
            Some((provider, type_name)) => (provider, type_name),
            None => (self.primary_provider(), name),
        };
        let (provider, p) = self.providers.items().find(|(n, _)| *n == provider_name)?;
        let resource = p.resources().get(type_name)?;
        Some(QualifiedResource {
            provider,
            resource: resource.as_ref(),
        })
    }

    /// Mutation counter of the catalog.
    ///
    /// Providers and resource types are frozen once registered, so the
    /// provider and mode registries are the only mutable state. The value
    /// grows on every registration and keys caches of derived artifacts
    /// such as the assembled schema.
    pub fn revision(&self) -> u64 {
        self.providers.revision() + self.modes.revision()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
