//! # Resource Vocabulary
//!
//! What each resource type accepts, as sorted name lists, plus a per-provider
//! summary. Used by the CLI's `vocabulary` and `summary` commands.

use std::collections::{BTreeMap, BTreeSet};

use custos_core::Catalog;
use serde::Serialize;

/// Filter and action names valid for one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceVocabulary {
    /// Provider declaring the resource type.
    pub provider: String,
    /// Sorted filter names.
    pub filters: Vec<String>,
    /// Sorted action names.
    pub actions: Vec<String>,
}

/// Vocabulary of a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vocabulary {
    /// Per resource type, keyed by qualified or unqualified name.
    pub resources: BTreeMap<String, ResourceVocabulary>,
    /// Execution mode names.
    pub modes: Vec<String>,
}

/// Collect the vocabulary, optionally for one provider.
///
/// With `qualify` false, resource types are keyed by their bare name; types
/// of different providers sharing a name then collapse to the last provider.
pub fn resource_vocabulary(catalog: &Catalog, provider: Option<&str>, qualify: bool) -> Vocabulary {
    let resources = catalog
        .resource_types()
        .filter(|r| provider.map_or(true, |p| p == r.provider))
        .map(|r| {
            let key = if qualify {
                r.qualified_name()
            } else {
                r.resource.name().to_string()
            };
            let vocabulary = ResourceVocabulary {
                provider: r.provider.to_string(),
                filters: r.resource.filters().keys().map(str::to_string).collect(),
                actions: r.resource.actions().keys().map(str::to_string).collect(),
            };
            (key, vocabulary)
        })
        .collect();

    Vocabulary {
        resources,
        modes: catalog.modes().keys().map(str::to_string).collect(),
    }
}

/// Counts for one provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProviderSummary {
    /// Resource types.
    pub resources: usize,
    /// Distinct action names across its resource types.
    pub actions: usize,
    /// Distinct filter names across its resource types.
    pub filters: usize,
}

/// Catalog-wide counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Per provider.
    pub providers: BTreeMap<String, ProviderSummary>,
    /// Execution modes.
    pub modes: usize,
}

/// Summarize a vocabulary per provider.
pub fn summary(vocabulary: &Vocabulary) -> Summary {
    let mut names: BTreeMap<&str, (usize, BTreeSet<&str>, BTreeSet<&str>)> = BTreeMap::new();
    for resource in vocabulary.resources.values() {
        let (count, actions, filters) = names.entry(resource.provider.as_str()).or_default();
        *count += 1;
        actions.extend(resource.actions.iter().map(String::as_str));
        filters.extend(resource.filters.iter().map(String::as_str));
    }

    Summary {
        providers: names
            .into_iter()
            .map(|(provider, (resources, actions, filters))| {
                (
                    provider.to_string(),
                    ProviderSummary {
                        resources,
                        actions: actions.len(),
                        filters: filters.len(),
                    },
                )
            })
            .collect(),
        modes: vocabulary.modes.len(),
    }
}
