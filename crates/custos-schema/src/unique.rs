//! # Uniqueness Checker
//!
//! Policy names are external identifiers (logs, reports, deployed function
//! names), so two policies may not share one even when each is individually
//! schema-valid. JSON Schema cannot express a cross-item constraint, so this
//! check runs after schema validation succeeds.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// Policy names used more than once, with their counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateNames {
    counts: BTreeMap<String, usize>,
}

impl DuplicateNames {
    /// Every duplicated name and how often it occurs.
    pub fn counts(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }

    /// One duplicated name to identify the failure by.
    pub fn representative(&self) -> &str {
        self.counts.keys().next().map(String::as_str).unwrap_or("unknown")
    }
}

impl fmt::Display for DuplicateNames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Only one policy with a given name allowed, duplicates: {{")?;
        for (i, (name, count)) in self.counts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{name}': {count}")?;
        }
        write!(f, "}}")
    }
}

impl std::error::Error for DuplicateNames {}

/// Count policy names across the document.
///
/// Returns `None` when every name is unique. Policies without a string
/// `name` are not counted.
pub fn check_unique(document: &Value) -> Option<DuplicateNames> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let policies = document
        .get("policies")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for name in policies.iter().filter_map(|p| p.get("name").and_then(Value::as_str)) {
        *counts.entry(name.to_string()).or_default() += 1;
    }
    counts.retain(|_, count| *count > 1);
    (!counts.is_empty()).then_some(DuplicateNames { counts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unique_names_pass() {
        let doc = json!({"policies": [{"name": "a"}, {"name": "b"}]});
        assert!(check_unique(&doc).is_none());
        assert!(check_unique(&json!({})).is_none());
    }

    #[test]
    fn test_duplicates_reported() {
        let doc = json!({"policies": [
            {"name": "b"}, {"name": "a"}, {"name": "b"}, {"name": "a"}, {"name": "a"}, {"name": "c"}
        ]});
        let dups = check_unique(&doc).unwrap();
        assert_eq!(dups.representative(), "a");
        assert_eq!(dups.counts().len(), 2);
        assert_eq!(
            dups.to_string(),
            "Only one policy with a given name allowed, duplicates: {'a': 3, 'b': 2}"
        );
    }
}
