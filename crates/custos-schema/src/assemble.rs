//! # Schema Assembler
//!
//! Walks the catalog and builds one draft-07 document describing every legal
//! policy document.
//!
//! ## Layout
//!
//! ```text
//! definitions
//!   resources.<provider.type>.{filters, actions, policy}
//!   filters.{value, event, age, valuekv, <aliased filters>}
//!   actions.{<aliased actions>}
//!   filters_common, iam-statement, policy, policy-mode, max-resources-properties
//! properties.policies.items.anyOf[i] = {$ref: #/definitions/resources/<T>/policy}
//! ```
//!
//! The position of the per-resource branches ([`POLICY_BRANCHES_POINTER`])
//! is a contract with the error specializer, which selects the branch of a
//! failing policy by index at [`RESOURCE_BRANCH_DEPTH`].
//!
//! ## Aliases
//!
//! A component flagged `schema_alias` is stored once under its name in
//! `definitions.filters` / `definitions.actions` and referenced from every
//! resource type. Two different fragments under one alias name abort the
//! whole assembly with [`ConfigurationError::AliasMismatch`].

use custos_core::common::{EVENT_FILTER_REF, VALUE_FILTER_REF, VALUE_KV_FILTER_REF};
use custos_core::{Catalog, ComponentKind, ComponentRegistry, ConfigurationError, QualifiedResource, BOOLEAN_FILTERS};
use serde_json::{json, Map, Value};

use crate::definitions;

/// JSON Schema dialect of the assembled document.
pub const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

/// Schema path of the per-resource policy branches.
pub const POLICY_BRANCHES_POINTER: [&str; 4] = ["properties", "policies", "items", "anyOf"];

/// Schema-path depth at which a policy violation's branch index sits.
pub const RESOURCE_BRANCH_DEPTH: usize = POLICY_BRANCHES_POINTER.len();

/// Builds the policy schema from a catalog.
#[derive(Debug, Clone, Copy)]
pub struct SchemaAssembler<'a> {
    catalog: &'a Catalog,
}

impl<'a> SchemaAssembler<'a> {
    /// Assemble against `catalog`.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Build the schema, optionally restricted to some resource types.
    ///
    /// `resource_types` holds qualified (`aws.sns`) or unqualified (`sns`)
    /// names; an empty slice selects every resource type.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::AliasMismatch`] when an alias name carries two
    ///   different schemas. No partial schema is returned.
    /// - [`ConfigurationError::UnknownResource`] when a requested name
    ///   selects no resource type.
    pub fn generate(&self, resource_types: &[&str]) -> Result<Value, ConfigurationError> {
        if let Some(unknown) = resource_types
            .iter()
            .find(|name| !self.catalog.resource_types().any(|r| selects(name, &r)))
        {
            return Err(ConfigurationError::UnknownResource {
                name: (*unknown).to_string(),
                valid: self.catalog.qualified_names(),
            });
        }

        let mut table = DefinitionsTable::default();
        let mut branches = Vec::new();
        for resource in self.catalog.resource_types() {
            if !resource_types.is_empty() && !resource_types.iter().any(|name| selects(name, &resource)) {
                continue;
            }
            let alias = (resource.provider == self.catalog.primary_provider()).then(|| resource.resource.name());
            branches.push(table.process_resource(&resource, alias)?);
        }
        if branches.is_empty() {
            branches.push(json!({"not": {}}));
        }

        tracing::info!(
            resources = table.resources.len(),
            shared_filters = table.filters.len(),
            shared_actions = table.actions.len(),
            "assembled policy schema"
        );

        let definitions = table.finish(self.catalog.modes());
        Ok(json!({
            "$schema": DRAFT_07,
            "id": self.catalog.config().schema_id,
            "definitions": definitions,
            "type": "object",
            "required": ["policies"],
            "additionalProperties": false,
            "properties": {
                "vars": {"type": "object"},
                "policies": {
                    "type": "array",
                    "additionalItems": false,
                    "items": {"anyOf": branches}
                }
            }
        }))
    }
}

fn selects(name: &str, resource: &QualifiedResource<'_>) -> bool {
    name == resource.resource.name() || name == resource.qualified_name()
}

/// The per-call definitions table.
struct DefinitionsTable {
    resources: Map<String, Value>,
    filters: Map<String, Value>,
    actions: Map<String, Value>,
    policy: Value,
}

impl Default for DefinitionsTable {
    fn default() -> Self {
        let filters = match definitions::filters() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            resources: Map::new(),
            filters,
            actions: Map::new(),
            policy: definitions::policy(),
        }
    }
}

impl DefinitionsTable {
    /// Record one resource type and return the `$ref` to its policy schema.
    fn process_resource(
        &mut self,
        resource: &QualifiedResource<'_>,
        alias: Option<&str>,
    ) -> Result<Value, ConfigurationError> {
        let type_name = resource.qualified_name();
        let local_ref = |bucket: &str, name: &str| {
            json!({"$ref": format!("#/definitions/resources/{type_name}/{bucket}/{name}")})
        };

        let mut actions = Map::new();
        let mut action_refs = Vec::new();
        for (name, action) in resource.resource.actions().distinct_items() {
            if action.schema_alias() {
                share(&mut self.actions, ComponentKind::Action, &type_name, name, action.schema())?;
                action_refs.push(json!({"$ref": format!("#/definitions/actions/{name}")}));
            } else {
                actions.insert(name.to_string(), action.schema());
                action_refs.push(local_ref("actions", name));
            }
        }
        push_shortcut(&mut action_refs, resource.resource.actions());

        let mut filters = Map::new();
        let mut filter_refs = Vec::new();
        for (name, filter) in resource.resource.filters().distinct_items() {
            if BOOLEAN_FILTERS.contains(&name) {
                continue;
            }
            if filter.schema_alias() {
                share(&mut self.filters, ComponentKind::Filter, &type_name, name, filter.schema())?;
                filter_refs.push(json!({"$ref": format!("#/definitions/filters/{name}")}));
                continue;
            }
            match name {
                "value" => {
                    filters.insert("value".to_string(), json!({"$ref": VALUE_FILTER_REF}));
                    filters.insert("valuekv".to_string(), json!({"$ref": VALUE_KV_FILTER_REF}));
                }
                "event" => {
                    filters.insert("event".to_string(), json!({"$ref": EVENT_FILTER_REF}));
                }
                _ => {
                    filters.insert(name.to_string(), filter.schema());
                }
            }
            filter_refs.push(local_ref("filters", name));
        }
        filter_refs.push(json!({"$ref": VALUE_KV_FILTER_REF}));
        push_shortcut(&mut filter_refs, resource.resource.filters());

        let mut resource_enum = vec![type_name.clone()];
        resource_enum.extend(alias.map(str::to_string));

        let mut overrides = Map::new();
        for (name, schema) in resource.resource.policy_properties() {
            overrides.insert(name.clone(), schema.clone());
            self.admit_policy_property(name);
        }
        overrides.insert("resource".to_string(), json!({"enum": resource_enum}));
        overrides.insert(
            "filters".to_string(),
            json!({"type": "array", "items": {"anyOf": filter_refs}}),
        );
        overrides.insert(
            "actions".to_string(),
            json!({"type": "array", "items": {"anyOf": action_refs}}),
        );

        tracing::debug!(
            resource = %type_name,
            filters = filters.len(),
            actions = actions.len(),
            "processed resource type"
        );

        let policy = json!({
            "allOf": [
                {"$ref": "#/definitions/policy"},
                {"properties": overrides}
            ]
        });
        let reference = json!({"$ref": format!("#/definitions/resources/{type_name}/policy")});
        self.resources.insert(
            type_name,
            json!({"actions": actions, "filters": filters, "policy": policy}),
        );
        Ok(reference)
    }

    /// Let the closed policy skeleton accept a resource-specific property;
    /// the resource's own policy schema restricts its value.
    fn admit_policy_property(&mut self, name: &str) {
        if let Some(Value::Object(properties)) = self.policy.get_mut("properties") {
            properties.entry(name.to_string()).or_insert_with(|| json!({}));
        }
    }

    fn finish(self, modes: &ComponentRegistry) -> Value {
        let mode_schemas: Vec<Value> = modes.distinct_items().into_iter().map(|(_, m)| m.schema()).collect();
        let policy_mode = if mode_schemas.is_empty() {
            json!({"not": {}})
        } else {
            json!({"anyOf": mode_schemas})
        };
        json!({
            "resources": self.resources,
            "iam-statement": definitions::iam_statement(),
            "actions": self.actions,
            "filters": self.filters,
            "filters_common": definitions::filters_common(),
            "policy": self.policy,
            "policy-mode": policy_mode,
            "max-resources-properties": definitions::max_resources_properties()
        })
    }
}

/// Store an aliased fragment, refusing a different fragment under the same name.
fn share(
    bucket: &mut Map<String, Value>,
    kind: ComponentKind,
    type_name: &str,
    name: &str,
    schema: Value,
) -> Result<(), ConfigurationError> {
    match bucket.get(name) {
        Some(existing) if *existing != schema => Err(ConfigurationError::AliasMismatch {
            resource_type: type_name.to_string(),
            kind,
            name: name.to_string(),
        }),
        Some(_) => Ok(()),
        None => {
            bucket.insert(name.to_string(), schema);
            Ok(())
        }
    }
}

/// Bare-string shorthand: any registered name without configuration. An
/// empty registry admits nothing.
fn push_shortcut(refs: &mut Vec<Value>, registry: &ComponentRegistry) {
    let names: Vec<&str> = registry.keys().collect();
    if !names.is_empty() {
        refs.push(json!({"enum": names}));
    } else if refs.is_empty() {
        refs.push(json!({"not": {}}));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use custos_core::{Component, DuplicatePolicy, EngineConfig, Plugin, Provider, ResourceType};

    use super::*;

    fn shared(schema: Value) -> Arc<dyn Plugin> {
        Arc::new(Component::shared(schema))
    }

    fn local(schema: Value) -> Arc<dyn Plugin> {
        Arc::new(Component::new(schema))
    }

    fn catalog(resources: Vec<ResourceType>) -> Catalog {
        let mut aws = Provider::new("aws", DuplicatePolicy::Overwrite);
        for resource in resources {
            aws.register_resource(resource).unwrap();
        }
        let mut catalog = Catalog::new(EngineConfig::default());
        catalog.register_provider(aws).unwrap();
        catalog
    }

    fn queue() -> ResourceType {
        let mut queue = ResourceType::new("queue", DuplicatePolicy::Overwrite);
        queue.register_filter("value", local(json!({}))).unwrap();
        queue.register_filter("or", local(json!({}))).unwrap();
        queue.register_filter("age", local(json!({"type": "object"}))).unwrap();
        let tag = local(json!({"properties": {"type": {"enum": ["tag", "mark"]}}}));
        queue.register_action("tag", Arc::clone(&tag)).unwrap();
        queue.register_action("mark", tag).unwrap();
        queue
            .register_action("invoke", shared(json!({"required": ["function"]})))
            .unwrap();
        queue
    }

    #[test]
    fn test_resource_definitions() {
        let schema = SchemaAssembler::new(&catalog(vec![queue()])).generate(&[]).unwrap();
        let resource = &schema["definitions"]["resources"]["aws.queue"];

        assert_eq!(resource["filters"]["value"], json!({"$ref": VALUE_FILTER_REF}));
        assert_eq!(resource["filters"]["valuekv"], json!({"$ref": VALUE_KV_FILTER_REF}));
        assert!(resource["filters"].get("or").is_none());
        assert!(resource["actions"].get("invoke").is_none());
        assert_eq!(schema["definitions"]["actions"]["invoke"], json!({"required": ["function"]}));

        let overrides = &resource["policy"]["allOf"][1]["properties"];
        assert_eq!(overrides["resource"], json!({"enum": ["aws.queue", "queue"]}));

        let action_refs = overrides["actions"]["items"]["anyOf"].as_array().unwrap();
        assert_eq!(
            action_refs,
            &vec![
                json!({"$ref": "#/definitions/actions/invoke"}),
                json!({"$ref": "#/definitions/resources/aws.queue/actions/mark"}),
                json!({"enum": ["invoke", "mark", "tag"]}),
            ]
        );

        let filter_refs = overrides["filters"]["items"]["anyOf"].as_array().unwrap();
        assert_eq!(
            filter_refs,
            &vec![
                json!({"$ref": "#/definitions/resources/aws.queue/filters/age"}),
                json!({"$ref": "#/definitions/resources/aws.queue/filters/value"}),
                json!({"$ref": VALUE_KV_FILTER_REF}),
                json!({"enum": ["age", "or", "value"]}),
            ]
        );
    }

    #[test]
    fn test_branches_sit_at_contract_pointer() {
        let schema = SchemaAssembler::new(&catalog(vec![queue()])).generate(&[]).unwrap();
        let pointer = format!("/{}", POLICY_BRANCHES_POINTER.join("/"));
        let branches = schema.pointer(&pointer).and_then(Value::as_array).unwrap();
        assert_eq!(branches, &vec![json!({"$ref": "#/definitions/resources/aws.queue/policy"})]);
    }

    #[test]
    fn test_alias_mismatch_aborts() {
        let mut other = ResourceType::new("topic", DuplicatePolicy::Overwrite);
        other
            .register_action("invoke", shared(json!({"required": ["arn"]})))
            .unwrap();
        let err = SchemaAssembler::new(&catalog(vec![queue(), other]))
            .generate(&[])
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::AliasMismatch {
                resource_type: "aws.topic".to_string(),
                kind: ComponentKind::Action,
                name: "invoke".to_string(),
            }
        );
    }

    #[test]
    fn test_filter_by_resource_type() {
        let catalog = catalog(vec![queue(), ResourceType::new("topic", DuplicatePolicy::Overwrite)]);
        let assembler = SchemaAssembler::new(&catalog);

        let only_topic = assembler.generate(&["aws.topic"]).unwrap();
        let resources = only_topic["definitions"]["resources"].as_object().unwrap();
        assert_eq!(resources.keys().collect::<Vec<_>>(), vec!["aws.topic"]);

        let unqualified = assembler.generate(&["topic"]).unwrap();
        assert_eq!(only_topic, unqualified);

        assert!(matches!(
            assembler.generate(&["nope"]),
            Err(ConfigurationError::UnknownResource { .. })
        ));
    }

    #[test]
    fn test_policy_properties_are_admitted_by_skeleton() {
        let resource = ResourceType::new("instance", DuplicatePolicy::Overwrite)
            .with_policy_property("query", json!({"type": "array"}))
            .with_policy_property("placement", json!({"type": "string"}));
        let schema = SchemaAssembler::new(&catalog(vec![resource])).generate(&[]).unwrap();
        let skeleton = &schema["definitions"]["policy"]["properties"];
        assert_eq!(skeleton["placement"], json!({}));
        assert_eq!(skeleton["query"], definitions::policy()["properties"]["query"]);
        let overrides = &schema["definitions"]["resources"]["aws.instance"]["policy"]["allOf"][1]["properties"];
        assert_eq!(overrides["placement"], json!({"type": "string"}));
    }

    #[test]
    fn test_empty_registries_still_yield_valid_shapes() {
        let schema = SchemaAssembler::new(&Catalog::default()).generate(&[]).unwrap();
        assert_eq!(schema["properties"]["policies"]["items"]["anyOf"], json!([{"not": {}}]));
        assert_eq!(schema["definitions"]["policy-mode"], json!({"not": {}}));
        assert!(jsonschema::meta::is_valid(&schema));

        let bare = catalog(vec![ResourceType::new("topic", DuplicatePolicy::Overwrite)]);
        let schema = SchemaAssembler::new(&bare).generate(&[]).unwrap();
        let overrides = &schema["definitions"]["resources"]["aws.topic"]["policy"]["allOf"][1]["properties"];
        assert_eq!(overrides["actions"]["items"]["anyOf"], json!([{"not": {}}]));
        assert!(jsonschema::meta::is_valid(&schema));
    }
}
