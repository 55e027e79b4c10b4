//! # Error Specializer
//!
//! A generic validator reports a failing polymorphic keyword (`anyOf` /
//! `oneOf`) as "matched none of N branches", which is useless for a document
//! with hundreds of resource branches. The specializer uses the offending
//! instance's discriminator field to pick the branch the author meant and
//! reports that branch's own failure instead.
//!
//! ## Algorithm
//!
//! 1. A violation whose keyword is not a combinator is already specific.
//! 2. An instance with a `resource` field selects the branch whose `$ref`
//!    names that resource type, or whose policy schema lists it as the
//!    unqualified alias. The branch's failures are the ones whose
//!    schema path carries the branch index at [`RESOURCE_BRANCH_DEPTH`]; the
//!    first is specialized recursively.
//! 3. An instance with a `type` field (a filter or action) selects the branch
//!    whose `$ref` ends in that name, or whose inline `type` enum holds it.
//!    The first branch failure whose last integer schema-path segment is the
//!    branch index is returned as is.
//! 4. Anything else is returned unspecialized.
//!
//! ## Branch Failures
//!
//! Per-branch failures are recomputed by validating the instance against the
//! selected branch alone, with the assembled `definitions` grafted onto it. Their
//! paths are rebased onto the combinator's schema path and the violation's
//! instance path, so they read as if the validator had reported them.

use std::cell::RefCell;

use serde_json::{json, Map, Value};

use crate::assemble::{DRAFT_07, RESOURCE_BRANCH_DEPTH};
use crate::error::SpecializationError;
use crate::pointer;
use crate::validate::{compile, violations, Violation};

/// Recursion bound; the assembled schema nests combinators only a few deep.
pub(crate) const MAX_SPECIALIZATION_DEPTH: usize = 8;

/// Narrows violations of one document.
pub(crate) struct Specializer<'a> {
    schema: &'a Value,
    document: &'a Value,
    /// `$schema` and the assembled `definitions`; each branch is compiled on
    /// top of it and removed again.
    root: RefCell<Map<String, Value>>,
}

impl<'a> Specializer<'a> {
    pub(crate) fn new(schema: &'a Value, document: &'a Value) -> Self {
        let mut root = Map::new();
        root.insert("$schema".to_string(), json!(DRAFT_07));
        root.insert(
            "definitions".to_string(),
            schema.get("definitions").cloned().unwrap_or_else(|| json!({})),
        );
        Self {
            schema,
            document,
            root: RefCell::new(root),
        }
    }

    /// Narrow `violation` to the branch failure the author can act on.
    pub(crate) fn specialize(&self, violation: Violation) -> Result<Violation, SpecializationError> {
        self.narrow(violation, 0)
    }

    fn narrow(&self, violation: Violation, depth: usize) -> Result<Violation, SpecializationError> {
        if !violation.is_combinator() {
            return Ok(violation);
        }
        if depth >= MAX_SPECIALIZATION_DEPTH {
            return Err(SpecializationError::DepthExceeded(depth));
        }

        let branches = self.branches(&violation)?;
        let instance = self.instance(&violation)?;

        if let Some(resource) = instance.get("resource").and_then(Value::as_str) {
            if let Some(index) = resource_branch(self.schema, branches, resource) {
                let wanted = index.to_string();
                let failure = self
                    .branch_errors(&violation, index, &branches[index])?
                    .into_iter()
                    .find(|e| {
                        pointer::segments(&e.schema_path).get(RESOURCE_BRANCH_DEPTH) == Some(&wanted)
                    });
                return match failure {
                    Some(failure) => self.narrow(failure, depth + 1),
                    None => Ok(violation),
                };
            }
        }

        if let Some(type_name) = instance.get("type").and_then(Value::as_str) {
            if let Some(index) = type_branch(branches, type_name) {
                let failure = self
                    .branch_errors(&violation, index, &branches[index])?
                    .into_iter()
                    .find(|e| pointer::last_index(&pointer::segments(&e.schema_path)) == Some(index));
                if let Some(failure) = failure {
                    return Ok(failure);
                }
            }
        }

        Ok(violation)
    }

    /// The alternatives of a combinator violation.
    fn branches(&self, violation: &Violation) -> Result<&'a [Value], SpecializationError> {
        let path = pointer::segments(&violation.schema_path);
        let node = pointer::resolve_schema_path(self.schema, &path)
            .ok_or_else(|| SpecializationError::UnresolvedSchemaPath(violation.schema_path.clone()))?;
        node.as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| SpecializationError::NotCombinator {
                keyword: violation.keyword().unwrap_or_default(),
                path: violation.schema_path.clone(),
            })
    }

    fn instance(&self, violation: &Violation) -> Result<&'a Value, SpecializationError> {
        self.document
            .pointer(&violation.instance_path)
            .ok_or_else(|| SpecializationError::UnresolvedInstancePath(violation.instance_path.clone()))
    }

    /// Failures of the instance against one branch, rebased onto the
    /// combinator's paths.
    fn branch_errors(
        &self,
        violation: &Violation,
        index: usize,
        branch: &Value,
    ) -> Result<Vec<Violation>, SpecializationError> {
        let (compiled, nested) = self.compile_branch(branch);
        let validator = compiled.map_err(|reason| SpecializationError::BranchCompile {
            index,
            path: violation.schema_path.clone(),
            reason,
        })?;

        let mut prefix = pointer::segments(&violation.schema_path);
        prefix.push(index.to_string());
        let instance = self.instance(violation)?;

        Ok(violations(&validator, instance)
            .into_iter()
            .map(|e| {
                let mut relative = pointer::segments(&e.schema_path);
                if nested && relative.len() >= 2 && relative[0] == "allOf" && relative[1] == "0" {
                    relative.drain(..2);
                }
                let mut schema_path = prefix.clone();
                schema_path.extend(relative);
                Violation {
                    instance_path: format!("{}{}", violation.instance_path, e.instance_path),
                    schema_path: pointer::join(&schema_path),
                    message: e.message,
                }
            })
            .collect())
    }

    /// Compile `branch` against the shared root. Object branches are merged
    /// into the root; anything else is wrapped in a single-item `allOf`,
    /// reported by the returned flag.
    fn compile_branch(&self, branch: &Value) -> (Result<jsonschema::Validator, String>, bool) {
        let mut slot = self.root.borrow_mut();
        let mut root = std::mem::take(&mut *slot);
        let (added, nested) = match branch {
            Value::Object(map) if map.keys().all(|k| !root.contains_key(k)) => {
                root.extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
                (map.keys().cloned().collect::<Vec<_>>(), false)
            }
            other => {
                root.insert("allOf".to_string(), json!([other]));
                (vec!["allOf".to_string()], true)
            }
        };

        let wrapper = Value::Object(root);
        let compiled = compile(&wrapper);
        if let Value::Object(mut root) = wrapper {
            for key in &added {
                root.remove(key);
            }
            *slot = root;
        }
        (compiled, nested)
    }

    /// Failures across every branch, in branch order.
    fn context(&self, violation: &Violation) -> Result<Vec<Violation>, SpecializationError> {
        let mut context = Vec::new();
        for (index, branch) in self.branches(violation)?.iter().enumerate() {
            context.extend(self.branch_errors(violation, index, branch)?);
        }
        Ok(context)
    }

    /// Generic best match: the shallowest, most specific violation, then the
    /// deepest failure inside its branches while it remains a combinator.
    pub(crate) fn best_match(&self, errors: &[Violation]) -> Option<Violation> {
        let mut best = errors.iter().rev().max_by_key(|e| e.relevance())?.clone();
        for _ in 0..MAX_SPECIALIZATION_DEPTH {
            if !best.is_combinator() {
                break;
            }
            let Ok(context) = self.context(&best) else {
                break;
            };
            match context.into_iter().min_by_key(Violation::relevance) {
                Some(deeper) => best = deeper,
                None => break,
            }
        }
        Some(best)
    }

    /// The policy mapping a violation sits in.
    fn enclosing_policy(&self, violation: &Violation) -> Option<&'a Value> {
        let path = pointer::segments(&violation.instance_path);
        if path.first().map(String::as_str) != Some("policies") {
            return None;
        }
        let index = path.get(1)?.parse::<usize>().ok()?;
        self.document.get("policies")?.get(index)
    }

    /// Prefix the message with the enclosing policy's name and resource type.
    pub(crate) fn scope(&self, mut violation: Violation) -> Violation {
        if let Some(policy) = self.enclosing_policy(&violation) {
            violation.message = format!(
                "error on policy:{} resource:{}\n{}",
                field(policy, "name"),
                field(policy, "resource"),
                violation.message
            );
        }
        violation
    }

    /// Name of the policy `specialized` belongs to, falling back to the
    /// `name` of the instance that raised `first`.
    pub(crate) fn policy_name(&self, specialized: &Violation, first: &Violation) -> String {
        if let Some(policy) = self.enclosing_policy(specialized) {
            return field(policy, "name").to_string();
        }
        self.document
            .pointer(&first.instance_path)
            .and_then(|instance| instance.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string()
    }
}

fn field<'v>(policy: &'v Value, key: &str) -> &'v str {
    policy.get(key).and_then(Value::as_str).unwrap_or("unknown")
}

/// Qualified resource name a policy branch points at:
/// `#/definitions/resources/<name>/policy`.
fn branch_resource(branch: &Value) -> Option<&str> {
    let reference = branch.get("$ref")?.as_str()?;
    let mut parts = reference.rsplit('/');
    parts.next()?;
    parts.next()
}

/// Index of the branch for `resource`: the branch named by the qualified
/// name, else the branch whose policy schema lists `resource` in its
/// `resource` enum (the primary provider's unqualified alias).
fn resource_branch(schema: &Value, branches: &[Value], resource: &str) -> Option<usize> {
    branches
        .iter()
        .position(|branch| branch_resource(branch) == Some(resource))
        .or_else(|| {
            branches
                .iter()
                .position(|branch| declares_resource(schema, branch, resource))
        })
}

fn declares_resource(schema: &Value, branch: &Value, resource: &str) -> bool {
    let Some(policy) = branch
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|reference| pointer::resolve_ref(schema, reference))
    else {
        return false;
    };
    let parts: Vec<&Value> = match policy.get("allOf").and_then(Value::as_array) {
        Some(parts) => parts.iter().collect(),
        None => vec![policy],
    };
    parts.iter().any(|part| {
        part.pointer("/properties/resource/enum")
            .and_then(Value::as_array)
            .is_some_and(|names| names.iter().any(|n| n.as_str() == Some(resource)))
    })
}

/// Index of the branch declaring `type_name`.
fn type_branch(branches: &[Value], type_name: &str) -> Option<usize> {
    branches.iter().position(|branch| {
        if let Some(reference) = branch.get("$ref").and_then(Value::as_str) {
            return reference.rsplit('/').next() == Some(type_name);
        }
        branch
            .pointer("/properties/type/enum")
            .and_then(Value::as_array)
            .is_some_and(|names| names.iter().any(|n| n.as_str() == Some(type_name)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Value {
        json!({
            "$schema": DRAFT_07,
            "definitions": {
                "resources": {
                    "aws.queue": {"policy": {
                        "type": "object",
                        "required": ["name"],
                        "properties": {
                            "resource": {"enum": ["aws.queue", "queue"]},
                            "actions": {"type": "array", "items": {"anyOf": [
                                {"$ref": "#/definitions/actions/notify"},
                                {
                                    "type": "object",
                                    "required": ["type", "days"],
                                    "properties": {"type": {"enum": ["purge"]}, "days": {"type": "integer"}}
                                },
                                {"enum": ["notify", "purge"]}
                            ]}}
                        }
                    }},
                    "gcp.queue": {"policy": {"properties": {"resource": {"enum": ["gcp.queue"]}}}}
                },
                "actions": {"notify": {
                    "type": "object",
                    "required": ["type", "to"],
                    "properties": {"type": {"enum": ["notify"]}, "to": {"type": "array"}}
                }}
            },
            "properties": {"policies": {"type": "array", "items": {"anyOf": [
                {"$ref": "#/definitions/resources/gcp.queue/policy"},
                {"$ref": "#/definitions/resources/aws.queue/policy"}
            ]}}}
        })
    }

    fn first_violation(schema: &Value, document: &Value) -> Violation {
        let validator = compile(schema).unwrap();
        violations(&validator, document).remove(0)
    }

    #[test]
    fn test_resource_then_type_narrowing() {
        let schema = schema();
        let document = json!({"policies": [
            {"name": "p", "resource": "queue", "actions": [{"type": "purge"}]}
        ]});
        let first = first_violation(&schema, &document);
        assert!(first.is_combinator());

        let specializer = Specializer::new(&schema, &document);
        let specific = specializer.specialize(first.clone()).unwrap();
        assert_eq!(specific.keyword().as_deref(), Some("required"));
        assert_eq!(specific.instance_path, "/policies/0/actions/0");
        assert!(specific.message.contains("days"));

        let scoped = specializer.scope(specific.clone());
        assert!(scoped.message.starts_with("error on policy:p resource:queue\n"));
        assert_eq!(specializer.policy_name(&specific, &first), "p");
    }

    #[test]
    fn test_type_narrowing_through_ref() {
        let schema = schema();
        let document = json!({"policies": [
            {"name": "p", "resource": "aws.queue", "actions": [{"type": "notify"}]}
        ]});
        let first = first_violation(&schema, &document);
        let specific = Specializer::new(&schema, &document).specialize(first).unwrap();
        assert_eq!(specific.keyword().as_deref(), Some("required"));
        assert!(specific.message.contains("to"));
    }

    #[test]
    fn test_unknown_resource_is_left_unspecialized() {
        let schema = schema();
        let document = json!({"policies": [{"name": "p", "resource": "nope", "actions": 3}]});
        let first = first_violation(&schema, &document);
        let specializer = Specializer::new(&schema, &document);
        let result = specializer.specialize(first.clone()).unwrap();
        assert_eq!(result, first);
        assert_eq!(specializer.policy_name(&result, &first), "p");
    }

    #[test]
    fn test_unresolvable_schema_path_fails() {
        let schema = schema();
        let document = json!({"policies": []});
        let bogus = Violation {
            instance_path: String::new(),
            schema_path: "/properties/nothing/anyOf".to_string(),
            message: "x".to_string(),
        };
        let err = Specializer::new(&schema, &document).specialize(bogus).unwrap_err();
        assert!(matches!(err, SpecializationError::UnresolvedSchemaPath(_)));
    }

    /// A policy whose `child` is another policy: every level of nesting adds
    /// one resource-discriminated `anyOf`.
    fn recursive_schema() -> Value {
        json!({
            "$schema": DRAFT_07,
            "definitions": {"resources": {"x": {"policy": {
                "type": "object",
                "properties": {"child": {"anyOf": [{"$ref": "#/definitions/resources/x/policy"}]}}
            }}}},
            "properties": {"policies": {"type": "array", "items": {"anyOf": [
                {"$ref": "#/definitions/resources/x/policy"}
            ]}}}
        })
    }

    fn nested_policy(levels: usize) -> Value {
        let mut policy = json!({"resource": "x", "child": 5});
        for _ in 0..levels {
            policy = json!({"resource": "x", "child": policy});
        }
        policy
    }

    #[test]
    fn test_recursion_is_bounded() {
        let schema = recursive_schema();
        let document = json!({"policies": [nested_policy(MAX_SPECIALIZATION_DEPTH + 2)]});
        let first = first_violation(&schema, &document);
        let specializer = Specializer::new(&schema, &document);
        let err = specializer.specialize(first).unwrap_err();
        assert_eq!(err, SpecializationError::DepthExceeded(MAX_SPECIALIZATION_DEPTH));

        let root = specializer.root.borrow();
        assert_eq!(root.len(), 2);
        assert!(root.contains_key("definitions") && root.contains_key("$schema"));
    }

    #[test]
    fn test_shallow_recursion_stops_at_undiscriminated_leaf() {
        let schema = recursive_schema();
        let document = json!({"policies": [nested_policy(2)]});
        let first = first_violation(&schema, &document);
        let specific = Specializer::new(&schema, &document).specialize(first).unwrap();
        assert!(specific.is_combinator());
        assert_eq!(specific.instance_path, "/policies/0/child/child/child");
    }

    #[test]
    fn test_best_match_descends_into_branches() {
        let schema = schema();
        let document = json!({"policies": [
            {"name": "p", "resource": "aws.queue", "actions": [{"type": "purge", "days": "x"}]}
        ]});
        let validator = compile(&schema).unwrap();
        let errors = violations(&validator, &document);
        let best = Specializer::new(&schema, &document).best_match(&errors).unwrap();
        assert!(!best.is_combinator());
        assert!(best.depth() > 2);
    }

    #[test]
    fn test_branch_selection() {
        let schema = schema();
        let branches = schema
            .pointer("/properties/policies/items/anyOf")
            .and_then(Value::as_array)
            .unwrap();
        assert_eq!(resource_branch(&schema, branches, "queue"), Some(1));
        assert_eq!(resource_branch(&schema, branches, "gcp.queue"), Some(0));
        assert_eq!(resource_branch(&schema, branches, "aws.queue"), Some(1));
        assert_eq!(resource_branch(&schema, branches, "nope"), None);

        let actions = vec![
            json!({"$ref": "#/definitions/actions/notify"}),
            json!({"properties": {"type": {"enum": ["tag", "mark"]}}}),
            json!({"enum": ["notify", "tag", "mark"]}),
        ];
        assert_eq!(type_branch(&actions, "mark"), Some(1));
        assert_eq!(type_branch(&actions, "notify"), Some(0));
        assert_eq!(type_branch(&actions, "purge"), None);
    }
}
