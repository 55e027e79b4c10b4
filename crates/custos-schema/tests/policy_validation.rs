//! End-to-end validation of policy documents against the built-in catalog.

use custos_core::EngineConfig;
use custos_resources::builtin_catalog;
use custos_schema::{PolicyValidator, ValidationReport};
use serde_json::{json, Value};

fn validator() -> PolicyValidator {
    let catalog = builtin_catalog(EngineConfig::default()).unwrap();
    PolicyValidator::from_catalog(&catalog).unwrap()
}

fn rejected(report: ValidationReport) -> (custos_schema::Violation, String) {
    match report {
        ValidationReport::Rejected { error, policy } => (error, policy),
        other => panic!("Expected Rejected, got: {other:?}"),
    }
}

fn single(policy: Value) -> Value {
    json!({"policies": [policy]})
}

#[test]
fn test_minimal_policy_valid_for_every_resource_type() {
    let catalog = builtin_catalog(EngineConfig::default()).unwrap();
    let validator = PolicyValidator::from_catalog(&catalog).unwrap();
    for resource in catalog.resource_types() {
        let qualified = resource.qualified_name();
        let report = validator.validate(&single(json!({"name": "a", "resource": qualified})));
        assert!(report.is_valid(), "{qualified}: {report}");

        if resource.provider == catalog.primary_provider() {
            let bare = resource.resource.name();
            let report = validator.validate(&single(json!({"name": "a", "resource": bare})));
            assert!(report.is_valid(), "{bare}: {report}");
        }
    }
}

#[test]
fn test_unqualified_name_only_for_primary_provider() {
    let (error, _) = rejected(validator().validate(&single(json!({"name": "a", "resource": "bucket"}))));
    assert!(error.message.starts_with("error on policy:a resource:bucket\n"));
}

#[test]
fn test_full_policy_valid() {
    let doc = json!({
        "vars": {"owner": "security"},
        "policies": [{
            "name": "trail-logging",
            "resource": "aws.cloudtrail",
            "mode": {"type": "periodic", "schedule": "rate(1 day)"},
            "filters": [
                {"type": "status", "key": "IsLogging", "value": false},
                {"or": [{"tag:Owner": "absent"}, {"type": "value", "key": "Name", "value": "x"}]},
                "is-shadow"
            ],
            "actions": [
                {"type": "update-trail", "attributes": {"EnableLogFileValidation": true}},
                "set-logging",
                {"type": "notify", "to": ["team@example.com"], "transport": {"type": "sns", "topic": "arn"}}
            ]
        }]
    });
    let report = validator().validate(&doc);
    assert!(report.is_valid(), "{report}");
}

#[test]
fn test_duplicate_names_fail_only_uniqueness() {
    let doc = json!({"policies": [
        {"name": "a", "resource": "aws.sns"},
        {"name": "a", "resource": "aws.efs"}
    ]});
    match validator().validate(&doc) {
        ValidationReport::DuplicateNames { error, policy } => {
            assert_eq!(policy, "a");
            assert_eq!(error.counts()["a"], 2);
        }
        other => panic!("Expected DuplicateNames, got: {other:?}"),
    }
}

#[test]
fn test_unknown_resource_scoped_to_policy() {
    let report = validator().validate(&single(json!({"name": "a", "resource": "does-not-exist"})));
    assert_eq!(report.policy(), Some("a"));
    let (error, _) = rejected(report);
    assert!(error.message.starts_with("error on policy:a resource:does-not-exist\n"), "{}", error.message);
    assert_eq!(error.instance_path, "/policies/0");
}

#[test]
fn test_action_missing_required_key_is_specialized() {
    let doc = single(json!({
        "name": "trail",
        "resource": "aws.cloudtrail",
        "actions": [{"type": "update-trail"}]
    }));
    let (error, policy) = rejected(validator().validate(&doc));
    assert_eq!(policy, "trail");
    assert_eq!(error.keyword().as_deref(), Some("required"));
    assert_eq!(error.instance_path, "/policies/0/actions/0");
    assert!(error.message.starts_with("error on policy:trail resource:aws.cloudtrail\n"));
    assert!(error.message.contains("attributes"), "{}", error.message);
}

#[test]
fn test_filter_missing_required_key_is_specialized() {
    let doc = json!({"policies": [
        {"name": "ok", "resource": "aws.sns"},
        {"name": "lock", "resource": "account", "filters": [{"type": "locked", "role": "r"}]}
    ]});
    let (error, policy) = rejected(validator().validate(&doc));
    assert_eq!(policy, "lock");
    assert_eq!(error.keyword().as_deref(), Some("required"));
    assert_eq!(error.instance_path, "/policies/1/filters/0");
    assert!(error.message.contains("endpoint"), "{}", error.message);

    // A lone `type` key also reads as the single key/value shorthand.
    let shorthand = single(json!({"name": "lock", "resource": "account", "filters": [{"type": "locked"}]}));
    assert!(validator().validate(&shorthand).is_valid());
}

#[test]
fn test_unknown_action_type_stays_at_action_list() {
    let doc = single(json!({
        "name": "a",
        "resource": "aws.sns",
        "actions": [{"type": "launch-rocket"}]
    }));
    let (error, _) = rejected(validator().validate(&doc));
    assert!(error.is_combinator());
    assert_eq!(error.instance_path, "/policies/0/actions/0");
}

#[test]
fn test_action_of_other_resource_rejected() {
    let doc = single(json!({"name": "a", "resource": "aws.cloudtrail", "actions": ["terminate"]}));
    let (error, _) = rejected(validator().validate(&doc));
    assert_eq!(error.instance_path, "/policies/0/actions/0");
}

#[test]
fn test_bad_policy_name_rejected() {
    let (error, policy) = rejected(validator().validate(&single(json!({"name": "-bad", "resource": "sns"}))));
    assert_eq!(policy, "-bad");
    assert_eq!(error.instance_path, "/policies/0/name");
    assert_eq!(error.keyword().as_deref(), Some("pattern"));
}

#[test]
fn test_top_level_violation_is_unscoped() {
    let (error, policy) = rejected(validator().validate(&json!({"policies": [], "extra": 1})));
    assert_eq!(policy, "unknown");
    assert!(!error.message.starts_with("error on policy"));
}

#[test]
fn test_resource_restricted_schema() {
    let catalog = builtin_catalog(EngineConfig::default()).unwrap();
    let schema = custos_schema::SchemaAssembler::new(&catalog).generate(&["aws.sns"]).unwrap();
    let report = custos_schema::validate(
        &single(json!({"name": "a", "resource": "aws.efs"})),
        &catalog,
        Some(schema.into()),
    )
    .unwrap();
    assert!(!report.is_valid());
    let report = custos_schema::validate(&single(json!({"name": "a", "resource": "sns"})), &catalog, None).unwrap();
    assert!(report.is_valid());
}
