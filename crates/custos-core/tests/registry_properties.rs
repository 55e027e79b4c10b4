//! Property tests for the plugin registry: last write wins, and `parse`
//! preserves declaration order.

use std::collections::HashMap;
use std::sync::Arc;

use custos_core::{Component, ComponentKind, ComponentRegistry, Plugin};
use proptest::prelude::*;
use serde_json::{json, Value};

fn tagged(name: &str, generation: usize) -> Arc<dyn Plugin> {
    Arc::new(Component::new(json!({
        "properties": {"type": {"enum": [name]}},
        "x-generation": generation
    })))
}

proptest! {
    #[test]
    fn last_registration_wins(names in proptest::collection::vec("[a-e]", 1..40)) {
        let mut registry = ComponentRegistry::new(ComponentKind::Filter);
        let mut expected: HashMap<String, usize> = HashMap::new();
        for (generation, name) in names.iter().enumerate() {
            registry.register(name.clone(), tagged(name, generation)).unwrap();
            expected.insert(name.clone(), generation);
        }

        prop_assert_eq!(registry.len(), expected.len());
        prop_assert_eq!(registry.revision(), names.len() as u64);
        for (name, generation) in &expected {
            let schema = registry.get(name).unwrap().schema();
            prop_assert_eq!(&schema["x-generation"], &json!(generation));
        }
    }

    #[test]
    fn parse_preserves_order(picks in proptest::collection::vec(0usize..3, 0..20)) {
        let names = ["delete", "notify", "tag"];
        let mut registry = ComponentRegistry::new(ComponentKind::Action);
        for (generation, name) in names.iter().enumerate() {
            registry.register(*name, tagged(name, generation)).unwrap();
        }

        let declarations: Vec<Value> = picks
            .iter()
            .enumerate()
            .map(|(i, &p)| if i % 2 == 0 { json!(names[p]) } else { json!({"type": names[p]}) })
            .collect();
        let instances = registry.parse(&declarations, &()).unwrap();

        let resolved: Vec<&str> = instances.iter().map(|i| i.type_name.as_str()).collect();
        let wanted: Vec<&str> = picks.iter().map(|&p| names[p]).collect();
        prop_assert_eq!(resolved, wanted);
    }
}
