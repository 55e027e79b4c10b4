//! # Type Schema Builder
//!
//! Nearly every filter, action, and mode declares the same schema shape: an
//! object discriminated by a `type` property whose enum holds the plugin's
//! name (and aliases), closed with `additionalProperties: false`. This
//! builder produces that shape.
//!
//! ```
//! use custos_core::TypeSchema;
//! use serde_json::json;
//!
//! let schema = TypeSchema::new("locked")
//!     .property("endpoint", json!({"type": "string"}))
//!     .required(&["endpoint"])
//!     .build();
//! assert_eq!(schema["required"], json!(["endpoint", "type"]));
//! assert_eq!(schema["properties"]["type"], json!({"enum": ["locked"]}));
//! ```

use serde_json::{json, Map, Value};

/// Builder for a `type`-discriminated object schema.
#[derive(Debug, Clone)]
pub struct TypeSchema {
    names: Vec<String>,
    base: Option<Value>,
    inherits: Vec<String>,
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl TypeSchema {
    /// Start a schema whose `type` enum holds `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            names: vec![name.into()],
            base: None,
            inherits: Vec::new(),
            properties: Map::new(),
            required: Vec::new(),
        }
    }

    /// Accept an additional `type` value.
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Start from a copy of `base`, retargeting its `type` enum.
    pub fn rinherit(mut self, base: &Value) -> Self {
        self.base = Some(base.clone());
        self
    }

    /// Combine with a referenced schema through `allOf`.
    ///
    /// Reference inheritance and `additionalProperties: false` do not mix, so
    /// an inheriting schema stays open.
    pub fn inherits(mut self, reference: impl Into<String>) -> Self {
        self.inherits.push(reference.into());
        self
    }

    /// Add a property schema.
    pub fn property(mut self, name: impl Into<String>, schema: Value) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Require properties in addition to `type`.
    pub fn required(mut self, names: &[&str]) -> Self {
        self.required.extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Produce the schema value.
    pub fn build(self) -> Value {
        let mut schema = match self.base {
            Some(Value::Object(base)) => base,
            _ => {
                let mut fresh = Map::new();
                fresh.insert("type".to_string(), json!("object"));
                fresh
            }
        };

        let mut properties = match schema.remove("properties") {
            Some(Value::Object(existing)) => existing,
            _ => Map::new(),
        };
        properties.insert("type".to_string(), json!({ "enum": self.names }));
        properties.extend(self.properties);
        schema.insert("properties".to_string(), Value::Object(properties));

        if self.inherits.is_empty() {
            schema.insert("additionalProperties".to_string(), Value::Bool(false));
        }

        let mut required = self.required;
        if !required.iter().any(|r| r == "type") {
            required.push("type".to_string());
        }
        schema.insert("required".to_string(), json!(required));

        if self.inherits.is_empty() {
            return Value::Object(schema);
        }
        let mut all_of: Vec<Value> = self
            .inherits
            .into_iter()
            .map(|reference| json!({ "$ref": reference }))
            .collect();
        all_of.push(Value::Object(schema));
        json!({ "allOf": all_of })
    }
}
