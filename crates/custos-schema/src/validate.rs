//! # Policy Validation
//!
//! Validates policy documents against the assembled schema and reduces the
//! validator's output to one scoped, actionable report.
//!
//! ## Report Shape
//!
//! A document yields at most one primary error plus the name of the policy it
//! belongs to ([`ValidationReport`]):
//!
//! - no schema violations and unique names: [`ValidationReport::Valid`];
//! - schema violations: the first violation, narrowed by the
//!   [specializer](crate::specialize) and prefixed with the enclosing
//!   policy's name and resource type;
//! - duplicate policy names: [`ValidationReport::DuplicateNames`];
//! - the specializer failed: the first raw violation plus the generic best
//!   match. Specialization failures are logged, never raised.
//!
//! ## Schema Resolution
//!
//! Every `$ref` in an assembled schema is local. The validator is built with
//! a retriever that refuses external URIs so validation never touches the
//! network.

use std::cmp::Reverse;
use std::fmt;
use std::sync::Arc;

use custos_core::Catalog;
use jsonschema::{Retrieve, Uri, Validator};
use serde::Serialize;
use serde_json::Value;

use crate::assemble::SchemaAssembler;
use crate::error::SchemaError;
use crate::pointer;
use crate::specialize::Specializer;
use crate::unique::{check_unique, DuplicateNames};

/// Refuses every external reference.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external reference {} cannot be resolved offline", uri.as_str()).into())
    }
}

/// Compile a draft-07 validator with external references disabled.
pub(crate) fn compile(schema: &Value) -> Result<Validator, String> {
    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft7);
    opts.with_retriever(OfflineRetriever);
    opts.build(schema).map_err(|e| e.to_string())
}

/// Collect every violation of `instance`.
pub(crate) fn violations(validator: &Validator, instance: &Value) -> Vec<Violation> {
    validator
        .iter_errors(instance)
        .map(|e| Violation {
            instance_path: e.instance_path.to_string(),
            schema_path: e.schema_path.to_string(),
            message: e.to_string(),
        })
        .collect()
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// JSON Pointer to the violating value in the document.
    pub instance_path: String,
    /// JSON Pointer to the failing keyword in the schema.
    pub schema_path: String,
    /// Human-readable message.
    pub message: String,
}

impl Violation {
    /// The failing keyword (`required`, `anyOf`, ...).
    pub fn keyword(&self) -> Option<String> {
        pointer::segments(&self.schema_path).pop()
    }

    /// Whether the failing keyword selects between alternatives.
    pub fn is_combinator(&self) -> bool {
        matches!(self.keyword().as_deref(), Some("anyOf" | "oneOf"))
    }

    /// Nesting depth of the violating value.
    pub fn depth(&self) -> usize {
        pointer::segments(&self.instance_path).len()
    }

    /// Ordering used by the generic best match: shallow first, then
    /// non-combinator violations.
    pub(crate) fn relevance(&self) -> (Reverse<usize>, bool) {
        (Reverse(self.depth()), !self.is_combinator())
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Outcome of validating one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReport {
    /// The document is schema-valid and every policy name is unique.
    Valid,
    /// A schema violation narrowed to the policy it belongs to.
    Rejected {
        /// The specialized violation, message prefixed with its policy scope.
        error: Violation,
        /// Name of the offending policy, or `unknown`.
        policy: String,
    },
    /// Every policy is schema-valid but names repeat.
    DuplicateNames {
        /// The duplicated names.
        error: DuplicateNames,
        /// One duplicated name.
        policy: String,
    },
    /// Specialization failed; the raw first violation and the best match.
    Unscoped {
        /// First violation reported by the validator.
        first: Violation,
        /// Generic best match over all violations.
        best_match: Option<Violation>,
    },
}

impl ValidationReport {
    /// Whether the document passed.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The policy the primary error is attributed to.
    pub fn policy(&self) -> Option<&str> {
        match self {
            Self::Rejected { policy, .. } | Self::DuplicateNames { policy, .. } => Some(policy),
            Self::Valid | Self::Unscoped { .. } => None,
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Rejected { error, .. } => {
                write!(f, "{}", error.message)?;
                if !error.instance_path.is_empty() {
                    write!(f, "\n  at {}", error.instance_path)?;
                }
                Ok(())
            }
            Self::DuplicateNames { error, .. } => write!(f, "{error}"),
            Self::Unscoped { first, best_match } => {
                write!(f, "{first}")?;
                if let Some(best) = best_match.as_ref().filter(|b| *b != first) {
                    write!(f, "\n  best match: {best}")?;
                }
                Ok(())
            }
        }
    }
}

/// A compiled validator for policy documents.
pub struct PolicyValidator {
    schema: Arc<Value>,
    validator: Validator,
}

impl fmt::Debug for PolicyValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyValidator")
            .field("id", &self.schema.get("id"))
            .finish_non_exhaustive()
    }
}

impl PolicyValidator {
    /// Compile `schema`. The schema is trusted; see [`checked`](Self::checked).
    ///
    /// # Errors
    ///
    /// [`SchemaError::Compile`] when the schema cannot be compiled.
    pub fn new(schema: impl Into<Arc<Value>>) -> Result<Self, SchemaError> {
        let schema = schema.into();
        let validator = compile(&schema).map_err(|reason| SchemaError::Compile { reason })?;
        Ok(Self { schema, validator })
    }

    /// Check `schema` against the draft-07 meta-schema, then compile it.
    ///
    /// # Errors
    ///
    /// [`SchemaError::MetaSchema`] or [`SchemaError::Compile`].
    pub fn checked(schema: impl Into<Arc<Value>>) -> Result<Self, SchemaError> {
        let schema = schema.into();
        jsonschema::meta::validate(&schema).map_err(|e| SchemaError::MetaSchema {
            reason: e.to_string(),
        })?;
        Self::new(schema)
    }

    /// Assemble the full schema from `catalog`, check it, and compile it.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Configuration`] when assembly fails, otherwise as
    /// [`checked`](Self::checked).
    pub fn from_catalog(catalog: &Catalog) -> Result<Self, SchemaError> {
        let schema = SchemaAssembler::new(catalog).generate(&[])?;
        Self::checked(schema)
    }

    /// The schema this validator enforces.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Every raw schema violation of `document`.
    pub fn violations(&self, document: &Value) -> Vec<Violation> {
        violations(&self.validator, document)
    }

    /// Validate `document` and reduce the outcome to one report.
    pub fn validate(&self, document: &Value) -> ValidationReport {
        let errors = self.violations(document);
        let Some(first) = errors.first() else {
            return match check_unique(document) {
                Some(error) => ValidationReport::DuplicateNames {
                    policy: error.representative().to_string(),
                    error,
                },
                None => ValidationReport::Valid,
            };
        };

        let specializer = Specializer::new(&self.schema, document);
        match specializer.specialize(first.clone()) {
            Ok(error) => {
                let policy = specializer.policy_name(&error, first);
                ValidationReport::Rejected {
                    error: specializer.scope(error),
                    policy,
                }
            }
            Err(reason) => {
                tracing::warn!(
                    error = %reason,
                    instance_path = %first.instance_path,
                    "error specialization failed, reporting unspecialized violations"
                );
                ValidationReport::Unscoped {
                    first: first.clone(),
                    best_match: specializer.best_match(&errors),
                }
            }
        }
    }
}

/// Validate `document`, assembling and checking a schema from `catalog`
/// unless one is supplied.
///
/// # Errors
///
/// Only for an unusable schema; document problems are reported in the
/// returned [`ValidationReport`].
pub fn validate(
    document: &Value,
    catalog: &Catalog,
    schema: Option<Arc<Value>>,
) -> Result<ValidationReport, SchemaError> {
    let validator = match schema {
        Some(schema) => PolicyValidator::new(schema)?,
        None => PolicyValidator::from_catalog(catalog)?,
    };
    Ok(validator.validate(document))
}
