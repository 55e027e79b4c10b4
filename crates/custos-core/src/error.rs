//! # Error Types: Configuration Errors
//!
//! Configuration errors are build-time failures: a plugin declared an
//! inconsistent schema, or a policy names a component that no registry
//! holds. They abort whatever construction raised them. Document-level
//! validation failures are not errors in this sense; the schema crate
//! returns them as values.

use thiserror::Error;

use crate::plugin::ComponentKind;

/// A fatal configuration problem in the plugin catalog or a policy binding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A schema alias name was registered twice with different fragments.
    ///
    /// This is a plugin-authoring defect: every registration of an aliased
    /// component must carry a structurally identical schema.
    #[error("schema mismatch on type:{resource_type} {kind}:{name} w/ schema alias")]
    AliasMismatch {
        /// Qualified resource type being processed when the mismatch surfaced.
        resource_type: String,
        /// Whether the offending component is a filter or an action.
        kind: ComponentKind,
        /// The alias name.
        name: String,
    },

    /// A mapping declaration has no `type` key.
    #[error("invalid {kind} type found in {data}")]
    MissingType {
        /// Registry the declaration was resolved against.
        kind: ComponentKind,
        /// The declaration as JSON text.
        data: String,
    },

    /// A declaration names a type the registry does not hold.
    #[error("invalid {kind} type {name}, valid {kind}s: {}", .valid.join(", "))]
    UnknownType {
        /// Registry the declaration was resolved against.
        kind: ComponentKind,
        /// The unknown name.
        name: String,
        /// Every name currently registered.
        valid: Vec<String>,
    },

    /// A declaration is neither a bare name nor a mapping.
    #[error("invalid {kind} declaration {data}: expected a name or a mapping")]
    InvalidDeclaration {
        /// Registry the declaration was resolved against.
        kind: ComponentKind,
        /// The declaration as JSON text.
        data: String,
    },

    /// A name was registered twice under [`DuplicatePolicy::Reject`].
    ///
    /// [`DuplicatePolicy::Reject`]: crate::DuplicatePolicy::Reject
    #[error("{kind} {name} is already registered")]
    DuplicateRegistration {
        /// Registry that refused the binding.
        kind: ComponentKind,
        /// The contested name.
        name: String,
    },

    /// A policy names a resource type no provider declares.
    #[error("invalid resource type {name}, valid resources: {}", .valid.join(", "))]
    UnknownResource {
        /// The resource name from the policy.
        name: String,
        /// Every qualified resource type name in the catalog.
        valid: Vec<String>,
    },
}
