//! # Error Types
//!
//! [`SchemaError`] covers building a validator: assembling the schema,
//! checking it against the draft-07 meta-schema, compiling it, and loading
//! documents. Document-level failures are not errors; they are returned as a
//! [`ValidationReport`](crate::ValidationReport).
//!
//! [`SpecializationError`] never leaves the crate. The validator catches it
//! and degrades to the fallback report.

use custos_core::ConfigurationError;
use thiserror::Error;

/// Failure to produce a usable validator or to load a document.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A plugin declaration is inconsistent (alias mismatch, duplicate).
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The assembled schema is not a valid draft-07 schema.
    #[error("assembled schema fails the draft-07 meta-schema: {reason}")]
    MetaSchema {
        /// First meta-schema violation.
        reason: String,
    },

    /// The schema could not be compiled into a validator.
    #[error("schema compile error: {reason}")]
    Compile {
        /// Compiler message.
        reason: String,
    },

    /// A policy document could not be read or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path of the document.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },
}

/// Why a violation could not be narrowed to a single branch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum SpecializationError {
    #[error("schema path {0} does not resolve")]
    UnresolvedSchemaPath(String),

    #[error("instance path {0} does not resolve")]
    UnresolvedInstancePath(String),

    #[error("{keyword} at {path} is not an array of branches")]
    NotCombinator { keyword: String, path: String },

    #[error("specialization exceeded depth {0}")]
    DepthExceeded(usize),

    #[error("branch {index} at {path} failed to compile: {reason}")]
    BranchCompile {
        index: usize,
        path: String,
        reason: String,
    },
}
