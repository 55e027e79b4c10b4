//! # custos-schema: Schema Assembly & Policy Validation
//!
//! Turns a populated [`Catalog`](custos_core::Catalog) into one draft-07
//! JSON Schema describing every valid policy document, and validates
//! documents against it.
//!
//! ## Assembly (`assemble`)
//!
//! [`SchemaAssembler::generate`] walks every provider, resource type,
//! filter, action, and mode. Shared components land once in
//! `definitions.filters` / `definitions.actions`; the rest are inlined per
//! resource type. Policies are validated through the `anyOf` at
//! [`POLICY_BRANCHES_POINTER`], one branch per resource type.
//!
//! ## Validation (`validate`)
//!
//! [`PolicyValidator::validate`] compiles the schema once and reduces the
//! validator's output to a single [`ValidationReport`]. The first violation
//! is narrowed through the per-resource and per-type `anyOf` branches so the
//! report names the offending filter or action rather than "not valid under
//! any of the given schemas". When a document is schema-valid,
//! [`check_unique`] enforces distinct policy names.
//!
//! ## Crate Policy
//!
//! - Every `$ref` in an assembled schema is local; validation never resolves
//!   external URIs.
//! - The branch layout at [`POLICY_BRANCHES_POINTER`] is a contract between
//!   the assembler and the error specializer.

pub mod assemble;
pub mod cache;
pub mod definitions;
pub mod error;
pub mod load;
mod pointer;
mod specialize;
pub mod unique;
pub mod validate;
pub mod vocabulary;

pub use assemble::{SchemaAssembler, DRAFT_07, POLICY_BRANCHES_POINTER, RESOURCE_BRANCH_DEPTH};
pub use cache::SchemaCache;
pub use error::SchemaError;
pub use load::{load_document, parse_yaml};
pub use unique::{check_unique, DuplicateNames};
pub use validate::{validate, PolicyValidator, ValidationReport, Violation};
pub use vocabulary::{resource_vocabulary, summary, ProviderSummary, ResourceVocabulary, Summary, Vocabulary};
