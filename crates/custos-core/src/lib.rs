//! # custos-core: Foundational Types for the Custos Policy Engine
//!
//! Custos policies bind one resource type to a list of filters and a list
//! of actions. Resource types, filters, actions, and execution modes are
//! all plugins: they declare a JSON Schema fragment and a name, and are
//! registered into a runtime catalog at startup.
//!
//! This crate defines that catalog. Every other crate in the workspace
//! depends on `custos-core`; it depends on nothing internal.
//!
//! ## Key Types
//!
//! - [`Plugin`]: the schema-bearing component contract.
//! - [`PluginRegistry`]: name → component catalog, reused for filters,
//!   actions, execution modes, resource types, and providers.
//! - [`ResourceType`] / [`Provider`] / [`Catalog`]: the transitive registry
//!   structure the schema assembler walks.
//! - [`TypeSchema`]: builder for the `{type: {enum: [name]}, ...}` schema
//!   shape nearly every plugin declares.
//! - [`bind_policy`]: turns a policy document into bound plugin instances.
//! - [`common`]: the value-filter schema family every resource shares.
//!
//! ## Lifecycle
//!
//! Registries are populated once, then treated as read-only. Providers and
//! resource types are frozen behind `Arc` when registered, so mutation after
//! population requires rebuilding them. [`Catalog::revision`] changes on every
//! registration and is the cache key for assembled schemas.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `custos-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod catalog;
pub mod common;
pub mod config;
pub mod error;
pub mod plugin;
pub mod policy;
pub mod registry;
pub mod resource;
pub mod schema;

// Re-export primary types for ergonomic imports.
pub use catalog::{Catalog, QualifiedResource};
pub use config::{EngineConfig, DEFAULT_PRIMARY_PROVIDER, DEFAULT_SCHEMA_ID};
pub use error::ConfigurationError;
pub use plugin::{Component, ComponentKind, Plugin};
pub use policy::{bind_policy, BoundComponent, BoundFilter, BoundPolicy, PolicyContext, BOOLEAN_FILTERS};
pub use registry::{ComponentRegistry, DuplicatePolicy, Instance, PluginRegistry};
pub use resource::{Provider, ResourceType};
pub use schema::TypeSchema;
