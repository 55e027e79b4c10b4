//! # custos-cli: Custos Command-Line Interface
//!
//! A clap-based front end over the policy engine core.
//!
//! ## Subcommands
//!
//! - `schema`: dump the assembled JSON Schema, optionally restricted to
//!   some resource types
//! - `validate`: validate policy files (YAML or JSON)
//! - `vocabulary`: filters and actions per resource type
//! - `summary`: per-provider counts
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers; handlers write to a
//!   caller-supplied writer and delegate to the library crates.
//! - Handlers obtain assembled schemas through one shared
//!   [`SchemaCache`](custos_schema::SchemaCache) per process.
//! - Logs go to stderr so stdout carries only command output.

pub mod schema;
pub mod validate;
pub mod vocabulary;

use std::path::Path;

use anyhow::Context;
use custos_core::{Catalog, EngineConfig};

/// Read the engine configuration, or use defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(EngineConfig::default());
    }
    serde_yaml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
}

/// Build the catalog of built-in plugins under `config`.
pub fn catalog(config: EngineConfig) -> anyhow::Result<Catalog> {
    custos_resources::builtin_catalog(config).context("registering built-in plugins")
}
