//! # Validate Subcommand
//!
//! Validates policy files against the assembled schema. Files that pass the
//! schema and uniqueness checks are also bound against the catalog, so every
//! filter and action must resolve to a registered plugin.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use custos_core::{bind_policy, Catalog};
use custos_schema::{load_document, PolicyValidator, SchemaCache, ValidationReport};
use serde_json::Value;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Policy files (`.yml`, `.yaml`, or `.json`).
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Validate every file, writing one line per file to `out`.
///
/// Returns whether every file passed.
pub fn run(
    args: &ValidateArgs,
    catalog: &Catalog,
    cache: &mut SchemaCache,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    let validator = PolicyValidator::checked(cache.get_or_generate(catalog, &[])?)?;
    let mut passed = true;
    for path in &args.files {
        let document = match load_document(path) {
            Ok(document) => document,
            Err(e) => {
                writeln!(out, "{}: {e}", path.display())?;
                passed = false;
                continue;
            }
        };
        match check(&validator, catalog, &document) {
            Ok(count) => writeln!(out, "{}: ok ({count} policies)", path.display())?,
            Err(message) => {
                tracing::debug!(file = %path.display(), "validation failed");
                writeln!(out, "{}: invalid\n{message}", path.display())?;
                passed = false;
            }
        }
    }
    Ok(passed)
}

/// Validate one document, then bind its policies. Returns the policy count.
fn check(validator: &PolicyValidator, catalog: &Catalog, document: &Value) -> Result<usize, String> {
    let report = validator.validate(document);
    if !matches!(report, ValidationReport::Valid) {
        return Err(report.to_string());
    }
    let policies = document
        .get("policies")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for policy in policies {
        bind_policy(catalog, policy).map_err(|e| {
            let name = policy.get("name").and_then(Value::as_str).unwrap_or("unknown");
            format!("error on policy:{name}\n{e}")
        })?;
    }
    Ok(policies.len())
}
