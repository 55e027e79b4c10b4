//! # Schema Subcommand
//!
//! Dumps the assembled policy schema as JSON.

use std::io::Write;

use clap::Args;
use custos_core::Catalog;
use custos_schema::SchemaCache;

/// Arguments for the schema subcommand.
#[derive(Args, Debug, Default)]
pub struct SchemaArgs {
    /// Restrict the schema to these resource types (qualified or unqualified).
    #[arg(long = "resource", short = 'r')]
    pub resources: Vec<String>,

    /// Print on one line.
    #[arg(long)]
    pub compact: bool,
}

/// Write the schema to `out`.
pub fn run(
    args: &SchemaArgs,
    catalog: &Catalog,
    cache: &mut SchemaCache,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let names: Vec<&str> = args.resources.iter().map(String::as_str).collect();
    let schema = cache.get_or_generate(catalog, &names)?;
    if args.compact {
        serde_json::to_writer(&mut *out, schema.as_ref())?;
    } else {
        serde_json::to_writer_pretty(&mut *out, schema.as_ref())?;
    }
    writeln!(out)?;
    Ok(())
}
