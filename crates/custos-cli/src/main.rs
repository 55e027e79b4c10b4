//! # custos CLI Entry Point
//!
//! Parses arguments, sets up logging, and dispatches to the handler modules.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use custos_cli::{schema, validate, vocabulary};
use custos_schema::SchemaCache;
use tracing_subscriber::EnvFilter;

/// Custos: cloud governance policy engine.
///
/// Assembles the policy JSON Schema from the built-in plugin catalog and
/// validates policy files against it.
#[derive(Parser, Debug)]
#[command(name = "custos", version, about)]
struct Cli {
    /// Engine configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print the assembled policy schema.
    Schema(schema::SchemaArgs),
    /// Validate policy files.
    Validate(validate::ValidateArgs),
    /// List filters and actions per resource type.
    Vocabulary(vocabulary::VocabularyArgs),
    /// Per-provider counts of resource types, filters, and actions.
    Summary,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = custos_cli::load_config(cli.config.as_deref())?;
    let catalog = custos_cli::catalog(config)?;
    let mut cache = SchemaCache::new();
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Schema(args) => schema::run(&args, &catalog, &mut cache, &mut stdout)?,
        Commands::Validate(args) => {
            if !validate::run(&args, &catalog, &mut cache, &mut stdout)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Vocabulary(args) => vocabulary::run(&args, &catalog, &mut stdout)?,
        Commands::Summary => vocabulary::run_summary(&catalog, &mut stdout)?,
    }

    Ok(ExitCode::SUCCESS)
}
