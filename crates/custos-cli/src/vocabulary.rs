//! # Vocabulary and Summary Subcommands

use std::io::Write;

use clap::Args;
use custos_core::Catalog;
use custos_schema::{resource_vocabulary, summary};

/// Arguments for the vocabulary subcommand.
#[derive(Args, Debug, Default)]
pub struct VocabularyArgs {
    /// Only list resource types of this provider.
    #[arg(long)]
    pub provider: Option<String>,

    /// Key resource types by their bare name.
    #[arg(long)]
    pub unqualified: bool,
}

/// Write the vocabulary to `out` as YAML.
pub fn run(args: &VocabularyArgs, catalog: &Catalog, out: &mut impl Write) -> anyhow::Result<()> {
    if let Some(provider) = args.provider.as_deref() {
        if catalog.providers().get(provider).is_none() {
            let known: Vec<&str> = catalog.providers().keys().collect();
            anyhow::bail!("unknown provider {provider}, valid providers: {}", known.join(", "));
        }
    }
    let vocabulary = resource_vocabulary(catalog, args.provider.as_deref(), !args.unqualified);
    serde_yaml::to_writer(&mut *out, &vocabulary)?;
    Ok(())
}

/// Write per-provider counts to `out`.
pub fn run_summary(catalog: &Catalog, out: &mut impl Write) -> anyhow::Result<()> {
    let summary = summary(&resource_vocabulary(catalog, None, true));
    for (provider, counts) in &summary.providers {
        writeln!(
            out,
            "{provider}: {} resources, {} actions, {} filters",
            counts.resources, counts.actions, counts.filters
        )?;
    }
    writeln!(out, "modes: {}", summary.modes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use custos_core::EngineConfig;

    #[test]
    fn test_provider_vocabulary() {
        let catalog = crate::catalog(EngineConfig::default()).unwrap();
        let args = VocabularyArgs {
            provider: Some("gcp".to_string()),
            unqualified: true,
        };
        let mut out = Vec::new();
        run(&args, &catalog, &mut out).unwrap();
        let doc: serde_yaml::Value = serde_yaml::from_slice(&out).unwrap();
        assert!(doc["resources"]["bucket"]["actions"].is_sequence());
        assert!(doc["resources"].get("aws.sns").is_none());
    }

    #[test]
    fn test_unknown_provider() {
        let catalog = crate::catalog(EngineConfig::default()).unwrap();
        let args = VocabularyArgs {
            provider: Some("azure".to_string()),
            unqualified: false,
        };
        let err = run(&args, &catalog, &mut Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "unknown provider azure, valid providers: aws, gcp");
    }

    #[test]
    fn test_summary_lines() {
        let catalog = crate::catalog(EngineConfig::default()).unwrap();
        let mut out = Vec::new();
        run_summary(&catalog, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("aws: "));
        assert!(lines[1].starts_with("gcp: 2 resources"));
        assert_eq!(lines[2], "modes: 9");
    }
}
