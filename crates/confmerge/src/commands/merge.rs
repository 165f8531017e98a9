//! `confmerge merge`

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use confmerge::{FieldGroup, FieldMergeRule, Loader, MergeOptions, MergeStrategy, Source};

/// Arguments for the merge command
#[derive(Debug)]
pub struct MergeArgs {
    pub files: Vec<PathBuf>,
    pub env_prefix: Option<String>,
    pub strategy: MergeStrategy,
    pub rules: Vec<FieldMergeRule>,
    /// Comma separated field paths, one group per entry
    pub groups: Vec<String>,
    pub name: String,
    pub skip_broken: bool,
    pub report: bool,
}

pub fn execute(args: MergeArgs) -> Result<()> {
    let options = build_options(args.files, args.env_prefix, args.strategy, args.rules, &args.groups, args.name)
        .skip_broken_sources(args.skip_broken);
    debug!(sources = options.sources.len(), strategy = %options.strategy, "merging");

    let loaded = match Loader::new(options).load() {
        Ok(loaded) => loaded,
        Err(err) => {
            eprint!("{err}");
            std::process::exit(1);
        }
    };

    let output = if args.report {
        serde_json::to_string_pretty(&loaded.report())
    } else {
        serde_json::to_string_pretty(&loaded.value().to_json())
    }
    .context("Failed to serialize output")?;
    println!("{output}");
    Ok(())
}

fn build_options(
    files: Vec<PathBuf>,
    env_prefix: Option<String>,
    strategy: MergeStrategy,
    rules: Vec<FieldMergeRule>,
    groups: &[String],
    name: String,
) -> MergeOptions {
    let mut options = MergeOptions::new(name).strategy(strategy);
    for file in files {
        options = options.source(Source::file(file));
    }
    if let Some(prefix) = env_prefix {
        options = options.source(Source::env().prefix(prefix));
    }
    for rule in rules {
        options = options.field_merge(rule);
    }
    for group in groups {
        let paths = group.split(',').map(str::trim).filter(|p| !p.is_empty());
        options = options.field_group(FieldGroup::new(paths));
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use confmerge::FieldMergeStrategy;

    #[test]
    fn test_build_options() {
        let options = build_options(
            vec![PathBuf::from("a.json"), PathBuf::from("b.yaml")],
            Some("APP_".into()),
            MergeStrategy::RaiseOnConflict,
            vec![FieldMergeRule::new("tags", FieldMergeStrategy::Append)],
            &["host, port".to_string()],
            "App".into(),
        );
        assert_eq!(options.name, "App");
        assert_eq!(options.sources.len(), 3);
        assert_eq!(options.sources[2], Source::env().prefix("APP_"));
        assert_eq!(options.field_groups, vec![FieldGroup::new(["host", "port"])]);
        assert_eq!(options.field_merges.len(), 1);
    }
}
