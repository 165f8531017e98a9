//! confmerge CLI - Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use confmerge::{FieldMergeRule, MergeStrategy, SourceKind};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "confmerge")]
#[command(version)]
#[command(about = "Merge configuration sources and locate their values", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge configuration files (and optionally the environment) into JSON
    Merge {
        /// Files to merge, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Also read environment variables starting with PREFIX (merged last)
        #[arg(long, value_name = "PREFIX")]
        env_prefix: Option<String>,

        /// Global merge strategy (last_wins, first_wins, raise_on_conflict)
        #[arg(long, default_value = "last_wins")]
        strategy: MergeStrategy,

        /// Per-field strategy (PATH=STRATEGY, e.g. tags=append_unique)
        #[arg(long = "rule", value_name = "PATH=STRATEGY")]
        rules: Vec<FieldMergeRule>,

        /// Fields that must be overridden together (comma separated)
        #[arg(long = "group", value_name = "PATH,PATH...")]
        groups: Vec<String>,

        /// Name used in error reports
        #[arg(long, default_value = "Config")]
        name: String,

        /// Skip sources that fail to load instead of failing
        #[arg(long)]
        skip_broken: bool,

        /// Print which source produced each value instead of the merged tree
        #[arg(long)]
        report: bool,
    },

    /// Print the lines that define a field in a file
    Locate {
        /// File to search
        file: PathBuf,

        /// Dotted field path, e.g. database.port
        path: String,

        /// File format (detected from the extension by default)
        #[arg(long)]
        kind: Option<SourceKind>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "confmerge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Merge {
            files,
            env_prefix,
            strategy,
            rules,
            groups,
            name,
            skip_broken,
            report,
        } => commands::merge::execute(commands::merge::MergeArgs {
            files,
            env_prefix,
            strategy,
            rules,
            groups,
            name,
            skip_broken,
            report,
        }),
        Commands::Locate { file, path, kind } => {
            commands::locate::execute(commands::locate::LocateArgs { file, path, kind })
        }
    }
}
