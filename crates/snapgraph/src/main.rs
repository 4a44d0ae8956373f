//! Snapgraph CLI - snapshot and object dependency graphs from the command line.
//!
//! Ingests pre-extracted source batches into a `SQLite` graph and answers
//! dependency, where-used and leveled traversal queries over it.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use snapgraph::{GraphConfig, DEFAULT_CONFIG_FILE};
use tracing_subscriber::EnvFilter;

mod cli;

/// Snapgraph: two-tier dependency graph engine.
#[derive(Parser)]
#[command(name = "snapgraph")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to .snapgraph/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the configuration
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest one or more JSON source batches
    Ingest {
        /// Batch files to ingest, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Show what a snapshot (or object version) directly depends on
    Children {
        /// Snapshot ID, or object version ID with --object
        id: i64,

        /// Treat the ID as an object version
        #[arg(short, long)]
        object: bool,
    },

    /// Show what directly depends on a snapshot (or object version)
    WhereUsed {
        /// Snapshot ID, or object version ID with --object
        id: i64,

        /// Treat the ID as an object version
        #[arg(short, long)]
        object: bool,
    },

    /// List the object versions belonging to a snapshot
    Members {
        /// Snapshot ID
        snapshot: i64,

        /// Only list object versions of this type
        #[arg(short = 't', long = "type")]
        object_type: Option<String>,
    },

    /// Print the dependency graph level by level
    Levels {
        /// Start from roots instead of leaves
        #[arg(short, long)]
        roots: bool,

        /// Walk the object version graph instead of the snapshot graph
        #[arg(short, long)]
        objects: bool,
    },

    /// Detect circular dependencies
    Cycles,

    /// Remove snapshots and sweep whatever they leave orphaned
    Remove {
        /// Remove every snapshot of this application
        #[arg(long, conflicts_with = "snapshots")]
        app: Option<i64>,

        /// Snapshot IDs to remove
        #[arg(required_unless_present = "app")]
        snapshots: Vec<i64>,
    },

    /// Sweep orphaned rows
    Cleanup {
        /// Vacuum the database afterwards
        #[arg(long)]
        vacuum: bool,
    },

    /// Show row counts
    Stats,
}

fn load_config(cli: &Cli) -> Result<GraphConfig, snapgraph::Error> {
    let mut config = match &cli.config {
        Some(path) => GraphConfig::load(path)?,
        None => GraphConfig::load_or_default(Path::new(DEFAULT_CONFIG_FILE))?,
    };

    if let Some(database) = &cli.database {
        config.database.clone_from(database);
    }

    config.validate()?;
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let result = load_config(&cli).and_then(|config| match cli.command {
        Commands::Ingest { files } => cli::ingest::run(&config, &files),
        Commands::Children { id, object } => cli::children::run(&config, id, object),
        Commands::WhereUsed { id, object } => cli::where_used::run(&config, id, object),
        Commands::Members {
            snapshot,
            object_type,
        } => cli::members::run(&config, snapshot, object_type.as_deref()),
        Commands::Levels { roots, objects } => cli::levels::run(&config, roots, objects),
        Commands::Cycles => cli::cycles::run(&config),
        Commands::Remove { app, snapshots } => {
            let target = match app {
                Some(app_id) => cli::remove::Target::App(app_id),
                None => cli::remove::Target::Snapshots(snapshots),
            };
            cli::remove::run(&config, target)
        }
        Commands::Cleanup { vacuum } => cli::cleanup::run(&config, vacuum),
        Commands::Stats => cli::stats::run(&config),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}
