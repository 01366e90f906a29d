//! Nexus CLI - Command-line interface for Addon Nexus
//!
//! This is the main entry point for users interacting with the index.
//! It provides commands for indexing a project, asking what a file is,
//! following references in both directions, and watching for changes.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "nexus")]
#[command(author = "Addon Nexus Contributors")]
#[command(version)]
#[command(about = "Identifier index and reference graph for addon projects", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Follow symbolic links while scanning
    #[arg(long, global = true)]
    follow_symlinks: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config to .nexus/config.json
    Init {
        /// Project root (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Scan the project and build the index
    Index {
        /// Project root (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Write the structure and reference graph as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the kind and identifiers of a file
    Kind {
        /// File to look up
        file: PathBuf,

        /// Project root
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },

    /// Show what a file references and what references it
    Uses {
        /// File to look up
        file: PathBuf,

        /// Project root
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List the files that reference an identifier
    UsedBy {
        /// Kind of the identifier, e.g. animation or texture
        kind: String,

        /// The identifier itself
        identifier: String,

        /// Project root
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },

    /// Show index statistics
    Status {
        /// Project root (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Also list dangling references
        #[arg(long)]
        dangling: bool,
    },

    /// Index, then keep the index current as files change
    Watch {
        /// Project root (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let follow = cli.follow_symlinks;
    let result = match cli.command {
        Commands::Init { path } => commands::init(&path),
        Commands::Index { path, output } => commands::index(&path, output.as_deref(), follow),
        Commands::Kind { file, root } => commands::kind(&root, &file, follow),
        Commands::Uses { file, root, json } => commands::uses(&root, &file, json, follow),
        Commands::UsedBy {
            kind,
            identifier,
            root,
        } => commands::used_by(&root, &kind, &identifier, follow),
        Commands::Status { path, dangling } => commands::status(&path, dangling, follow),
        Commands::Watch { path } => commands::watch(&path, follow).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
