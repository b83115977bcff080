//! Alloc Dump CLI
//!
//! Renders memory profiler snapshots as allocation reports
//! by location and by data type.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use alloc_dump::commands::{
    display_version, execute_render, validate_args, validate_snapshot_file, RenderArgs,
};
use alloc_dump::utils::config::DEFAULT_THRESHOLD;

/// Alloc Dump - allocation reports for memory profiler snapshots
#[derive(Parser, Debug)]
#[command(name = "alloc-dump")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a snapshot as a text report
    Render {
        /// Snapshot JSON file
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Report kind echoed in the header (e.g. "Last", "Total")
        #[arg(short, long, default_value = "Snapshot")]
        kind: String,

        /// Display threshold as a fraction of the total (0.001 = 0.1%)
        #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,

        /// TOML file with `mode` ("size" or "count") and `level`
        #[arg(short, long, env = "ALLOC_DUMP_CONFIG")]
        config: Option<PathBuf>,

        /// Report by object count instead of size
        #[arg(long)]
        by_count: bool,

        /// Hop limit for showing data types linked to significant ones
        #[arg(short, long)]
        level: Option<u32>,

        /// Output path for the report (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a snapshot JSON file
    Validate {
        /// Path to snapshot JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Render {
            snapshot,
            kind,
            threshold,
            config,
            by_count,
            level,
            output,
        } => {
            let args = RenderArgs {
                snapshot,
                kind,
                threshold,
                config,
                by_count,
                level,
                output,
            };

            // Validate args first
            validate_args(&args)?;

            execute_render(args)?;
        }

        Commands::Validate { file } => {
            validate_snapshot_file(file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
