//! Render command implementation.
//!
//! The render command:
//! 1. Resolves the report configuration (TOML file, then CLI overrides)
//! 2. Loads the snapshot
//! 3. Renders the report
//! 4. Writes it to stdout or a file

use crate::output::{read_snapshot, write_report};
use crate::report::DumpFormatter;
use crate::utils::config::{
    load_config, validate_threshold, ReportConfig, ReportMode, DEFAULT_THRESHOLD,
};
use anyhow::{Context, Result};
use log::{debug, info};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the render command
#[derive(Debug, Clone)]
pub struct RenderArgs {
    /// Snapshot JSON to render
    pub snapshot: PathBuf,

    /// Report kind label echoed in the header
    pub kind: String,

    /// Display threshold as a fraction of the total
    pub threshold: f64,

    /// Optional TOML file with `mode` and `level`
    pub config: Option<PathBuf>,

    /// Force count mode regardless of the config file
    pub by_count: bool,

    /// Override the hop limit from the config file
    pub level: Option<u32>,

    /// Output path (stdout when None)
    pub output: Option<PathBuf>,
}

impl Default for RenderArgs {
    fn default() -> Self {
        Self {
            snapshot: PathBuf::from("snapshot.json"),
            kind: "Snapshot".to_string(),
            threshold: DEFAULT_THRESHOLD,
            config: None,
            by_count: false,
            level: None,
            output: None,
        }
    }
}

/// Validate render arguments
pub fn validate_args(args: &RenderArgs) -> Result<()> {
    if args.snapshot.as_os_str().is_empty() {
        anyhow::bail!("Snapshot path cannot be empty");
    }

    if args.kind.trim().is_empty() {
        anyhow::bail!("Report kind cannot be empty");
    }

    validate_threshold(args.threshold)?;

    Ok(())
}

/// Merge the config file (if any) with the CLI overrides
pub fn resolve_config(args: &RenderArgs) -> Result<ReportConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ReportConfig::default(),
    };
    if args.by_count {
        config.mode = ReportMode::Count;
    }
    if let Some(level) = args.level {
        config.level = level;
    }
    Ok(config)
}

/// Render a snapshot into report text
pub fn render_report(args: &RenderArgs) -> Result<String> {
    let config = resolve_config(args)?;
    debug!("Report config: {:?}", config);

    let snapshot = read_snapshot(&args.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", args.snapshot.display()))?;

    let mut formatter = DumpFormatter::new(config);
    let report = formatter
        .render_to_string(&snapshot, &args.kind, args.threshold)
        .context("Failed to render report")?;
    Ok(report)
}

/// Execute the render command
pub fn execute_render(args: RenderArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Rendering snapshot: {}", args.snapshot.display());

    let report = render_report(&args)?;

    match &args.output {
        Some(path) => {
            write_report(&report, path).context("Failed to write report")?;
            info!("✓ Report written to: {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            lock.write_all(report.as_bytes())
                .context("Failed to write report to stdout")?;
            lock.flush()?;
        }
    }

    let elapsed = start_time.elapsed();
    info!("Render completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}
