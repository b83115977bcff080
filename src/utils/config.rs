//! Configuration and constants for report rendering.

use super::error::ConfigError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Width of the `=` and `-` tear lines framing report sections
pub const TEAR_LINE_LENGTH: usize = 120;

/// Default display threshold (0.1% of the grand total)
pub const DEFAULT_THRESHOLD: f64 = 0.001;

/// Default hop limit for level propagation (0 = only directly significant types)
pub const DEFAULT_HOP_LIMIT: u32 = 0;

/// Name of the synthetic node holding allocations with unresolved call sites
pub const UNKNOWN: &str = "<unknown>";

/// Current snapshot input schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Which metric drives thresholds and output ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// Compare and sort by allocated bytes
    #[default]
    Size,
    /// Compare and sort by allocated object count
    Count,
}

impl ReportMode {
    pub fn is_size(self) -> bool {
        self == ReportMode::Size
    }
}

/// The two scalars the report needs from the profiler configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Report by size or by count
    #[serde(default)]
    pub mode: ReportMode,

    /// Hop limit for showing data types reachable from significant ones
    #[serde(default = "default_level")]
    pub level: u32,
}

fn default_level() -> u32 {
    DEFAULT_HOP_LIMIT
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            mode: ReportMode::default(),
            level: DEFAULT_HOP_LIMIT,
        }
    }
}

impl ReportConfig {
    pub fn new(mode: ReportMode, level: u32) -> Self {
        Self { mode, level }
    }
}

/// Load report configuration from a TOML file
///
/// # Example
/// ```toml
/// mode = "count"
/// level = 2
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ReportConfig, ConfigError> {
    let path = path.as_ref();
    debug!("Loading report config from: {}", path.display());
    let contents = fs::read_to_string(path)?;
    let config: ReportConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Check that a threshold is a usable fraction
pub fn validate_threshold(threshold: f64) -> Result<f64, ConfigError> {
    if threshold.is_nan() || !(0.0..=1.0).contains(&threshold) {
        return Err(ConfigError::InvalidThreshold(threshold));
    }
    Ok(threshold)
}
