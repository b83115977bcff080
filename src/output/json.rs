//! JSON snapshot reader and writer.
//!
//! Snapshots arrive as JSON produced by the profiler agent:
//!
//! ```json
//! {
//!   "version": "1.0.0",
//!   "time_millis": 60000,
//!   "children": [
//!     { "name": "byte[]", "children": [
//!       { "name": "Reader.read", "count": 4, "size": 800, "histogram": [1, 3] }
//!     ]}
//!   ]
//! }
//! ```

use super::text::validate_output_path;
use crate::snapshot::SnapshotRoot;
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::{OutputError, SnapshotError};
use log::{debug, info, warn};
use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::path::Path;

/// Read, validate and normalize a snapshot from a JSON file
///
/// Children are sorted by name and internal sums recomputed.
///
/// # Errors
/// * `SnapshotError::ReadFailed` - File read error
/// * `SnapshotError::JsonError` - JSON parse error
/// * `SnapshotError::DuplicateName` / `EmptyName` - Malformed sibling names
pub fn read_snapshot(input_path: impl AsRef<Path>) -> Result<SnapshotRoot, SnapshotError> {
    let input_path = input_path.as_ref();

    debug!("Reading snapshot from: {}", input_path.display());

    let file = File::open(input_path)?;
    let snapshot: SnapshotRoot = serde_json::from_reader(BufReader::new(file))?;
    let snapshot = prepare_snapshot(snapshot)?;

    debug!(
        "Snapshot loaded: version {}, {} data types, {} objects",
        snapshot.version,
        snapshot.data_types().len(),
        snapshot.total().count
    );

    Ok(snapshot)
}

/// Parse a snapshot from a JSON string (validated and normalized)
pub fn snapshot_from_str(json: &str) -> Result<SnapshotRoot, SnapshotError> {
    let snapshot: SnapshotRoot = serde_json::from_str(json)?;
    prepare_snapshot(snapshot)
}

fn prepare_snapshot(mut snapshot: SnapshotRoot) -> Result<SnapshotRoot, SnapshotError> {
    if !snapshot.version.is_empty() && snapshot.version != SCHEMA_VERSION {
        warn!(
            "Snapshot version {} differs from supported version {}",
            snapshot.version, SCHEMA_VERSION
        );
    }
    snapshot.tree.validate_names()?;
    let stale = snapshot.tree.count_stale_sums();
    if stale > 0 {
        warn!(
            "{} internal node(s) record totals that differ from their children; using the children's sums",
            stale
        );
    }
    snapshot.normalize();
    Ok(snapshot)
}

/// Write a snapshot to a JSON file (pretty printed)
pub fn write_snapshot(
    snapshot: &SnapshotRoot,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing snapshot to: {}", output_path.display());

    validate_output_path(output_path)?;

    let file = File::create(output_path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), snapshot)
        .map_err(|e| OutputError::WriteFailed(e.into()))?;

    Ok(())
}
