use crate::output::read_snapshot;
use crate::report::format::{format_num, format_time};
use crate::utils::config::SCHEMA_VERSION;
use anyhow::Result;
use std::path::PathBuf;

/// Validate a snapshot JSON file and print its totals
pub fn validate_snapshot_file(file_path: PathBuf) -> Result<()> {
    println!("Validating snapshot: {}", file_path.display());

    let snapshot = read_snapshot(&file_path)?;
    let total = snapshot.total();

    println!("✓ Valid snapshot JSON");
    println!("  Version: {}", snapshot.version);
    println!(
        "  Elapsed: {} ms ({})",
        format_num(snapshot.time_millis),
        format_time(snapshot.time_millis)
    );
    println!("  Objects: {}", format_num(total.count));
    println!("  Bytes: {}", format_num(total.size));
    println!(
        "  Classes: {}",
        snapshot.tree.count_non_empty_children_shallow()
    );
    println!("  Locations: {}", snapshot.tree.count_non_empty_leafs());

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("Alloc Dump v{}", env!("CARGO_PKG_VERSION"));
    println!("Snapshot Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Allocation reports by data type and by location for memory profiler snapshots.");
}
