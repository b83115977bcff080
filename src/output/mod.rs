//! Input and output of snapshots and reports.
//!
//! This module handles:
//! - Reading JSON snapshots (validated and normalized)
//! - Writing JSON snapshots
//! - Writing rendered text reports

pub mod json;
pub mod text;

// Re-export main functions
pub use json::{read_snapshot, snapshot_from_str, write_snapshot};
pub use text::write_report;
