//! Alloc Dump
//!
//! Threshold-elided allocation reports for memory profiler snapshots.
//!
//! A snapshot is a forest of allocation statistics keyed by data type and
//! nested call sites. This crate renders it two ways:
//! - by location: each call site with the data types allocated there
//! - by data type: each type with the call-site tree that allocated it
//!
//! Entries below the display threshold are collapsed into
//! `... N more below threshold` lines.
//!
//! ## Getting Started
//!
//! ```bash
//! alloc-dump render --snapshot snapshot.json --threshold 0.01
//! alloc-dump --help
//! ```

pub mod commands;
pub mod output;
pub mod report;
pub mod snapshot;
pub mod utils;
