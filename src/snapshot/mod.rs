//! Allocation snapshot data model.
//!
//! This module defines:
//! - Aggregates (count, size, size histogram)
//! - Named tree nodes with sorted, searchable children
//! - The snapshot root with elapsed time metadata

pub mod aggregate;
pub mod node;

// Re-export main types
pub use aggregate::Aggregate;
pub use node::{SnapshotNode, SnapshotRoot, SortOrder};
