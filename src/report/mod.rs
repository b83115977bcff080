//! Allocation report generation.
//!
//! This module turns a snapshot into the text report:
//! - Inverting data types into locations
//! - Classifying which data types are shown in full
//! - Rendering both views with threshold elision

pub mod format;
pub mod formatter;
pub mod inverter;
pub mod levels;

// Re-export main types and functions
pub use formatter::DumpFormatter;
pub use inverter::{build_locations, LocationIndex};
pub use levels::LevelClassifier;
