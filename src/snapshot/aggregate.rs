//! Numeric rollup of allocation statistics.
//!
//! An aggregate carries the number of allocated objects, their total size
//! and an optional size histogram (one count per bucket).

use crate::utils::config::ReportMode;
use serde::{Deserialize, Serialize};

/// Count, size and histogram for one named entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    /// Number of allocated objects
    #[serde(default)]
    pub count: u64,

    /// Allocated bytes (unused in count mode)
    #[serde(default)]
    pub size: u64,

    /// Object counts per size bucket; zero or one element means no histogram
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub histogram: Vec<u64>,
}

impl Aggregate {
    pub fn new(count: u64, size: u64) -> Self {
        Self {
            count,
            size,
            histogram: Vec::new(),
        }
    }

    pub fn with_histogram(mut self, histogram: Vec<u64>) -> Self {
        self.histogram = histogram;
        self
    }

    /// Accumulate another aggregate into this one
    ///
    /// The shorter histogram is treated as zero-padded.
    pub fn merge(&mut self, other: &Aggregate) {
        self.count += other.count;
        self.size += other.size;
        if self.histogram.len() < other.histogram.len() {
            self.histogram.resize(other.histogram.len(), 0);
        }
        for (bucket, add) in self.histogram.iter_mut().zip(&other.histogram) {
            *bucket += add;
        }
    }

    /// True iff `self / total >= threshold` for the metric of `mode`
    ///
    /// A zero total never exceeds.
    pub fn exceeds_threshold(&self, total: &Aggregate, threshold: f64, mode: ReportMode) -> bool {
        let (value, total) = match mode {
            ReportMode::Size => (self.size, total.size),
            ReportMode::Count => (self.count, total.count),
        };
        if total == 0 {
            return false;
        }
        value as f64 / total as f64 >= threshold
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn clear(&mut self) {
        self.count = 0;
        self.size = 0;
        self.histogram.clear();
    }

    pub fn has_histogram(&self) -> bool {
        self.histogram.len() > 1
    }

    /// Objects not covered by any histogram bucket
    pub fn unbucketed(&self) -> u64 {
        let bucketed: u64 = self.histogram.iter().sum();
        self.count.saturating_sub(bucketed)
    }
}
