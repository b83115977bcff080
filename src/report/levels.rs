//! Importance levels of data types.
//!
//! Level 0 marks data types that exceed the threshold on their own. A data
//! type gets level `k + 1` when it appears, locally significant, inside the
//! call-site tree of a data type at level `k`. Types at a level up to the hop
//! limit are shown in full.

use crate::snapshot::SnapshotNode;
use crate::utils::config::ReportMode;
use log::debug;
use std::collections::{HashMap, HashSet};

/// Per-report map from data type name to its level
///
/// Names without an entry are unset (never reached).
#[derive(Debug, Default)]
pub struct LevelClassifier {
    levels: HashMap<String, u32>,
    hop_limit: u32,
}

impl LevelClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute levels for the data types under `data_types`
    pub fn classify(
        &mut self,
        data_types: &SnapshotNode,
        threshold: f64,
        mode: ReportMode,
        hop_limit: u32,
    ) {
        self.levels.clear();
        self.hop_limit = hop_limit;

        let total = &data_types.stats;
        let mut known = HashSet::with_capacity(data_types.children.len());
        for data_type in &data_types.children {
            known.insert(data_type.name.as_str());
            if data_type.stats.exceeds_threshold(total, threshold, mode) {
                self.levels.insert(data_type.name.clone(), 0);
            }
        }

        // level k + 1 is only ever assigned in round k, so an empty round ends it
        for level in 0..hop_limit {
            let mut reached = false;
            for data_type in &data_types.children {
                if self.level(&data_type.name) == Some(level) {
                    reached = true;
                    self.mark_level_rec(data_type, &known, threshold, mode, level);
                }
            }
            if !reached {
                break;
            }
        }

        debug!(
            "Classified {} of {} data types within {} hops",
            self.levels.len(),
            data_types.children.len(),
            hop_limit
        );
    }

    fn mark_level_rec(
        &mut self,
        parent: &SnapshotNode,
        known: &HashSet<&str>,
        threshold: f64,
        mode: ReportMode,
        level: u32,
    ) {
        for item in &parent.children {
            if known.contains(item.name.as_str())
                && item.stats.exceeds_threshold(&parent.stats, threshold, mode)
            {
                let proposed = level + 1;
                match self.levels.get_mut(&item.name) {
                    Some(current) if *current <= proposed => {}
                    Some(current) => *current = proposed,
                    None => {
                        self.levels.insert(item.name.clone(), proposed);
                    }
                }
            }
            if item.has_children() {
                self.mark_level_rec(item, known, threshold, mode, level);
            }
        }
    }

    /// Level of a data type, `None` when unset
    pub fn level(&self, name: &str) -> Option<u32> {
        self.levels.get(name).copied()
    }

    /// Whether the data type is rendered in full
    pub fn is_shown(&self, name: &str) -> bool {
        self.level(name).is_some_and(|level| level <= self.hop_limit)
    }
}
