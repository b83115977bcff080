//! Inversion of the "by data type" forest into a "by location" forest.
//!
//! Each leaf call site under a data type becomes a top-level location whose
//! children are the data types allocated from it.

use crate::snapshot::{SnapshotNode, SortOrder};
use log::debug;
use std::collections::HashMap;

/// Write-through cache of `name -> child index` for a name-sorted node
///
/// Purely an accelerator: lookups through the index return the same child
/// a binary search would.
#[derive(Debug, Default)]
pub struct LocationIndex {
    slots: HashMap<String, usize>,
}

impl LocationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate every cached slot
    pub fn reset(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Find or create the child of `node` named `name`
    ///
    /// A slot whose child has a different name was shifted by a later sorted
    /// insertion and is refreshed from the binary search.
    ///
    /// # Panics
    /// If a cached slot points past the end of `node`'s children, which means
    /// the node was mutated without resetting the index.
    pub fn find_or_create(&mut self, node: &mut SnapshotNode, name: &str) -> usize {
        if let Some(&index) = self.slots.get(name) {
            assert!(
                index < node.children.len(),
                "location index slot {} for '{}' is past the end of {} children",
                index,
                name,
                node.children.len()
            );
            if node.children[index].name == name {
                return index;
            }
        }
        let index = node.find_or_create_child(name);
        self.slots.insert(name.to_string(), index);
        index
    }
}

/// Rebuild `locations` from the data type forest rooted at `data_types`
///
/// The destination is cleared first; unresolved call sites are skipped.
pub fn build_locations(
    data_types: &SnapshotNode,
    locations: &mut SnapshotNode,
    index: &mut LocationIndex,
) {
    locations.clear_deep();
    locations.sort_children_deep(SortOrder::Name);
    index.reset();

    for data_type in &data_types.children {
        find_locations_deep(data_type, &data_type.name, locations, index);
    }
    locations.update_snapshot_sum_deep();

    debug!(
        "Inverted {} data types into {} locations",
        data_types.children.len(),
        locations.children.len()
    );
}

fn find_locations_deep(
    node: &SnapshotNode,
    data_type: &str,
    locations: &mut SnapshotNode,
    index: &mut LocationIndex,
) {
    if node.is_unknown() {
        return;
    }
    if !node.has_children() {
        let location = index.find_or_create(locations, &node.name);
        let location = locations.child_mut(location);
        let entry = location.find_or_create_child(data_type);
        location.child_mut(entry).stats.merge(&node.stats);
        return;
    }
    for child in &node.children {
        find_locations_deep(child, data_type, locations, index);
    }
}
