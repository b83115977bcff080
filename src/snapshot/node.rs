//! Named tree nodes holding allocation aggregates.
//!
//! A snapshot is a forest: the root's children are data types and each data
//! type's descendants are nested call-site frames ending in leaf locations.
//! The same node type also backs the inverted "by location" forest.

use super::aggregate::Aggregate;
use crate::utils::config::{ReportMode, UNKNOWN};
use crate::utils::error::SnapshotError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Ordering applied to the children of every node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Lexicographic by name (canonical key order)
    Name,
    /// Size descending, then name ascending
    Size,
    /// Count descending, then name ascending
    Count,
}

impl SortOrder {
    /// Output order for a report mode
    pub fn for_mode(mode: ReportMode) -> Self {
        match mode {
            ReportMode::Size => SortOrder::Size,
            ReportMode::Count => SortOrder::Count,
        }
    }

    pub fn compare(self, a: &SnapshotNode, b: &SnapshotNode) -> Ordering {
        let by_name = || a.name.cmp(&b.name);
        match self {
            SortOrder::Name => by_name(),
            SortOrder::Size => b.stats.size.cmp(&a.stats.size).then_with(by_name),
            SortOrder::Count => b.stats.count.cmp(&a.stats.count).then_with(by_name),
        }
    }
}

/// A named aggregate with named children
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotNode {
    /// Key, unique among siblings (empty for roots)
    #[serde(default)]
    pub name: String,

    /// Statistics for this node
    #[serde(flatten)]
    pub stats: Aggregate,

    /// Child nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotNode>,
}

impl SnapshotNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stats: Aggregate::default(),
            children: Vec::new(),
        }
    }

    /// Create a leaf carrying its own statistics
    pub fn leaf(name: impl Into<String>, stats: Aggregate) -> Self {
        Self {
            stats,
            ..Self::new(name)
        }
    }

    /// Builder helper: append a child
    pub fn with_child(mut self, child: SnapshotNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN
    }

    pub fn child(&self, index: usize) -> &SnapshotNode {
        &self.children[index]
    }

    pub fn child_mut(&mut self, index: usize) -> &mut SnapshotNode {
        &mut self.children[index]
    }

    /// Linear lookup by name; works on unsorted children
    pub fn child_by_name(&self, name: &str) -> Option<&SnapshotNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Find a child by binary search over name-sorted children, inserting an
    /// empty child at its sorted position when absent
    ///
    /// Children must be sorted by [`SortOrder::Name`].
    pub fn find_or_create_child(&mut self, name: &str) -> usize {
        match self
            .children
            .binary_search_by(|c| c.name.as_str().cmp(name))
        {
            Ok(index) => index,
            Err(index) => {
                self.children.insert(index, SnapshotNode::new(name));
                index
            }
        }
    }

    /// Recursively sort every node's children
    pub fn sort_children_deep(&mut self, order: SortOrder) {
        self.children.sort_by(|a, b| order.compare(a, b));
        for child in &mut self.children {
            child.sort_children_deep(order);
        }
    }

    /// Children in the given order without reordering the node itself
    pub fn sorted_children(&self, order: SortOrder) -> Vec<&SnapshotNode> {
        let mut sorted: Vec<&SnapshotNode> = self.children.iter().collect();
        sorted.sort_by(|a, b| order.compare(a, b));
        sorted
    }

    /// Reset statistics and drop all children, keeping the node itself
    pub fn clear_deep(&mut self) {
        self.stats.clear();
        self.children.clear();
    }

    /// Recompute every internal node as the merge of its children (post-order)
    ///
    /// Leaves keep their recorded statistics.
    pub fn update_snapshot_sum_deep(&mut self) {
        if self.children.is_empty() {
            return;
        }
        let mut sum = Aggregate::default();
        for child in &mut self.children {
            child.update_snapshot_sum_deep();
            sum.merge(&child.stats);
        }
        self.stats = sum;
    }

    /// Internal nodes whose recorded statistics differ from the merge of their children
    ///
    /// Nodes with no recorded statistics are not counted.
    pub fn count_stale_sums(&self) -> usize {
        self.stale_sums_rec().1
    }

    fn stale_sums_rec(&self) -> (Aggregate, usize) {
        if self.children.is_empty() {
            return (self.stats.clone(), 0);
        }
        let mut sum = Aggregate::default();
        let mut stale = 0;
        for child in &self.children {
            let (child_sum, child_stale) = child.stale_sums_rec();
            sum.merge(&child_sum);
            stale += child_stale;
        }
        if self.stats != Aggregate::default() && self.stats != sum {
            stale += 1;
        }
        (sum, stale)
    }

    pub fn count_non_empty_children_shallow(&self) -> usize {
        self.children.iter().filter(|c| !c.is_empty()).count()
    }

    /// Non-empty leaves anywhere below this node, ignoring unresolved call sites
    pub fn count_non_empty_leafs(&self) -> usize {
        if self.is_unknown() {
            return 0;
        }
        if !self.has_children() {
            return usize::from(!self.is_empty());
        }
        self.children.iter().map(|c| c.count_non_empty_leafs()).sum()
    }

    /// Check that sibling names are non-empty and unique at every level
    pub fn validate_names(&self) -> Result<(), SnapshotError> {
        let mut seen = HashSet::with_capacity(self.children.len());
        for child in &self.children {
            if child.name.is_empty() {
                return Err(SnapshotError::EmptyName(self.name.clone()));
            }
            if !seen.insert(child.name.as_str()) {
                return Err(SnapshotError::DuplicateName {
                    parent: self.name.clone(),
                    name: child.name.clone(),
                });
            }
            child.validate_names()?;
        }
        Ok(())
    }
}

/// Top of a "by data type" forest with global metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRoot {
    /// Input schema version
    #[serde(default)]
    pub version: String,

    /// Elapsed time covered by the snapshot, in milliseconds
    #[serde(default)]
    pub time_millis: u64,

    /// Nameless root node; its children are data types
    #[serde(flatten)]
    pub tree: SnapshotNode,
}

impl SnapshotRoot {
    /// Build a root from data type nodes, computing sums
    pub fn new(time_millis: u64, data_types: Vec<SnapshotNode>) -> Self {
        let mut root = Self {
            version: crate::utils::config::SCHEMA_VERSION.to_string(),
            time_millis,
            tree: SnapshotNode {
                children: data_types,
                ..SnapshotNode::default()
            },
        };
        root.normalize();
        root
    }

    /// Sort children by name and recompute sums
    pub fn normalize(&mut self) {
        self.tree.sort_children_deep(SortOrder::Name);
        self.tree.update_snapshot_sum_deep();
    }

    pub fn total(&self) -> &Aggregate {
        &self.tree.stats
    }

    pub fn data_types(&self) -> &[SnapshotNode] {
        &self.tree.children
    }
}
