//! Report behavior across the inversion, classification and rendering stages.

use alloc_dump::report::{build_locations, DumpFormatter, LevelClassifier, LocationIndex};
use alloc_dump::snapshot::{Aggregate, SnapshotNode, SnapshotRoot, SortOrder};
use alloc_dump::utils::config::{ReportConfig, ReportMode, UNKNOWN};

// ============================================================================
// SHARED TEST HELPERS
// ============================================================================

fn leaf(name: &str, count: u64, size: u64) -> SnapshotNode {
    SnapshotNode::leaf(name, Aggregate::new(count, size))
}

fn render(root: &SnapshotRoot, mode: ReportMode, level: u32, threshold: f64) -> String {
    let mut formatter = DumpFormatter::new(ReportConfig::new(mode, level));
    formatter.render_to_string(root, "Test", threshold).unwrap()
}

/// The data types section of a rendered report
fn data_types_section(text: &str) -> &str {
    let marker = "Top allocated data types with reverse location traces\n";
    let start = text.find(marker).unwrap() + marker.len();
    // skip the tear line
    let start = start + text[start..].find('\n').unwrap() + 1;
    &text[start..]
}

/// A forest with nesting, shared locations, histograms and an unknown site
fn mixed_forest() -> SnapshotRoot {
    SnapshotRoot::new(
        90_000,
        vec![
            SnapshotNode::new("java.lang.String")
                .with_child(
                    SnapshotNode::new("Parser.parse")
                        .with_child(leaf("Lexer.java:40", 120, 2880))
                        .with_child(leaf("Lexer.java:52", 3, 72)),
                )
                .with_child(leaf("Cache.java:7", 40, 960))
                .with_child(leaf(UNKNOWN, 9, 216)),
            SnapshotNode::new("char[]")
                .with_child(SnapshotNode::leaf(
                    "Lexer.java:40",
                    Aggregate::new(120, 9600).with_histogram(vec![20, 100]),
                ))
                .with_child(SnapshotNode::new("Util.copy").with_child(SnapshotNode::leaf(
                    "Cache.java:7",
                    Aggregate::new(8, 640).with_histogram(vec![8]),
                ))),
            SnapshotNode::new("java.lang.Integer")
                .with_child(leaf("Cache.java:7", 2, 32))
                .with_child(leaf("Stats.java:3", 1, 16)),
            leaf("Object", 1, 16),
        ],
    )
}

fn sum_without_unknown(node: &SnapshotNode) -> Aggregate {
    let mut sum = Aggregate::default();
    for child in &node.children {
        if child.is_unknown() {
            continue;
        }
        if child.has_children() {
            sum.merge(&sum_without_unknown(child));
        } else {
            sum.merge(&child.stats);
        }
    }
    sum
}

// ============================================================================
// INVERSION
// ============================================================================

mod inversion_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sum_preserved_under_inversion() {
        let root = mixed_forest();
        let mut locations = SnapshotNode::default();
        let mut index = LocationIndex::new();
        build_locations(&root.tree, &mut locations, &mut index);

        let expected = sum_without_unknown(&root.tree);
        assert_eq!(locations.stats.count, expected.count);
        assert_eq!(locations.stats.size, expected.size);
        assert_eq!(locations.stats.histogram, expected.histogram);
    }

    #[test]
    fn test_location_with_two_data_types() {
        let root = SnapshotRoot::new(
            0,
            vec![
                SnapshotNode::new("X").with_child(leaf("Foo.java:10", 5, 0)),
                SnapshotNode::new("Y").with_child(leaf("Foo.java:10", 3, 0)),
            ],
        );
        let mut locations = SnapshotNode::default();
        build_locations(&root.tree, &mut locations, &mut LocationIndex::new());

        let foo = locations.child_by_name("Foo.java:10").unwrap();
        assert_eq!(foo.children.len(), 2);
        assert_eq!(foo.child_by_name("X").unwrap().stats.count, 5);
        assert_eq!(foo.child_by_name("Y").unwrap().stats.count, 3);
        assert_eq!(foo.stats.count, 8);
    }

    #[test]
    fn test_unknown_never_a_location() {
        let root = mixed_forest();
        let mut locations = SnapshotNode::default();
        build_locations(&root.tree, &mut locations, &mut LocationIndex::new());

        assert!(locations.child_by_name(UNKNOWN).is_none());
        let names: Vec<&str> = locations.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Cache.java:7", "Lexer.java:40", "Lexer.java:52", "Object", "Stats.java:3"]
        );
        let cache = locations.child_by_name("Cache.java:7").unwrap();
        assert_eq!(cache.children.len(), 3);
        assert_eq!(cache.stats, Aggregate::new(50, 1632).with_histogram(vec![8]));
    }
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

mod level_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// A is significant; B is globally tiny but dominant inside A's tree
    fn hop_forest() -> SnapshotRoot {
        SnapshotRoot::new(
            0,
            vec![
                SnapshotNode::new("A").with_child(
                    SnapshotNode::new("A.build")
                        .with_child(leaf("B", 1, 900))
                        .with_child(leaf("A.java:1", 1, 100)),
                ),
                SnapshotNode::new("B").with_child(leaf("B.java:1", 1, 10)),
            ],
        )
    }

    #[test]
    fn test_hop_scenario_shows_b_with_one_hop() {
        let root = hop_forest();
        let mut classifier = LevelClassifier::new();
        classifier.classify(&root.tree, 0.05, ReportMode::Size, 1);
        assert_eq!(classifier.level("B"), Some(1));

        let section = render(&root, ReportMode::Size, 1, 0.05);
        let section = data_types_section(&section);
        assert!(section.contains("\nB: 10 (0.99%) bytes in 1 (33.33%) objects"));
        assert!(!section.contains("more below threshold"));
    }

    #[test]
    fn test_hop_scenario_collapses_b_without_hops() {
        let text = render(&hop_forest(), ReportMode::Size, 0, 0.05);
        let section = data_types_section(&text);
        assert!(!section.contains("\nB: "));
        assert!(section.ends_with(
            "... 1 more below threshold: 10 (0.99%) bytes in 1 (33.33%) objects (avg size 10 bytes)\n"
        ));
    }

    #[test]
    fn test_levels_never_exceed_hop_limit() {
        let root = mixed_forest();
        for hop_limit in 0..4 {
            let mut classifier = LevelClassifier::new();
            classifier.classify(&root.tree, 0.05, ReportMode::Size, hop_limit);
            for data_type in root.data_types() {
                if let Some(level) = classifier.level(&data_type.name) {
                    assert!(level <= hop_limit);
                    assert!(classifier.is_shown(&data_type.name));
                }
            }
            // level 0 types are shown at every hop limit
            assert_eq!(classifier.level("char[]"), Some(0));
            assert!(classifier.is_shown("char[]"));
        }
    }
}

// ============================================================================
// RENDERING
// ============================================================================

mod render_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_idempotent_rerender() {
        let root = mixed_forest();
        let mut formatter = DumpFormatter::new(ReportConfig::new(ReportMode::Size, 2));
        let first = formatter.render_to_string(&root, "Last", 0.01).unwrap();
        let second = formatter.render_to_string(&root, "Last", 0.01).unwrap();
        assert_eq!(first, second);

        let fresh = render(&root, ReportMode::Size, 2, 0.01);
        assert_eq!(first.replace("Last", "Test"), fresh);
    }

    #[test]
    fn test_threshold_monotonicity() {
        let root = mixed_forest();
        let mut previous = usize::MAX;
        for threshold in [0.0, 0.001, 0.01, 0.05, 0.2, 0.5, 1.0] {
            let text = render(&root, ReportMode::Size, 0, threshold);
            let shown = text
                .lines()
                .filter(|line| line.contains(": ") && !line.contains("more below threshold"))
                .filter(|line| !line.starts_with("Allocated"))
                .count();
            assert!(shown <= previous, "threshold {} shows {} > {}", threshold, shown, previous);
            previous = shown;
        }
    }

    #[test]
    fn test_two_rejects_are_shown_inline() {
        let root = SnapshotRoot::new(
            0,
            vec![SnapshotNode::new("T")
                .with_child(leaf("big", 1, 960))
                .with_child(leaf("small1", 1, 20))
                .with_child(leaf("small2", 1, 20))],
        );
        let text = render(&root, ReportMode::Size, 0, 0.1);
        let section = data_types_section(&text);
        assert!(section.contains("\tsmall1: 20 (2.00%)"));
        assert!(section.contains("\tsmall2: 20 (2.00%)"));
        assert!(!text.contains("more below threshold"));
    }

    #[test]
    fn test_first_child_always_shown() {
        let mut data_type = SnapshotNode::new("T");
        for name in ["c1", "c2", "c3", "c4", "c5"] {
            data_type = data_type.with_child(leaf(name, 1, 10));
        }
        let root = SnapshotRoot::new(0, vec![data_type]);

        let text = render(&root, ReportMode::Size, 0, 0.5);
        let section = data_types_section(&text);
        assert!(section.contains("\tc1: 10 (20.00%) bytes in 1 (20.00%) objects\n"));
        assert!(section.contains("\t... 4 more below threshold: 40 (80.00%) bytes in 4 (80.00%) objects\n"));
        assert!(!section.contains("c2"));
    }

    #[test]
    fn test_locations_section_golden() {
        let root = SnapshotRoot::new(
            1_000,
            vec![
                SnapshotNode::new("X").with_child(leaf("Foo.java:10", 5, 0)),
                SnapshotNode::new("Y").with_child(leaf("Foo.java:10", 3, 0)),
            ],
        );
        let text = render(&root, ReportMode::Count, 0, 0.5);
        let expected = "\
Top allocation-inducing locations with data types allocated from them\n\
{dash}\n\
Foo.java:10: 8 (100.00%) objects\n\
\tX: 5 (62.50%) objects\n\
\tY: 3 (37.50%) objects\n\
\n\
Top allocated data types with reverse location traces\n"
            .replace("{dash}", &"-".repeat(120));
        assert!(text.contains(&expected), "{}", text);
        assert!(text.contains("Test allocation dump for 1,000 ms (0h00m01s)\n"));
        assert!(text.contains("Allocated 8 objects of 2 classes in 2 locations\n"));
    }

    #[test]
    fn test_input_forest_is_not_reordered() {
        let root = mixed_forest();
        let before = root.clone();
        let _ = render(&root, ReportMode::Count, 1, 0.01);
        assert_eq!(root, before);
    }

    #[test]
    fn test_sort_order_is_total_and_stable() {
        let mut root = mixed_forest();
        root.tree.sort_children_deep(SortOrder::Count);
        let once = root.clone();
        root.tree.sort_children_deep(SortOrder::Count);
        assert_eq!(root, once);

        let names: Vec<&str> = root.data_types().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["java.lang.String", "char[]", "java.lang.Integer", "Object"]);
    }
}
