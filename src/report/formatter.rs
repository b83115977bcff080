//! Text rendering of allocation snapshots.
//!
//! A report has a header with the grand totals followed by two sections:
//! allocations by location (built by inverting the snapshot) and
//! allocations by data type. At every level, entries below the threshold
//! are collapsed into a single `... N more below threshold` line.
//!
//! A [`DumpFormatter`] owns its scratch state (the location forest, its
//! lookup index and the level map) and reuses it across reports.

use super::format::{format_avg, format_num, format_num_percent, format_time, tear_line};
use super::inverter::{build_locations, LocationIndex};
use super::levels::LevelClassifier;
use crate::snapshot::{Aggregate, SnapshotNode, SnapshotRoot, SortOrder};
use crate::utils::config::ReportConfig;
use crate::utils::error::ReportError;
use log::{debug, info};
use std::io::Write;

/// Collapsing is skipped when at most this many entries fall below threshold
const MAX_INLINE_REJECTS: usize = 2;

/// Renders snapshots as indented text reports
#[derive(Debug)]
pub struct DumpFormatter {
    config: ReportConfig,
    locations: SnapshotNode,
    location_index: LocationIndex,
    levels: LevelClassifier,
}

impl DumpFormatter {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            locations: SnapshotNode::default(),
            location_index: LocationIndex::new(),
            levels: LevelClassifier::new(),
        }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// The "by location" forest built by the last report
    pub fn locations(&self) -> &SnapshotNode {
        &self.locations
    }

    /// The level map computed by the last report
    pub fn levels(&self) -> &LevelClassifier {
        &self.levels
    }

    fn output_order(&self) -> SortOrder {
        SortOrder::for_mode(self.config.mode)
    }

    /// Write the full report: header, locations section, data types section
    pub fn dump_snapshot<W: Write>(
        &mut self,
        out: &mut W,
        ss: &SnapshotRoot,
        kind: &str,
        threshold: f64,
    ) -> Result<(), ReportError> {
        info!(
            "Rendering {} report for {} data types (threshold {})",
            kind,
            ss.data_types().len(),
            threshold
        );
        self.dump_snapshot_header(out, ss, kind)?;
        writeln!(out, "Top allocation-inducing locations with data types allocated from them")?;
        writeln!(out, "{}", tear_line('-'))?;
        self.dump_snapshot_by_locations(out, ss, threshold)?;
        writeln!(out, "Top allocated data types with reverse location traces")?;
        writeln!(out, "{}", tear_line('-'))?;
        self.dump_snapshot_by_data_types(out, ss, threshold)?;
        Ok(())
    }

    /// Render the full report into a string
    pub fn render_to_string(
        &mut self,
        ss: &SnapshotRoot,
        kind: &str,
        threshold: f64,
    ) -> Result<String, ReportError> {
        let mut buf = Vec::new();
        self.dump_snapshot(&mut buf, ss, kind, threshold)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn dump_snapshot_header<W: Write>(
        &self,
        out: &mut W,
        ss: &SnapshotRoot,
        kind: &str,
    ) -> Result<(), ReportError> {
        let total = ss.total();
        writeln!(out)?;
        writeln!(out, "{}", tear_line('='))?;
        writeln!(
            out,
            "{} allocation dump for {} ms ({})",
            kind,
            format_num(ss.time_millis),
            format_time(ss.time_millis)
        )?;
        write!(out, "Allocated ")?;
        if self.config.mode.is_size() {
            write!(out, "{} bytes in ", format_num(total.size))?;
        }
        writeln!(
            out,
            "{} objects of {} classes in {} locations",
            format_num(total.count),
            format_num(ss.tree.count_non_empty_children_shallow() as u64),
            format_num(ss.tree.count_non_empty_leafs() as u64)
        )?;
        writeln!(out, "{}", tear_line('='))?;
        writeln!(out)?;
        Ok(())
    }

    fn dump_snapshot_by_locations<W: Write>(
        &mut self,
        out: &mut W,
        ss: &SnapshotRoot,
        threshold: f64,
    ) -> Result<(), ReportError> {
        build_locations(&ss.tree, &mut self.locations, &mut self.location_index);
        self.print_locations_deep(out, 0, &self.locations, ss.total(), threshold, false)
    }

    pub fn dump_snapshot_by_data_types<W: Write>(
        &mut self,
        out: &mut W,
        ss: &SnapshotRoot,
        threshold: f64,
    ) -> Result<(), ReportError> {
        let total = ss.total();
        self.levels
            .classify(&ss.tree, threshold, self.config.mode, self.config.level);

        let mut skipped = 0u64;
        let mut rest = Aggregate::default();
        for data_type in ss.tree.sorted_children(self.output_order()) {
            if data_type.is_empty() {
                continue;
            }
            if self.levels.is_shown(&data_type.name) {
                let is_array = data_type.name.contains('[');
                write!(out, "{}", data_type.name)?;
                self.println_details(out, &data_type.stats, total, true)?;
                self.print_locations_deep(out, 1, data_type, total, threshold, is_array)?;
                writeln!(out)?;
            } else {
                skipped += 1;
                rest.merge(&data_type.stats);
            }
        }
        if skipped > 0 {
            debug!("Collapsed {} data types below threshold", skipped);
            write!(out, "... {} more below threshold", format_num(skipped))?;
            self.println_details(out, &rest, total, true)?;
        }
        Ok(())
    }

    /// Print the children of `node` at `depth`, collapsing the insignificant ones
    fn print_locations_deep<W: Write>(
        &self,
        out: &mut W,
        depth: usize,
        node: &SnapshotNode,
        total: &Aggregate,
        threshold: f64,
        print_avg: bool,
    ) -> Result<(), ReportError> {
        let mode = self.config.mode;
        let children: Vec<&SnapshotNode> = node
            .sorted_children(self.output_order())
            .into_iter()
            .filter(|item| !item.is_empty())
            .collect();

        // the first item is always shown
        let rejects = children
            .iter()
            .skip(1)
            .filter(|item| !item.stats.exceeds_threshold(total, threshold, mode))
            .count();
        let print_all = rejects <= MAX_INLINE_REJECTS;

        let mut skipped = 0u64;
        let mut rest = Aggregate::default();
        for (i, item) in children.into_iter().enumerate() {
            if i == 0 || print_all || item.stats.exceeds_threshold(total, threshold, mode) {
                print_indent(out, depth)?;
                write!(out, "{}", item.name)?;
                self.println_details(out, &item.stats, total, print_avg)?;
                if item.has_children() {
                    self.print_locations_deep(out, depth + 1, item, total, threshold, print_avg)?;
                }
                if depth == 0 {
                    writeln!(out)?;
                }
            } else {
                skipped += 1;
                rest.merge(&item.stats);
            }
        }
        if skipped > 0 {
            print_indent(out, depth)?;
            write!(out, "... {} more below threshold", format_num(skipped))?;
            self.println_details(out, &rest, total, print_avg)?;
            if depth == 0 {
                writeln!(out)?;
            }
        }
        Ok(())
    }

    fn println_details<W: Write>(
        &self,
        out: &mut W,
        item: &Aggregate,
        total: &Aggregate,
        print_avg: bool,
    ) -> Result<(), ReportError> {
        write!(out, ": ")?;
        let by_size = self.config.mode.is_size();
        if by_size {
            write!(out, "{} bytes in ", format_num_percent(item.size, total.size))?;
        }
        write!(out, "{} objects", format_num_percent(item.count, total.count))?;
        if print_avg && by_size && item.count > 0 {
            write!(out, " {}", format_avg(item.size, item.count))?;
        }
        if item.has_histogram() {
            write!(out, " [histogram: ")?;
            let unbucketed = item.unbucketed();
            if unbucketed != 0 {
                write!(out, "({}) ", unbucketed)?;
            }
            let last = item
                .histogram
                .iter()
                .rposition(|&bucket| bucket != 0)
                .unwrap_or(0);
            let buckets: Vec<String> = item.histogram[..=last]
                .iter()
                .map(|bucket| bucket.to_string())
                .collect();
            write!(out, "{}]", buckets.join(" "))?;
        }
        writeln!(out)?;
        Ok(())
    }
}

fn print_indent<W: Write>(out: &mut W, depth: usize) -> Result<(), ReportError> {
    for _ in 0..depth {
        write!(out, "\t")?;
    }
    Ok(())
}
