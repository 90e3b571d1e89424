#![forbid(unsafe_code)]

//! Headless [`SectionedView`] that checks every call against its own state.
//!
//! # Invariants
//!
//! - `sections[i]` is the row count the view believes section `i` has;
//!   `None` until the count is learned through
//!   [`SectionedView::pull_row_counts`].
//! - Section calls apply immediately. Row calls inside an update bracket are
//!   buffered and applied at `end_updates`: deletes (descending, against
//!   pre-bracket counts) before inserts (ascending, against post-bracket
//!   counts). Row calls outside a bracket apply at once.
//!
//! # Failure Modes
//!
//! Out-of-range indices, unknown counts, repeated deletes and unbalanced
//! brackets are recorded as [`ShadowViolation`]s; the offending call is
//! skipped and the view keeps going.

use rowsync_core::IndexPath;

use crate::view::SectionedView;

/// One call received by a [`ShadowView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOp {
    BeginUpdates,
    EndUpdates,
    InsertSections(Vec<usize>),
    DeleteSections(Vec<usize>),
    InsertRows(Vec<IndexPath>),
    DeleteRows(Vec<IndexPath>),
    MoveRow { from: IndexPath, to: IndexPath },
    ReloadData,
    ReloadSections(Vec<usize>),
    ReloadRows(Vec<IndexPath>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShadowViolation {
    #[error("{op}: section {index} out of range (sections={len})")]
    SectionOutOfRange {
        op: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{op}: row {path} out of range (rows={len})")]
    RowOutOfRange {
        op: &'static str,
        path: IndexPath,
        len: usize,
    },

    #[error("{op}: row count of section {section} is unknown")]
    UnknownRowCount { op: &'static str, section: usize },

    #[error("row {path} deleted twice in one update")]
    DuplicateDelete { path: IndexPath },

    #[error("end_updates without begin_updates")]
    UnbalancedEnd,
}

#[derive(Debug, Clone, Default)]
pub struct ShadowView {
    sections: Vec<Option<usize>>,
    depth: usize,
    pending_deletes: Vec<IndexPath>,
    pending_inserts: Vec<IndexPath>,
    log: Vec<ViewOp>,
    violations: Vec<ShadowViolation>,
}

impl ShadowView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Known row count of `section`.
    #[must_use]
    pub fn row_count(&self, section: usize) -> Option<usize> {
        self.sections.get(section).copied().flatten()
    }

    /// Row counts of all sections; unknown counts read as 0.
    #[must_use]
    pub fn row_counts(&self) -> Vec<usize> {
        self.sections.iter().map(|c| c.unwrap_or(0)).collect()
    }

    #[must_use]
    pub fn in_update(&self) -> bool {
        self.depth > 0
    }

    #[must_use]
    pub fn log(&self) -> &[ViewOp] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    #[must_use]
    pub fn violations(&self) -> &[ShadowViolation] {
        &self.violations
    }

    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.violations.is_empty() && self.depth == 0
    }

    /// All row paths inserted since the log was last cleared, in call order.
    #[must_use]
    pub fn inserted_rows(&self) -> Vec<IndexPath> {
        self.log
            .iter()
            .filter_map(|op| match op {
                ViewOp::InsertRows(paths) => Some(paths.iter().copied()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// All row paths deleted since the log was last cleared, in call order.
    #[must_use]
    pub fn deleted_rows(&self) -> Vec<IndexPath> {
        self.log
            .iter()
            .filter_map(|op| match op {
                ViewOp::DeleteRows(paths) => Some(paths.iter().copied()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    #[must_use]
    pub fn inserted_sections(&self) -> Vec<usize> {
        self.log
            .iter()
            .filter_map(|op| match op {
                ViewOp::InsertSections(s) => Some(s.iter().copied()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    #[must_use]
    pub fn deleted_sections(&self) -> Vec<usize> {
        self.log
            .iter()
            .filter_map(|op| match op {
                ViewOp::DeleteSections(s) => Some(s.iter().copied()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    fn violate(&mut self, violation: ShadowViolation) {
        tracing::debug!(target: "rowsync.shadow", %violation, "shadow view violation");
        self.violations.push(violation);
    }

    fn known_count(&mut self, op: &'static str, section: usize) -> Option<usize> {
        match self.sections.get(section) {
            Some(Some(count)) => Some(*count),
            Some(None) => {
                self.violate(ShadowViolation::UnknownRowCount { op, section });
                None
            }
            None => {
                let len = self.sections.len();
                self.violate(ShadowViolation::SectionOutOfRange { op, index: section, len });
                None
            }
        }
    }

    fn apply_row_edits(&mut self, mut deletes: Vec<IndexPath>, mut inserts: Vec<IndexPath>) {
        deletes.sort_unstable_by(|a, b| b.cmp(a));
        for window in deletes.windows(2) {
            if window[0] == window[1] {
                self.violate(ShadowViolation::DuplicateDelete { path: window[0] });
            }
        }
        deletes.dedup();
        for path in deletes {
            let Some(count) = self.known_count("delete_rows", path.group) else {
                continue;
            };
            if path.item < count {
                self.sections[path.group] = Some(count - 1);
            } else {
                self.violate(ShadowViolation::RowOutOfRange {
                    op: "delete_rows",
                    path,
                    len: count,
                });
            }
        }

        inserts.sort_unstable();
        for path in inserts {
            let Some(count) = self.known_count("insert_rows", path.group) else {
                continue;
            };
            if path.item <= count {
                self.sections[path.group] = Some(count + 1);
            } else {
                self.violate(ShadowViolation::RowOutOfRange {
                    op: "insert_rows",
                    path,
                    len: count,
                });
            }
        }
    }
}

impl SectionedView for ShadowView {
    fn begin_updates(&mut self) {
        self.log.push(ViewOp::BeginUpdates);
        self.depth += 1;
    }

    fn end_updates(&mut self) {
        self.log.push(ViewOp::EndUpdates);
        if self.depth == 0 {
            self.violate(ShadowViolation::UnbalancedEnd);
            return;
        }
        self.depth -= 1;
        if self.depth == 0 {
            let deletes = std::mem::take(&mut self.pending_deletes);
            let inserts = std::mem::take(&mut self.pending_inserts);
            self.apply_row_edits(deletes, inserts);
        }
    }

    fn insert_sections(&mut self, sections: &[usize]) {
        self.log.push(ViewOp::InsertSections(sections.to_vec()));
        for &index in sections {
            if index <= self.sections.len() {
                self.sections.insert(index, None);
            } else {
                let len = self.sections.len();
                self.violate(ShadowViolation::SectionOutOfRange {
                    op: "insert_sections",
                    index,
                    len,
                });
            }
        }
    }

    fn delete_sections(&mut self, sections: &[usize]) {
        self.log.push(ViewOp::DeleteSections(sections.to_vec()));
        for &index in sections {
            if index < self.sections.len() {
                self.sections.remove(index);
            } else {
                let len = self.sections.len();
                self.violate(ShadowViolation::SectionOutOfRange {
                    op: "delete_sections",
                    index,
                    len,
                });
            }
        }
    }

    fn insert_rows(&mut self, paths: &[IndexPath]) {
        self.log.push(ViewOp::InsertRows(paths.to_vec()));
        if self.in_update() {
            self.pending_inserts.extend_from_slice(paths);
        } else {
            self.apply_row_edits(Vec::new(), paths.to_vec());
        }
    }

    fn delete_rows(&mut self, paths: &[IndexPath]) {
        self.log.push(ViewOp::DeleteRows(paths.to_vec()));
        if self.in_update() {
            self.pending_deletes.extend_from_slice(paths);
        } else {
            self.apply_row_edits(paths.to_vec(), Vec::new());
        }
    }

    fn move_row(&mut self, from: IndexPath, to: IndexPath) {
        self.log.push(ViewOp::MoveRow { from, to });
        let Some(from_count) = self.known_count("move_row", from.group) else {
            return;
        };
        if from.item >= from_count {
            self.violate(ShadowViolation::RowOutOfRange {
                op: "move_row",
                path: from,
                len: from_count,
            });
            return;
        }
        let Some(to_count) = self.known_count("move_row", to.group) else {
            return;
        };
        let to_count_after_removal = if from.group == to.group {
            to_count - 1
        } else {
            to_count
        };
        if to.item > to_count_after_removal {
            self.violate(ShadowViolation::RowOutOfRange {
                op: "move_row",
                path: to,
                len: to_count_after_removal,
            });
            return;
        }
        self.sections[from.group] = Some(from_count - 1);
        if let Some(Some(count)) = self.sections.get_mut(to.group) {
            *count += 1;
        }
    }

    fn reload_data(&mut self) {
        self.log.push(ViewOp::ReloadData);
        for count in &mut self.sections {
            *count = None;
        }
    }

    fn reload_sections(&mut self, sections: &[usize]) {
        self.log.push(ViewOp::ReloadSections(sections.to_vec()));
        for &index in sections {
            if index >= self.sections.len() {
                let len = self.sections.len();
                self.violate(ShadowViolation::SectionOutOfRange {
                    op: "reload_sections",
                    index,
                    len,
                });
            }
        }
    }

    fn reload_rows(&mut self, paths: &[IndexPath]) {
        self.log.push(ViewOp::ReloadRows(paths.to_vec()));
        for &path in paths {
            if let Some(count) = self.known_count("reload_rows", path.group)
                && path.item >= count
            {
                self.violate(ShadowViolation::RowOutOfRange {
                    op: "reload_rows",
                    path,
                    len: count,
                });
            }
        }
    }

    fn pull_row_counts(&mut self, rows_in_section: &dyn Fn(usize) -> usize) {
        for (index, count) in self.sections.iter_mut().enumerate() {
            if count.is_none() {
                *count = Some(rows_in_section(index));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_sections(counts: &[usize]) -> ShadowView {
        let mut view = ShadowView::new();
        let indices: Vec<usize> = (0..counts.len()).collect();
        view.insert_sections(&indices);
        view.pull_row_counts(&|i| counts[i]);
        view.clear_log();
        view
    }

    #[test]
    fn batched_rows_use_pre_and_post_positions() {
        let mut view = with_sections(&[3]);
        view.begin_updates();
        view.delete_rows(&[IndexPath::new(0, 1)]);
        view.insert_rows(&[IndexPath::new(0, 1)]);
        view.insert_rows(&[IndexPath::new(0, 2)]);
        view.end_updates();
        assert!(view.is_consistent(), "{:?}", view.violations());
        assert_eq!(view.row_counts(), vec![4]);
    }

    #[test]
    fn out_of_range_delete_is_recorded() {
        let mut view = with_sections(&[1]);
        view.delete_rows(&[IndexPath::new(0, 1)]);
        assert_eq!(
            view.violations(),
            &[ShadowViolation::RowOutOfRange {
                op: "delete_rows",
                path: IndexPath::new(0, 1),
                len: 1,
            }]
        );
        assert_eq!(view.row_counts(), vec![1]);
    }

    #[test]
    fn sections_apply_sequentially() {
        let mut view = with_sections(&[0, 0, 0]);
        view.begin_updates();
        view.delete_sections(&[0]);
        view.delete_sections(&[0]);
        view.end_updates();
        assert!(view.is_consistent());
        assert_eq!(view.section_count(), 1);
        assert_eq!(view.deleted_sections(), vec![0, 0]);
    }

    #[test]
    fn inserted_section_needs_pull() {
        let mut view = ShadowView::new();
        view.insert_sections(&[0]);
        assert_eq!(view.row_count(0), None);
        view.insert_rows(&[IndexPath::new(0, 0)]);
        assert!(matches!(
            view.violations()[0],
            ShadowViolation::UnknownRowCount { section: 0, .. }
        ));
    }

    #[test]
    fn duplicate_delete_is_recorded() {
        let mut view = with_sections(&[2]);
        view.begin_updates();
        view.delete_rows(&[IndexPath::new(0, 0)]);
        view.delete_rows(&[IndexPath::new(0, 0)]);
        view.end_updates();
        assert!(view
            .violations()
            .contains(&ShadowViolation::DuplicateDelete { path: IndexPath::new(0, 0) }));
        assert_eq!(view.row_counts(), vec![1]);
    }

    #[test]
    fn move_across_sections_shifts_counts() {
        let mut view = with_sections(&[4, 3]);
        view.move_row(IndexPath::new(0, 3), IndexPath::new(1, 3));
        assert!(view.is_consistent());
        assert_eq!(view.row_counts(), vec![3, 4]);

        view.move_row(IndexPath::new(1, 0), IndexPath::new(1, 4));
        assert!(!view.violations().is_empty());
    }

    #[test]
    fn unbalanced_end_is_recorded() {
        let mut view = ShadowView::new();
        view.end_updates();
        assert_eq!(view.violations(), &[ShadowViolation::UnbalancedEnd]);
    }

    #[test]
    fn reload_data_forgets_counts_until_pulled() {
        let mut view = with_sections(&[2]);
        view.reload_data();
        assert_eq!(view.row_count(0), None);
        view.pull_row_counts(&|_| 5);
        assert_eq!(view.row_count(0), Some(5));
    }
}
