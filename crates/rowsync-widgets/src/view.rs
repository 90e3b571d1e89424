#![forbid(unsafe_code)]

//! The view a [`DataSource`](crate::DataSource) drives.

use rowsync_core::{AffectedGroups, IndexPath, StructuralSink};

/// A sectioned list widget: sections of rows, addressed by index.
///
/// Structural calls arrive inside `begin_updates`/`end_updates`. Section
/// indices are sequential within a bracket; row deletes name pre-bracket
/// positions and row inserts post-bracket positions.
pub trait SectionedView {
    fn begin_updates(&mut self);
    fn end_updates(&mut self);
    fn insert_sections(&mut self, sections: &[usize]);
    fn delete_sections(&mut self, sections: &[usize]);
    fn insert_rows(&mut self, paths: &[IndexPath]);
    fn delete_rows(&mut self, paths: &[IndexPath]);

    /// A row moved programmatically. Drag moves started by the view itself
    /// are not echoed back.
    fn move_row(&mut self, from: IndexPath, to: IndexPath) {
        let _ = (from, to);
    }

    fn reload_data(&mut self);
    fn reload_sections(&mut self, sections: &[usize]);
    fn reload_rows(&mut self, paths: &[IndexPath]);

    /// Offered after section changes and full reloads so headless views can
    /// learn the row count of sections they have not seen before.
    fn pull_row_counts(&mut self, rows_in_section: &dyn Fn(usize) -> usize) {
        let _ = rows_in_section;
    }
}

/// Adapts a [`SectionedView`] to the engine's [`StructuralSink`].
pub(crate) struct ViewSink<'a, T, V: ?Sized> {
    pub(crate) view: &'a mut V,
    /// Echo `item_moved` as `move_row`.
    pub(crate) forward_moves: bool,
    /// Receiver for `affected_groups_changed`, when the change should reach
    /// the caller's hook.
    pub(crate) on_change: Option<&'a (dyn Fn(&AffectedGroups<T>) + 'static)>,
}

impl<T, V: SectionedView + ?Sized> StructuralSink<T> for ViewSink<'_, T, V> {
    fn begin_batch(&mut self) {
        self.view.begin_updates();
    }

    fn end_batch(&mut self) {
        self.view.end_updates();
    }

    fn delete_group(&mut self, index: usize) {
        self.view.delete_sections(&[index]);
    }

    fn insert_group(&mut self, index: usize) {
        self.view.insert_sections(&[index]);
    }

    fn delete_item(&mut self, path: IndexPath) {
        self.view.delete_rows(&[path]);
    }

    fn insert_item(&mut self, path: IndexPath) {
        self.view.insert_rows(&[path]);
    }

    fn item_moved(&mut self, from: IndexPath, to: IndexPath) {
        if self.forward_moves {
            self.view.move_row(from, to);
        }
    }

    fn affected_groups_changed(&mut self, affected: &AffectedGroups<T>) {
        if let Some(on_change) = self.on_change {
            on_change(affected);
        }
    }
}
