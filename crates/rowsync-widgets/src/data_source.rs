#![forbid(unsafe_code)]

//! Sectioned data source: engine + view + callbacks.
//!
//! ```text
//!   caller ── update_sections / update_rows ──► DataSource ──► Engine
//!                                                  │              │ ops
//!                                                  ▼              ▼
//!   view  ◄── number_of_* / cell_at / ... ──   queries       ViewSink ──► view
//!   view  ── did_select / move_row / commit_edit ──► DataSource ──► Hooks
//! ```
//!
//! Programmatic updates go to the view only; the `did_change_sections` hook
//! fires for changes the view initiated (drag moves and edits), whose
//! results the caller has not seen yet.

use rowsync_core::{
    AffectedGroups, Changeset, Engine, Identified, IndexPath, Key, Location, Result, SyncConfig,
    SyncError,
};
use tracing::debug;

use crate::hooks::Hooks;
use crate::view::{SectionedView, ViewSink};

/// Edit action the view commits for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EditingStyle {
    #[default]
    None,
    Delete,
    Insert,
}

pub type CellRenderer<T, C> = Box<dyn Fn(&Location<T>) -> C>;

pub struct DataSource<T, C, V> {
    engine: Engine<T>,
    view: V,
    cell: CellRenderer<T, C>,
    hooks: Hooks<T>,
}

impl<T, C, V: std::fmt::Debug> std::fmt::Debug for DataSource<T, C, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSource")
            .field("engine", &self.engine)
            .field("view", &self.view)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

impl<T, C, V> DataSource<T, C, V>
where
    T: Identified + Clone,
    V: SectionedView,
{
    /// Data source over an empty engine with the default configuration.
    #[must_use]
    pub fn new(view: V, cell: impl Fn(&Location<T>) -> C + 'static) -> Self {
        Self::with_engine(Engine::new(), view, cell)
    }

    #[must_use]
    pub fn with_config(
        config: &SyncConfig,
        view: V,
        cell: impl Fn(&Location<T>) -> C + 'static,
    ) -> Self {
        Self::with_engine(Engine::with_config(config), view, cell)
    }

    #[must_use]
    pub fn with_engine(
        engine: Engine<T>,
        view: V,
        cell: impl Fn(&Location<T>) -> C + 'static,
    ) -> Self {
        Self {
            engine,
            view,
            cell: Box::new(cell),
            hooks: Hooks::default(),
        }
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks<T>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks<T> {
        &mut self.hooks
    }

    #[must_use]
    pub fn engine(&self) -> &Engine<T> {
        &self.engine
    }

    /// Policy and configuration access. Structural changes must go through
    /// the data source so the view stays in step.
    pub fn policy_mut(&mut self) -> &mut rowsync_core::ReportingPolicy {
        self.engine.policy_mut()
    }

    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    #[must_use]
    pub fn into_view(self) -> V {
        self.view
    }

    // ========================================================================
    // Updating
    // ========================================================================

    pub fn update_sections<I>(&mut self, sections: I) -> Result<Changeset>
    where
        I: IntoIterator,
        I::Item: Into<Key>,
    {
        let mut sink = ViewSink {
            view: &mut self.view,
            forward_moves: true,
            on_change: None,
        };
        let changes = self.engine.set_groups(sections, &mut sink)?;
        if !changes.is_empty() {
            self.pull_row_counts();
        }
        Ok(changes)
    }

    pub fn update_rows(&mut self, rows: Vec<T>, section: &str) -> Result<Changeset> {
        let mut sink = ViewSink {
            view: &mut self.view,
            forward_moves: true,
            on_change: None,
        };
        self.engine.set_items(section, rows, &mut sink)
    }

    /// Move a row programmatically; the view is told about the move.
    pub fn move_item(&mut self, from: IndexPath, to: IndexPath) -> Result<AffectedGroups<T>> {
        let mut sink = ViewSink {
            view: &mut self.view,
            forward_moves: true,
            on_change: None,
        };
        self.engine.move_item(from, to, &mut sink)
    }

    fn pull_row_counts(&mut self) {
        let engine = &self.engine;
        self.view.pull_row_counts(&|section| {
            engine
                .group_at(section)
                .map_or(0, |key| engine.items(key.as_str()).len())
        });
    }

    // ========================================================================
    // Querying
    // ========================================================================

    #[must_use]
    pub fn sections(&self) -> &[Key] {
        self.engine.groups()
    }

    #[must_use]
    pub fn rows(&self, section: &str) -> &[T] {
        self.engine.items(section)
    }

    #[must_use]
    pub fn location_at(&self, path: IndexPath) -> Option<Location<T>> {
        self.engine.location_at(path)
    }

    #[must_use]
    pub fn index_path_of(&self, section: &str, item: &T) -> Option<IndexPath> {
        self.engine.index_path_of(section, item.identifier())
    }

    // ========================================================================
    // Reloading
    // ========================================================================

    pub fn reload_all(&mut self) {
        self.view.reload_data();
        self.pull_row_counts();
    }

    /// Reload one section. Unknown sections are ignored.
    pub fn reload_section(&mut self, section: &str) {
        match self.engine.group_index(section) {
            Some(index) => self.view.reload_sections(&[index]),
            None => debug!(target: "rowsync.widgets", section, "reload of unknown section ignored"),
        }
    }

    /// Reload the row showing `item`, after its non-identity content changed.
    /// Items not found in `section` are ignored.
    pub fn reload_item(&mut self, section: &str, item: &T) {
        match self.index_path_of(section, item) {
            Some(path) => self.view.reload_rows(&[path]),
            None => debug!(
                target: "rowsync.widgets",
                section,
                item = item.identifier(),
                "reload of unknown item ignored"
            ),
        }
    }

    // ========================================================================
    // View-facing protocol
    // ========================================================================

    #[must_use]
    pub fn number_of_sections(&self) -> usize {
        self.engine.groups().len()
    }

    /// Row count of `section`. A widget asking about a section it was never
    /// told about is a caller bug: it goes through the fail path and counts 0.
    pub fn number_of_rows(&self, section: usize) -> usize {
        match self.engine.group_at(section) {
            Some(key) => self.engine.items(key.as_str()).len(),
            None => {
                self.engine.policy().fail(&SyncError::GroupIndexOutOfRange {
                    index: section,
                    len: self.engine.groups().len(),
                });
                0
            }
        }
    }

    /// Render the cell at `path`. An unresolvable path is a caller bug: it
    /// goes through the fail path and yields `None`.
    pub fn cell_at(&self, path: IndexPath) -> Option<C> {
        match self.engine.location_at(path) {
            Some(location) => Some((self.cell)(&location)),
            None => {
                self.engine
                    .policy()
                    .report(&SyncError::UnresolvedCell { path });
                None
            }
        }
    }

    pub fn did_select(&self, path: IndexPath) {
        let Some(handler) = &self.hooks.did_select else {
            return;
        };
        if let Some(location) = self.engine.location_at(path) {
            handler(&location);
        }
    }

    #[must_use]
    pub fn can_move(&self, path: IndexPath) -> bool {
        let Some(predicate) = &self.hooks.can_move else {
            return false;
        };
        self.engine
            .location_at(path)
            .is_some_and(|location| predicate(&location))
    }

    /// Commit a drag move the view already shows.
    pub fn move_row(&mut self, from: IndexPath, to: IndexPath) -> Result<AffectedGroups<T>> {
        let mut sink = ViewSink {
            view: &mut self.view,
            forward_moves: false,
            on_change: self.hooks.did_change_sections.as_deref(),
        };
        self.engine.move_item(from, to, &mut sink)
    }

    /// Where a dragged row should land, asking `target_moved_item` if set.
    #[must_use]
    pub fn target_for_move(&self, from: IndexPath, proposed: IndexPath) -> IndexPath {
        self.engine
            .resolve_move_target(from, proposed, self.hooks.target_moved_item.as_deref())
    }

    #[must_use]
    pub fn can_edit(&self, path: IndexPath) -> bool {
        let Some(location) = self.engine.location_at(path) else {
            return false;
        };
        self.hooks
            .can_edit
            .as_ref()
            .is_some_and(|predicate| predicate(&location))
    }

    /// Apply an edit the view committed.
    ///
    /// `Delete` runs `will_delete`, removes the row, runs `did_delete` with
    /// the removed item and then `did_change_sections` with the section's
    /// remaining rows. `Insert` and `None` are ignored.
    pub fn commit_edit(&mut self, style: EditingStyle, path: IndexPath) -> Result<()> {
        match style {
            EditingStyle::Delete => {
                let Some(location) = self.engine.location_at(path) else {
                    debug!(target: "rowsync.widgets", %path, "delete of unknown row ignored");
                    return Ok(());
                };
                if let Some(will_delete) = &self.hooks.will_delete {
                    will_delete(&location);
                }

                let mut rows = self.engine.items(location.group.as_str()).to_vec();
                rows.remove(path.item);
                self.update_rows(rows, location.group.as_str())?;

                if let Some(did_delete) = &self.hooks.did_delete {
                    did_delete(&location.item);
                }
                if let Some(did_change) = &self.hooks.did_change_sections {
                    let mut changed = AffectedGroups::new();
                    changed.insert(
                        location.group.clone(),
                        self.engine.items(location.group.as_str()).to_vec(),
                    );
                    did_change(&changed);
                }
                Ok(())
            }
            EditingStyle::Insert | EditingStyle::None => {
                debug!(target: "rowsync.widgets", ?style, %path, "editing style ignored");
                Ok(())
            }
        }
    }

    /// Header title of `section`; warns and returns `None` when it does not exist.
    pub fn title_for_header(&self, section: usize) -> Option<String> {
        let key = self.section_key(section)?;
        self.hooks.section_header_title.as_ref().and_then(|f| f(key))
    }

    /// Footer title of `section`; warns and returns `None` when it does not exist.
    pub fn title_for_footer(&self, section: usize) -> Option<String> {
        let key = self.section_key(section)?;
        self.hooks.section_footer_title.as_ref().and_then(|f| f(key))
    }

    fn section_key(&self, section: usize) -> Option<&Key> {
        let key = self.engine.group_at(section);
        if key.is_none() {
            self.engine.policy().report(&SyncError::GroupIndexOutOfRange {
                index: section,
                len: self.engine.groups().len(),
            });
        }
        key
    }
}
