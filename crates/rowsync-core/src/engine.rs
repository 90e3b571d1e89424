#![forbid(unsafe_code)]

//! Two-level reconciliation engine.
//!
//! [`Engine`] owns the [`GroupStore`] and brings it to a requested state,
//! reporting each structural edit to a [`StructuralSink`].
//!
//! ```text
//!   caller ── set_groups / set_items ──► Engine
//!                                          │ diff(old ids, new ids)
//!                                          │ plan ops, verify plan
//!                                          ▼
//!                      begin_batch, ops..., (store committed), end_batch
//!                                          │
//!                                          ▼
//!                              affected_groups_changed
//! ```
//!
//! # Invariants
//!
//! - Every call either fully applies or leaves the store untouched; the
//!   edit plan is computed and checked before the first op is emitted.
//! - An identity diff emits nothing, not even an empty batch.
//! - Group ops carry sequential indices; item ops carry pre-batch delete
//!   indices and post-batch insert indices (see [`crate::sink`]).
//!
//! # Failure Modes
//!
//! | Condition                         | Path | Store     | Emitted |
//! |-----------------------------------|------|-----------|---------|
//! | duplicate ids in `set_groups`     | fail | unchanged | nothing |
//! | unknown group in `set_items`      | warn | unchanged | nothing |
//! | duplicate ids in `set_items`      | fail | unchanged | nothing |
//! | replayed plan differs from input  | fail | unchanged | nothing |

use ahash::AHashMap;
use rowsync_diff::{DiffOp, diff, is_identity};
use tracing::{debug, trace};

use crate::config::SyncConfig;
use crate::error::{Result, SyncError, find_duplicates};
use crate::key::{Identified, IndexPath, Key, Location, LocationWithOptionalItem};
use crate::policy::ReportingPolicy;
use crate::sink::{AffectedGroups, Changeset, StructuralOp, StructuralSink};
use crate::store::GroupStore;

pub struct Engine<T> {
    pub(crate) store: GroupStore<T>,
    pub(crate) policy: ReportingPolicy,
    verify_postconditions: bool,
}

impl<T> std::fmt::Debug for Engine<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("groups", &self.store.groups())
            .field("items", &self.store.total_items())
            .field("policy", &self.policy)
            .field("verify_postconditions", &self.verify_postconditions)
            .finish()
    }
}

impl<T> Default for Engine<T> {
    fn default() -> Self {
        Self::with_config(&SyncConfig::default())
    }
}

impl<T> Engine<T> {
    /// Empty engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: &SyncConfig) -> Self {
        Self {
            store: GroupStore::new(),
            policy: config.policy(),
            verify_postconditions: config.verify_postconditions,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ReportingPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_verify_postconditions(mut self, verify: bool) -> Self {
        self.verify_postconditions = verify;
        self
    }

    #[must_use]
    pub fn policy(&self) -> &ReportingPolicy {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut ReportingPolicy {
        &mut self.policy
    }

    #[must_use]
    pub fn store(&self) -> &GroupStore<T> {
        &self.store
    }

    // -- queries ------------------------------------------------------------

    #[must_use]
    pub fn groups(&self) -> &[Key] {
        self.store.groups()
    }

    #[must_use]
    pub fn items(&self, group: &str) -> &[T] {
        self.store.items(group)
    }

    #[must_use]
    pub fn group_index(&self, group: &str) -> Option<usize> {
        self.store.group_index(group)
    }

    #[must_use]
    pub fn group_at(&self, index: usize) -> Option<&Key> {
        self.store.group_at(index)
    }

    #[must_use]
    pub fn item_at(&self, path: IndexPath) -> Option<&T> {
        self.store.item_at(path)
    }

    /// Item count of the group at `index`. Warns and returns 0 when the
    /// index is out of range.
    pub fn item_count_at(&self, index: usize) -> usize {
        match self.store.group_at(index) {
            Some(key) => self.store.item_count(key.as_str()),
            None => {
                self.report(SyncError::GroupIndexOutOfRange {
                    index,
                    len: self.store.group_count(),
                });
                0
            }
        }
    }

    /// Route `err` through the policy and hand it back for returning.
    pub(crate) fn report(&self, err: SyncError) -> SyncError {
        self.policy.report(&err);
        err
    }
}

impl<T: Clone> Engine<T> {
    /// Resolve a positional address to `(group, item)`.
    #[must_use]
    pub fn location_at(&self, path: IndexPath) -> Option<Location<T>> {
        let Some(group) = self.store.group_at(path.group) else {
            debug!(target: "rowsync.engine", %path, "no group at index");
            return None;
        };
        let Some(item) = self.store.items(group.as_str()).get(path.item) else {
            debug!(target: "rowsync.engine", %path, group = %group, "no item at index");
            return None;
        };
        Some(Location::new(group.clone(), item.clone()))
    }

    /// Resolve a positional address whose item may be past the end.
    #[must_use]
    pub fn location_with_optional_item_at(
        &self,
        path: IndexPath,
    ) -> Option<LocationWithOptionalItem<T>> {
        let group = self.store.group_at(path.group)?;
        let item = self.store.items(group.as_str()).get(path.item).cloned();
        Some(LocationWithOptionalItem::new(group.clone(), item))
    }
}

impl<T: Identified> Engine<T> {
    /// Positional address of the item `id` in `group`.
    #[must_use]
    pub fn index_path_of(&self, group: &str, id: &str) -> Option<IndexPath> {
        let group_index = self.store.group_index(group)?;
        let item_index = self.store.item_index(group, id)?;
        Some(IndexPath::new(group_index, item_index))
    }
}

// ===========================================================================
// Reconcile
// ===========================================================================

impl<T: Identified + Clone> Engine<T> {
    /// Bring the group sequence to `groups`.
    ///
    /// Item lists of removed groups are dropped; groups that merely change
    /// position keep their items.
    pub fn set_groups<I, S>(&mut self, groups: I, sink: &mut S) -> Result<Changeset>
    where
        I: IntoIterator,
        I::Item: Into<Key>,
        S: StructuralSink<T> + ?Sized,
    {
        let new: Vec<Key> = groups.into_iter().map(Into::into).collect();
        let span = tracing::debug_span!(
            "rowsync.set_groups",
            old_len = self.store.group_count(),
            new_len = new.len(),
            inserted = tracing::field::Empty,
            deleted = tracing::field::Empty,
        );
        let _guard = span.enter();

        let duplicates = find_duplicates(new.iter().map(Key::as_str));
        if !duplicates.is_empty() {
            return Err(self.report(SyncError::DuplicateGroups { duplicates }));
        }

        let runs = diff(self.store.groups(), &new);
        if is_identity(&runs) {
            trace!(target: "rowsync.engine", "groups unchanged");
            return Ok(Changeset::new());
        }

        // Plan against a working copy; the store is not touched yet.
        let mut working: Vec<Key> = self.store.groups().to_vec();
        let mut plan = Changeset::new();
        let mut removed: Vec<Key> = Vec::new();
        let mut added: Vec<Key> = Vec::new();
        let mut cursor = 0usize;
        for run in &runs {
            match run.op {
                DiffOp::Delete => {
                    for _ in &run.keys {
                        removed.push(working.remove(cursor));
                        plan.push(StructuralOp::DeleteGroup(cursor));
                    }
                }
                DiffOp::Insert => {
                    for key in &run.keys {
                        working.insert(cursor, key.clone());
                        added.push(key.clone());
                        plan.push(StructuralOp::InsertGroup(cursor));
                        cursor += 1;
                    }
                }
                DiffOp::Equal => cursor += run.len(),
            }
        }

        if self.verify_postconditions && working != new {
            return Err(self.report(SyncError::postcondition(
                "set_groups",
                format!("planned {working:?}, requested {new:?}"),
            )));
        }

        // Groups that are deleted and re-inserted keep their items.
        let carried: Vec<(Key, Vec<T>)> = removed
            .iter()
            .filter(|key| added.contains(key))
            .map(|key| (key.clone(), self.store.take_items(key.as_str())))
            .collect();

        sink.begin_batch();
        for op in plan.ops() {
            match *op {
                StructuralOp::DeleteGroup(index) => {
                    let key = self.store.remove_group(index);
                    trace!(target: "rowsync.engine", op = "delete_group", index, group = %key);
                    sink.delete_group(index);
                }
                StructuralOp::InsertGroup(index) => {
                    let key = working[index].clone();
                    trace!(target: "rowsync.engine", op = "insert_group", index, group = %key);
                    self.store.insert_group(index, key);
                    sink.insert_group(index);
                }
                _ => {}
            }
        }
        for (key, items) in carried {
            self.store.replace_items(key, items);
        }
        sink.end_batch();

        span.record("inserted", added.len());
        span.record("deleted", removed.len());
        debug!(
            target: "rowsync.engine",
            inserted = added.len(),
            deleted = removed.len(),
            "groups reconciled"
        );

        let mut affected = AffectedGroups::new();
        for key in removed {
            affected.insert(key, Vec::new());
        }
        for key in added {
            let items = self.store.items(key.as_str()).to_vec();
            affected.insert(key, items);
        }
        sink.affected_groups_changed(&affected);

        Ok(plan)
    }

    /// Bring the items of `group` to `new_items`.
    ///
    /// Identity-matched slots take the caller's values, so after success
    /// `items(group)` equals `new_items` element for element.
    pub fn set_items<S>(&mut self, group: &str, new_items: Vec<T>, sink: &mut S) -> Result<Changeset>
    where
        S: StructuralSink<T> + ?Sized,
    {
        let span = tracing::debug_span!(
            "rowsync.set_items",
            group = %group,
            new_len = new_items.len(),
            inserted = tracing::field::Empty,
            deleted = tracing::field::Empty,
        );
        let _guard = span.enter();

        let Some(group_index) = self.store.group_index(group) else {
            return Err(self.report(SyncError::unknown_group(group)));
        };
        let key = self.store.groups()[group_index].clone();

        let duplicates = find_duplicates(new_items.iter().map(Identified::identifier));
        if !duplicates.is_empty() {
            return Err(self.report(SyncError::DuplicateItems {
                group: key,
                duplicates,
            }));
        }

        let (plan, inserted, deleted) = {
            let old_ids: Vec<&str> = self
                .store
                .items(group)
                .iter()
                .map(Identified::identifier)
                .collect();
            let new_ids: Vec<&str> = new_items.iter().map(Identified::identifier).collect();
            let runs = diff(&old_ids, &new_ids);
            if is_identity(&runs) {
                trace!(target: "rowsync.engine", group = %key, "items unchanged");
                self.store.replace_items(key, new_items);
                return Ok(Changeset::new());
            }
            match self.plan_items(&key, group_index, &old_ids, &new_ids, &runs) {
                Ok(planned) => planned,
                Err(err) => return Err(self.report(err)),
            }
        };

        sink.begin_batch();
        for op in plan.ops() {
            match *op {
                StructuralOp::DeleteItem(path) => {
                    trace!(target: "rowsync.engine", op = "delete_item", %path);
                    sink.delete_item(path);
                }
                StructuralOp::InsertItem(path) => {
                    trace!(target: "rowsync.engine", op = "insert_item", %path);
                    sink.insert_item(path);
                }
                _ => {}
            }
        }
        self.store.replace_items(key.clone(), new_items);
        sink.end_batch();

        span.record("inserted", inserted);
        span.record("deleted", deleted);
        debug!(target: "rowsync.engine", group = %key, inserted, deleted, "items reconciled");

        let mut affected = AffectedGroups::new();
        let items = self.store.items(key.as_str()).to_vec();
        affected.insert(key, items);
        sink.affected_groups_changed(&affected);

        Ok(plan)
    }

    /// Two-cursor walk over the item runs.
    ///
    /// Deletes are addressed by `delete_cursor` (pre-batch positions) and
    /// removed from the working copy at `insert_cursor`; inserts are
    /// addressed by `insert_cursor` (post-batch positions).
    fn plan_items(
        &self,
        key: &Key,
        group_index: usize,
        old_ids: &[&str],
        new_ids: &[&str],
        runs: &[rowsync_diff::DiffRun<&str>],
    ) -> Result<(Changeset, usize, usize)> {
        let lookup: AHashMap<&str, usize> =
            new_ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let mut working: Vec<&str> = old_ids.to_vec();
        let mut plan = Changeset::new();
        let mut insert_cursor = 0usize;
        let mut delete_cursor = 0usize;
        let (mut inserted, mut deleted) = (0usize, 0usize);

        for run in runs {
            match run.op {
                DiffOp::Delete => {
                    for _ in &run.keys {
                        working.remove(insert_cursor);
                        plan.push(StructuralOp::DeleteItem(IndexPath::new(
                            group_index,
                            delete_cursor,
                        )));
                        delete_cursor += 1;
                        deleted += 1;
                    }
                }
                DiffOp::Insert => {
                    for id in &run.keys {
                        let Some(&position) = lookup.get(id) else {
                            return Err(SyncError::MissingInsertedItem {
                                group: key.clone(),
                                id: Key::from(*id),
                            });
                        };
                        working.insert(insert_cursor, new_ids[position]);
                        plan.push(StructuralOp::InsertItem(IndexPath::new(
                            group_index,
                            insert_cursor,
                        )));
                        insert_cursor += 1;
                        inserted += 1;
                    }
                }
                DiffOp::Equal => {
                    insert_cursor += run.len();
                    delete_cursor += run.len();
                }
            }
        }

        if self.verify_postconditions && working != new_ids {
            return Err(SyncError::postcondition(
                "set_items",
                format!("group {key}: planned {working:?}, requested {new_ids:?}"),
            ));
        }
        Ok((plan, inserted, deleted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ReportingLevel;
    use crate::sink::NullSink;

    fn engine() -> Engine<String> {
        Engine::new()
            .with_policy(ReportingPolicy::new(ReportingLevel::Silent).with_fail_handler(|_| {}))
            .with_verify_postconditions(true)
    }

    fn rows(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn identity_emits_nothing() {
        let mut e = engine();
        e.set_groups(["a", "b"], &mut NullSink).unwrap();
        let mut cs = Changeset::new();
        let planned = e.set_groups(["a", "b"], &mut cs).unwrap();
        assert!(planned.is_empty());
        assert_eq!(cs.batches(), 0);
    }

    #[test]
    fn interleaved_item_edits_use_two_cursors() {
        let mut e = engine();
        e.set_groups(["s"], &mut NullSink).unwrap();
        e.set_items("s", rows(&["0", "1", "2"]), &mut NullSink).unwrap();
        let cs = e.set_items("s", rows(&["0", "5", "4", "2"]), &mut NullSink).unwrap();
        assert_eq!(cs.inserted_items(), [IndexPath::new(0, 1), IndexPath::new(0, 2)]);
        assert_eq!(cs.deleted_items(), [IndexPath::new(0, 1)]);
        assert_eq!(e.items("s"), ["0", "5", "4", "2"]);
    }

    #[test]
    fn reordered_group_keeps_items() {
        let mut e = engine();
        e.set_groups(["a", "b"], &mut NullSink).unwrap();
        e.set_items("a", rows(&["x"]), &mut NullSink).unwrap();
        e.set_groups(["b", "a"], &mut NullSink).unwrap();
        assert_eq!(e.items("a"), ["x"]);
        assert!(e.store().check_invariants().is_ok());
    }

    #[test]
    fn removed_group_drops_items() {
        let mut e = engine();
        e.set_groups(["a"], &mut NullSink).unwrap();
        e.set_items("a", rows(&["x"]), &mut NullSink).unwrap();
        e.set_groups(Vec::<Key>::new(), &mut NullSink).unwrap();
        e.set_groups(["a"], &mut NullSink).unwrap();
        assert!(e.items("a").is_empty());
    }

    #[test]
    fn item_count_at_out_of_range_is_zero() {
        let e = engine();
        assert_eq!(e.item_count_at(4), 0);
    }

    #[test]
    fn locations_resolve_through_store() {
        let mut e = engine();
        e.set_groups(["a"], &mut NullSink).unwrap();
        e.set_items("a", rows(&["0", "1"]), &mut NullSink).unwrap();
        let loc = e.location_at(IndexPath::new(0, 1)).unwrap();
        assert_eq!(loc.group, "a");
        assert_eq!(loc.item, "1");
        assert!(e.location_at(IndexPath::new(0, 2)).is_none());
        let opt = e.location_with_optional_item_at(IndexPath::new(0, 2)).unwrap();
        assert!(opt.item.is_none());
        assert!(e.location_with_optional_item_at(IndexPath::new(1, 0)).is_none());
        assert_eq!(e.index_path_of("a", "1"), Some(IndexPath::new(0, 1)));
        assert_eq!(e.index_path_of("a", "9"), None);
    }
}
