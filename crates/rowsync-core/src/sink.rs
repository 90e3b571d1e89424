#![forbid(unsafe_code)]

//! Structural operation sink.
//!
//! The engine reports every structural edit it performs to a
//! [`StructuralSink`], in order and synchronously, bracketed by
//! `begin_batch`/`end_batch`.
//!
//! # Index semantics
//!
//! Group operations are sequential: each index is valid against the group
//! sequence as left by the previous operation of the same batch.
//!
//! ```text
//!   [a, b, c] → [c]      delete_group(0), delete_group(0)
//! ```
//!
//! Item operations use batch semantics: a deleted index names a slot in the
//! item list as it was *before* the batch, an inserted index names a slot in
//! the list as it is *after* the batch.
//!
//! ```text
//!   [0, 1, 2] → [0, 5, 4, 2]   insert_item(g, 1), insert_item(g, 2), delete_item(g, 1)
//! ```
//!
//! A sink that applies item operations one by one must therefore buffer
//! them until `end_batch` and apply deletes (descending) before inserts
//! (ascending).

use std::collections::BTreeMap;

use crate::key::{IndexPath, Key};

/// Full resulting item sequence of every group touched by an operation.
pub type AffectedGroups<T> = BTreeMap<Key, Vec<T>>;

/// Receiver of structural edits emitted by the engine.
pub trait StructuralSink<T> {
    fn begin_batch(&mut self);
    fn end_batch(&mut self);
    fn delete_group(&mut self, index: usize);
    fn insert_group(&mut self, index: usize);
    fn delete_item(&mut self, path: IndexPath);
    fn insert_item(&mut self, path: IndexPath);

    /// An item moved from `from` to `to`. Both paths are positions in the
    /// respective group sequences before and after the move.
    ///
    /// Defaults to a no-op: moves are typically initiated by the view that
    /// already shows them.
    fn item_moved(&mut self, from: IndexPath, to: IndexPath) {
        let _ = (from, to);
    }

    /// Coalesced change notification, sent after a batch that changed anything.
    fn affected_groups_changed(&mut self, affected: &AffectedGroups<T>) {
        let _ = affected;
    }
}

impl<T, S: StructuralSink<T> + ?Sized> StructuralSink<T> for &mut S {
    fn begin_batch(&mut self) {
        (**self).begin_batch();
    }
    fn end_batch(&mut self) {
        (**self).end_batch();
    }
    fn delete_group(&mut self, index: usize) {
        (**self).delete_group(index);
    }
    fn insert_group(&mut self, index: usize) {
        (**self).insert_group(index);
    }
    fn delete_item(&mut self, path: IndexPath) {
        (**self).delete_item(path);
    }
    fn insert_item(&mut self, path: IndexPath) {
        (**self).insert_item(path);
    }
    fn item_moved(&mut self, from: IndexPath, to: IndexPath) {
        (**self).item_moved(from, to);
    }
    fn affected_groups_changed(&mut self, affected: &AffectedGroups<T>) {
        (**self).affected_groups_changed(affected);
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl<T> StructuralSink<T> for NullSink {
    fn begin_batch(&mut self) {}
    fn end_batch(&mut self) {}
    fn delete_group(&mut self, _index: usize) {}
    fn insert_group(&mut self, _index: usize) {}
    fn delete_item(&mut self, _path: IndexPath) {}
    fn insert_item(&mut self, _path: IndexPath) {}
}

// ---------------------------------------------------------------------------
// Changeset
// ---------------------------------------------------------------------------

/// One structural edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructuralOp {
    DeleteGroup(usize),
    InsertGroup(usize),
    DeleteItem(IndexPath),
    InsertItem(IndexPath),
    MoveItem { from: IndexPath, to: IndexPath },
}

/// Ordered record of structural edits from one or more batches.
///
/// Usable as a [`StructuralSink`] itself; the engine also returns one from
/// each reconcile call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    ops: Vec<StructuralOp>,
    batches: usize,
}

impl Changeset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ops(&self) -> &[StructuralOp] {
        &self.ops
    }

    #[must_use]
    pub fn into_ops(self) -> Vec<StructuralOp> {
        self.ops
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Number of completed `begin_batch`/`end_batch` brackets.
    #[must_use]
    pub fn batches(&self) -> usize {
        self.batches
    }

    pub fn push(&mut self, op: StructuralOp) {
        self.ops.push(op);
    }

    pub fn clear(&mut self) {
        self.ops.clear();
        self.batches = 0;
    }

    #[must_use]
    pub fn inserted_groups(&self) -> Vec<usize> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                StructuralOp::InsertGroup(i) => Some(*i),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn deleted_groups(&self) -> Vec<usize> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                StructuralOp::DeleteGroup(i) => Some(*i),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn inserted_items(&self) -> Vec<IndexPath> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                StructuralOp::InsertItem(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn deleted_items(&self) -> Vec<IndexPath> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                StructuralOp::DeleteItem(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Forward every recorded op to another sink inside one batch.
    pub fn replay<T, S: StructuralSink<T> + ?Sized>(&self, sink: &mut S) {
        if self.ops.is_empty() {
            return;
        }
        sink.begin_batch();
        for op in &self.ops {
            match *op {
                StructuralOp::DeleteGroup(i) => sink.delete_group(i),
                StructuralOp::InsertGroup(i) => sink.insert_group(i),
                StructuralOp::DeleteItem(p) => sink.delete_item(p),
                StructuralOp::InsertItem(p) => sink.insert_item(p),
                StructuralOp::MoveItem { from, to } => sink.item_moved(from, to),
            }
        }
        sink.end_batch();
    }
}

impl<T> StructuralSink<T> for Changeset {
    fn begin_batch(&mut self) {}

    fn end_batch(&mut self) {
        self.batches += 1;
    }

    fn delete_group(&mut self, index: usize) {
        self.ops.push(StructuralOp::DeleteGroup(index));
    }

    fn insert_group(&mut self, index: usize) {
        self.ops.push(StructuralOp::InsertGroup(index));
    }

    fn delete_item(&mut self, path: IndexPath) {
        self.ops.push(StructuralOp::DeleteItem(path));
    }

    fn insert_item(&mut self, path: IndexPath) {
        self.ops.push(StructuralOp::InsertItem(path));
    }

    fn item_moved(&mut self, from: IndexPath, to: IndexPath) {
        self.ops.push(StructuralOp::MoveItem { from, to });
    }
}

/// Forwards every call to `first`, then to `second`.
///
/// Lets a caller drive a view and record a [`Changeset`] from one call.
pub struct Tee<'a, A: ?Sized, B: ?Sized> {
    pub first: &'a mut A,
    pub second: &'a mut B,
}

impl<'a, A: ?Sized, B: ?Sized> Tee<'a, A, B> {
    pub fn new(first: &'a mut A, second: &'a mut B) -> Self {
        Self { first, second }
    }
}

impl<T, A, B> StructuralSink<T> for Tee<'_, A, B>
where
    A: StructuralSink<T> + ?Sized,
    B: StructuralSink<T> + ?Sized,
{
    fn begin_batch(&mut self) {
        self.first.begin_batch();
        self.second.begin_batch();
    }
    fn end_batch(&mut self) {
        self.first.end_batch();
        self.second.end_batch();
    }
    fn delete_group(&mut self, index: usize) {
        self.first.delete_group(index);
        self.second.delete_group(index);
    }
    fn insert_group(&mut self, index: usize) {
        self.first.insert_group(index);
        self.second.insert_group(index);
    }
    fn delete_item(&mut self, path: IndexPath) {
        self.first.delete_item(path);
        self.second.delete_item(path);
    }
    fn insert_item(&mut self, path: IndexPath) {
        self.first.insert_item(path);
        self.second.insert_item(path);
    }
    fn item_moved(&mut self, from: IndexPath, to: IndexPath) {
        self.first.item_moved(from, to);
        self.second.item_moved(from, to);
    }
    fn affected_groups_changed(&mut self, affected: &AffectedGroups<T>) {
        self.first.affected_groups_changed(affected);
        self.second.affected_groups_changed(affected);
    }
}
