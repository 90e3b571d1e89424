#![forbid(unsafe_code)]

//! Canonical two-level store.
//!
//! # Invariants
//!
//! 1. Every key of `items_by_group` appears in `group_order`.
//! 2. `group_order` has no duplicate keys.
//! 3. No item list holds two items with the same identifier.
//!
//! A group present in `group_order` without an entry in `items_by_group`
//! has no items. Only the engine mutates the store; every mutation helper
//! here is crate-private.

use ahash::AHashMap;

use crate::key::{Identified, IndexPath, Key};

#[derive(Debug, Clone)]
pub struct GroupStore<T> {
    group_order: Vec<Key>,
    items_by_group: AHashMap<Key, Vec<T>>,
}

impl<T> Default for GroupStore<T> {
    fn default() -> Self {
        Self {
            group_order: Vec::new(),
            items_by_group: AHashMap::new(),
        }
    }
}

impl<T> GroupStore<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Group keys in presentation order.
    #[must_use]
    pub fn groups(&self) -> &[Key] {
        &self.group_order
    }

    #[must_use]
    pub fn group_count(&self) -> usize {
        self.group_order.len()
    }

    #[must_use]
    pub fn contains_group(&self, group: &str) -> bool {
        self.group_index(group).is_some()
    }

    #[must_use]
    pub fn group_index(&self, group: &str) -> Option<usize> {
        self.group_order.iter().position(|k| k.as_str() == group)
    }

    #[must_use]
    pub fn group_at(&self, index: usize) -> Option<&Key> {
        self.group_order.get(index)
    }

    /// Items of `group`; empty when the group is unknown or has none.
    #[must_use]
    pub fn items(&self, group: &str) -> &[T] {
        self.items_by_group.get(group).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn item_count(&self, group: &str) -> usize {
        self.items(group).len()
    }

    #[must_use]
    pub fn item_at(&self, path: IndexPath) -> Option<&T> {
        let group = self.group_order.get(path.group)?;
        self.items(group.as_str()).get(path.item)
    }

    /// Total number of stored items across all groups.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.items_by_group.values().map(Vec::len).sum()
    }

    // -- mutation (engine only) ---------------------------------------------

    pub(crate) fn insert_group(&mut self, index: usize, key: Key) {
        self.group_order.insert(index, key);
    }

    /// Remove the group at `index` and drop its item list.
    pub(crate) fn remove_group(&mut self, index: usize) -> Key {
        let key = self.group_order.remove(index);
        self.items_by_group.remove(&key);
        key
    }

    pub(crate) fn replace_items(&mut self, group: Key, items: Vec<T>) {
        if items.is_empty() {
            self.items_by_group.remove(&group);
        } else {
            self.items_by_group.insert(group, items);
        }
    }

    pub(crate) fn take_items(&mut self, group: &str) -> Vec<T> {
        self.items_by_group.remove(group).unwrap_or_default()
    }
}

impl<T: Identified> GroupStore<T> {
    /// Index of the item with `id` inside `group`.
    #[must_use]
    pub fn item_index(&self, group: &str, id: &str) -> Option<usize> {
        self.items(group).iter().position(|item| item.identifier() == id)
    }

    /// Check invariants 1-3. Returns a description of the first violation.
    pub fn check_invariants(&self) -> Result<(), String> {
        for key in self.items_by_group.keys() {
            if !self.group_order.contains(key) {
                return Err(format!("orphan item list for group {key}"));
            }
        }
        let dups = crate::error::find_duplicates(self.group_order.iter().map(Key::as_str));
        if let Some(dup) = dups.first() {
            return Err(format!("duplicate group {dup}"));
        }
        for (key, items) in &self.items_by_group {
            let dups = crate::error::find_duplicates(items.iter().map(Identified::identifier));
            if let Some(dup) = dups.first() {
                return Err(format!("duplicate item {dup} in group {key}"));
            }
        }
        Ok(())
    }
}
