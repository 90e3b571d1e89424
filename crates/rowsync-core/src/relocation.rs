#![forbid(unsafe_code)]

//! Single-item relocation (drag reorder).
//!
//! ```text
//!   from (g1, i) ──remove──► g1'            to (g2, j)
//!                              │             │ j >= len(g2') → append
//!                              └──insert────►│ else insert at j
//!
//!   affected = {g1}        when g1 == g2
//!            = {g1, g2}    otherwise
//! ```
//!
//! Both endpoints are resolved before the store is touched, so a bad
//! address leaves everything as it was.

use tracing::{debug, trace};

use crate::engine::Engine;
use crate::error::{Result, SyncError};
use crate::key::{Identified, IndexPath, Key, Location, LocationWithOptionalItem};
use crate::sink::{AffectedGroups, StructuralSink};

/// Caller hook that may redirect a proposed move destination.
///
/// Receives the item being moved and the proposed destination (`item ==
/// None` meaning the append position of the group) and returns the
/// destination it wants instead.
pub type MoveTargetResolver<T> =
    dyn Fn(&Location<T>, &LocationWithOptionalItem<T>) -> LocationWithOptionalItem<T>;

impl<T: Identified + Clone> Engine<T> {
    /// Move the item at `from` to `to`.
    ///
    /// Positions in `to` are measured after the item left its source, and
    /// an item index at or past the destination length appends. Returns the
    /// full resulting item list of every affected group, the same map the
    /// sink receives.
    pub fn move_item<S>(
        &mut self,
        from: IndexPath,
        to: IndexPath,
        sink: &mut S,
    ) -> Result<AffectedGroups<T>>
    where
        S: StructuralSink<T> + ?Sized,
    {
        let _span = tracing::debug_span!("rowsync.move_item", %from, %to).entered();

        let Some(source) = self.store.group_at(from.group).cloned() else {
            return Err(self.report(SyncError::GroupIndexOutOfRange {
                index: from.group,
                len: self.store.group_count(),
            }));
        };
        let source_len = self.store.item_count(source.as_str());
        if from.item >= source_len {
            return Err(self.report(SyncError::ItemIndexOutOfRange {
                path: from,
                len: source_len,
            }));
        }
        let Some(destination) = self.store.group_at(to.group).cloned() else {
            return Err(self.report(SyncError::GroupIndexOutOfRange {
                index: to.group,
                len: self.store.group_count(),
            }));
        };

        if source != destination {
            let id = self.store.items(source.as_str())[from.item].identifier();
            if self.store.item_index(destination.as_str(), id).is_some() {
                let duplicates = std::iter::once(Key::from(id)).collect();
                return Err(self.report(SyncError::DuplicateItems {
                    group: destination,
                    duplicates,
                }));
            }
        }

        let mut source_items = self.store.take_items(source.as_str());
        let item = source_items.remove(from.item);
        let mut destination_items = if source == destination {
            source_items
        } else {
            self.store.replace_items(source.clone(), source_items);
            self.store.take_items(destination.as_str())
        };

        let landed = if to.item >= destination_items.len() {
            destination_items.push(item);
            destination_items.len() - 1
        } else {
            destination_items.insert(to.item, item);
            to.item
        };
        self.store.replace_items(destination.clone(), destination_items);
        let resolved_to = IndexPath::new(to.group, landed);

        trace!(target: "rowsync.engine", op = "move_item", %from, to = %resolved_to);

        let mut affected = AffectedGroups::new();
        for key in [&source, &destination] {
            affected
                .entry(key.clone())
                .or_insert_with(|| self.store.items(key.as_str()).to_vec());
        }
        debug!(
            target: "rowsync.engine",
            source = %source,
            destination = %destination,
            affected = affected.len(),
            "item moved"
        );

        sink.begin_batch();
        sink.item_moved(from, resolved_to);
        sink.end_batch();
        sink.affected_groups_changed(&affected);

        Ok(affected)
    }

    /// Ask `resolver` where a dragged item should land.
    ///
    /// - No resolver: `proposed`.
    /// - Either endpoint unresolvable: `proposed`.
    /// - Resolver names an item found in its group: that item's path.
    /// - Resolver names an existing group: its append position (one less
    ///   when it is the source group, since the item leaves it).
    /// - Otherwise warn and fall back to `proposed`.
    pub fn resolve_move_target(
        &self,
        from: IndexPath,
        proposed: IndexPath,
        resolver: Option<&MoveTargetResolver<T>>,
    ) -> IndexPath {
        let Some(resolver) = resolver else {
            return proposed;
        };
        let Some(from_location) = self.location_at(from) else {
            debug!(target: "rowsync.engine", %from, "move source not found");
            return proposed;
        };
        let Some(proposed_location) = self.location_with_optional_item_at(proposed) else {
            debug!(target: "rowsync.engine", %proposed, "proposed group not found");
            return proposed;
        };

        let target = resolver(&from_location, &proposed_location);

        if let Some(item) = &target.item
            && let Some(path) = self.index_path_of(target.group.as_str(), item.identifier())
        {
            return path;
        }

        if let Some(group_index) = self.store.group_index(target.group.as_str()) {
            let len = self.store.item_count(target.group.as_str());
            let item = if group_index == from.group {
                len.saturating_sub(1)
            } else {
                len
            };
            return IndexPath::new(group_index, item);
        }

        self.report(SyncError::UnresolvedMoveTarget {
            group: target.group,
        });
        proposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{ReportingLevel, ReportingPolicy};
    use crate::sink::{Changeset, NullSink, StructuralOp};

    fn engine() -> Engine<String> {
        let mut e = Engine::new()
            .with_policy(ReportingPolicy::new(ReportingLevel::Silent))
            .with_verify_postconditions(true);
        e.set_groups(["a", "b"], &mut NullSink).unwrap();
        e.set_items("a", ["0", "1", "2", "3"].map(String::from).to_vec(), &mut NullSink)
            .unwrap();
        e.set_items("b", ["0", "1", "2"].map(String::from).to_vec(), &mut NullSink)
            .unwrap();
        e
    }

    #[test]
    fn move_within_group_reports_one_group() {
        let mut e = engine();
        let affected = e
            .move_item(IndexPath::new(0, 2), IndexPath::new(0, 1), &mut NullSink)
            .unwrap();
        assert_eq!(e.items("a"), ["0", "2", "1", "3"]);
        assert_eq!(affected.len(), 1);
        assert_eq!(affected[&Key::from("a")], e.items("a"));
    }

    #[test]
    fn move_past_end_appends() {
        let mut e = engine();
        let mut cs = Changeset::new();
        e.move_item(IndexPath::new(0, 3), IndexPath::new(1, 99), &mut cs)
            .unwrap();
        assert_eq!(e.items("b"), ["0", "1", "2", "3"]);
        assert_eq!(
            cs.ops(),
            &[StructuralOp::MoveItem {
                from: IndexPath::new(0, 3),
                to: IndexPath::new(1, 3),
            }]
        );
    }

    #[test]
    fn bad_addresses_leave_store_untouched() {
        let mut e = engine();
        assert!(matches!(
            e.move_item(IndexPath::new(0, 9), IndexPath::new(1, 0), &mut NullSink),
            Err(SyncError::ItemIndexOutOfRange { .. })
        ));
        assert!(matches!(
            e.move_item(IndexPath::new(0, 0), IndexPath::new(5, 0), &mut NullSink),
            Err(SyncError::GroupIndexOutOfRange { index: 5, len: 2 })
        ));
        assert_eq!(e.items("a"), ["0", "1", "2", "3"]);
        assert_eq!(e.items("b"), ["0", "1", "2"]);
    }

    #[test]
    fn resolver_absent_returns_proposed() {
        let e = engine();
        let proposed = IndexPath::new(1, 1);
        assert_eq!(e.resolve_move_target(IndexPath::new(0, 0), proposed, None), proposed);
    }

    #[test]
    fn resolver_item_maps_to_its_path() {
        let e = engine();
        let resolver = |_: &Location<String>, _: &LocationWithOptionalItem<String>| {
            LocationWithOptionalItem::new(Key::from("b"), Some("2".to_string()))
        };
        let path = e.resolve_move_target(IndexPath::new(0, 0), IndexPath::new(0, 1), Some(&resolver));
        assert_eq!(path, IndexPath::new(1, 2));
    }

    #[test]
    fn resolver_group_maps_to_append_position() {
        let e = engine();
        let to_b = |_: &Location<String>, _: &LocationWithOptionalItem<String>| {
            LocationWithOptionalItem::end_of(Key::from("b"))
        };
        assert_eq!(
            e.resolve_move_target(IndexPath::new(0, 0), IndexPath::new(0, 1), Some(&to_b)),
            IndexPath::new(1, 3)
        );
        let to_a = |_: &Location<String>, _: &LocationWithOptionalItem<String>| {
            LocationWithOptionalItem::end_of(Key::from("a"))
        };
        assert_eq!(
            e.resolve_move_target(IndexPath::new(0, 0), IndexPath::new(1, 1), Some(&to_a)),
            IndexPath::new(0, 3)
        );
    }

    #[test]
    fn unknown_resolver_group_falls_back() {
        let e = engine();
        let nowhere = |_: &Location<String>, _: &LocationWithOptionalItem<String>| {
            LocationWithOptionalItem::end_of(Key::from("zzz"))
        };
        let proposed = IndexPath::new(1, 0);
        assert_eq!(
            e.resolve_move_target(IndexPath::new(0, 0), proposed, Some(&nowhere)),
            proposed
        );
    }
}
