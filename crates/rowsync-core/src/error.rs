#![forbid(unsafe_code)]

//! Error type shared by every engine operation.
//!
//! Each [`SyncError`] carries a [`Severity`]: invariant violations are
//! routed through the fail path of the [`ReportingPolicy`], recoverable
//! conditions through the warn path.
//!
//! [`ReportingPolicy`]: crate::policy::ReportingPolicy

use smallvec::SmallVec;
use thiserror::Error;

use crate::key::{IndexPath, Key};

pub type Result<T> = std::result::Result<T, SyncError>;

/// Duplicate identifiers found in one input sequence, in first-repeat order.
pub type Duplicates = SmallVec<[Key; 4]>;

/// Which reporting path a [`SyncError`] travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Caller contract broken; the operation was aborted.
    Invariant,
    /// Caller asked for something that does not exist; the operation was a no-op.
    Recoverable,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("duplicate group identifiers: {}", join(.duplicates))]
    DuplicateGroups { duplicates: Duplicates },

    #[error("duplicate item identifiers in group {group}: {}", join(.duplicates))]
    DuplicateItems { group: Key, duplicates: Duplicates },

    #[error("inserted item {id} not found in new items of group {group}")]
    MissingInsertedItem { group: Key, id: Key },

    #[error("postcondition failed after {operation}: {detail}")]
    PostconditionFailed {
        operation: &'static str,
        detail: String,
    },

    #[error("no cell for unresolvable index path {path}")]
    UnresolvedCell { path: IndexPath },

    #[error("unknown group: {group}")]
    UnknownGroup { group: Key },

    #[error("group index {index} out of range (groups={len})")]
    GroupIndexOutOfRange { index: usize, len: usize },

    #[error("item index path {path} out of range (items={len})")]
    ItemIndexOutOfRange { path: IndexPath, len: usize },

    #[error("move target names unknown group {group}")]
    UnresolvedMoveTarget { group: Key },
}

impl SyncError {
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::DuplicateGroups { .. }
            | Self::DuplicateItems { .. }
            | Self::MissingInsertedItem { .. }
            | Self::PostconditionFailed { .. }
            | Self::UnresolvedCell { .. } => Severity::Invariant,
            Self::UnknownGroup { .. }
            | Self::GroupIndexOutOfRange { .. }
            | Self::ItemIndexOutOfRange { .. }
            | Self::UnresolvedMoveTarget { .. } => Severity::Recoverable,
        }
    }

    /// Short stable name, used as a structured log field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateGroups { .. } => "duplicate_groups",
            Self::DuplicateItems { .. } => "duplicate_items",
            Self::MissingInsertedItem { .. } => "missing_inserted_item",
            Self::PostconditionFailed { .. } => "postcondition_failed",
            Self::UnresolvedCell { .. } => "unresolved_cell",
            Self::UnknownGroup { .. } => "unknown_group",
            Self::GroupIndexOutOfRange { .. } => "group_index_out_of_range",
            Self::ItemIndexOutOfRange { .. } => "item_index_out_of_range",
            Self::UnresolvedMoveTarget { .. } => "unresolved_move_target",
        }
    }

    #[must_use]
    pub fn unknown_group(group: impl Into<Key>) -> Self {
        Self::UnknownGroup {
            group: group.into(),
        }
    }

    #[must_use]
    pub fn postcondition(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::PostconditionFailed {
            operation,
            detail: detail.into(),
        }
    }
}

fn join(keys: &[Key]) -> String {
    let mut out = String::new();
    for (i, key) in keys.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(key.as_str());
    }
    out
}

/// Collect identifiers that occur more than once, each reported once.
pub(crate) fn find_duplicates<'a, I>(ids: I) -> Duplicates
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = ahash::AHashSet::new();
    let mut reported = ahash::AHashSet::new();
    let mut duplicates = Duplicates::new();
    for id in ids {
        if !seen.insert(id) && reported.insert(id) {
            duplicates.push(Key::from(id));
        }
    }
    duplicates
}
