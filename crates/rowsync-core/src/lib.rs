#![forbid(unsafe_code)]

//! Two-level list reconciliation.
//!
//! An [`Engine`] keeps an ordered sequence of groups, each holding an ordered
//! sequence of identity-bearing items. Handing it a new sequence of groups
//! ([`Engine::set_groups`]) or a new item list for one group
//! ([`Engine::set_items`]) diffs by identity, mutates the store, and reports
//! the minimal structural edits to a [`StructuralSink`] in an order a
//! presentation layer can replay index by index. [`Engine::move_item`]
//! relocates a single item, possibly across groups.
//!
//! ```
//! use rowsync_core::{Changeset, Engine, IndexPath};
//!
//! let mut engine: Engine<String> = Engine::new();
//! let mut ops = Changeset::new();
//! engine.set_groups(["inbox"], &mut ops).unwrap();
//! engine
//!     .set_items("inbox", vec!["0".into(), "1".into(), "2".into()], &mut ops)
//!     .unwrap();
//!
//! let edits = engine
//!     .set_items("inbox", vec!["0".into(), "2".into(), "3".into()], &mut ops)
//!     .unwrap();
//! assert_eq!(edits.deleted_items(), [IndexPath::new(0, 1)]);
//! assert_eq!(edits.inserted_items(), [IndexPath::new(0, 2)]);
//! ```
//!
//! Failures are reported through the engine's [`ReportingPolicy`] before
//! being returned; see [`policy`] for the fail/warn split.

pub mod config;
pub mod engine;
pub mod error;
pub mod key;
pub mod policy;
pub mod relocation;
pub mod sink;
pub mod store;

pub use config::{ConfigError, SyncConfig};
pub use engine::Engine;
pub use error::{Duplicates, Result, Severity, SyncError};
pub use key::{Identified, IndexPath, Key, Location, LocationWithOptionalItem};
pub use policy::{ReportHandler, ReportingLevel, ReportingPolicy};
pub use relocation::MoveTargetResolver;
pub use sink::{AffectedGroups, Changeset, NullSink, StructuralOp, StructuralSink, Tee};
pub use store::GroupStore;

pub use rowsync_diff::{DiffOp, DiffRun, DiffStats, diff};
