#![forbid(unsafe_code)]

//! rowsync public facade.
//!
//! Re-exports the diff, the reconciliation engine and (with the default
//! `widgets` feature) the sectioned data source, plus a prelude for
//! day-to-day use.
//!
//! ```
//! use rowsync::prelude::*;
//!
//! let mut engine: Engine<String> = Engine::new();
//! let mut ops = Changeset::new();
//! engine.set_groups(["inbox", "archive"], &mut ops).unwrap();
//! engine
//!     .set_items("inbox", vec!["m1".to_string(), "m2".to_string()], &mut ops)
//!     .unwrap();
//! assert_eq!(ops.inserted_groups(), vec![0, 1]);
//! assert_eq!(engine.items("inbox").len(), 2);
//! ```

// --- Diff re-exports -------------------------------------------------------

pub use rowsync_diff::{DiffOp, DiffRun, DiffStats, diff, is_identity};

// --- Engine re-exports -----------------------------------------------------

pub use rowsync_core::{
    AffectedGroups, Changeset, ConfigError, Engine, GroupStore, Identified, IndexPath, Key,
    Location, LocationWithOptionalItem, MoveTargetResolver, NullSink, ReportHandler,
    ReportingLevel, ReportingPolicy, Severity, StructuralOp, StructuralSink, SyncConfig,
    SyncError, Tee,
};

// --- Widget re-exports -----------------------------------------------------

#[cfg(feature = "widgets")]
pub use rowsync_widgets::{
    DataSource, EditingStyle, Hooks, SectionedView, ShadowView, ShadowViolation, ViewOp,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for rowsync callers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A reconciliation or relocation call was rejected.
    #[error(transparent)]
    Sync(#[from] SyncError),
    /// Loading or saving a [`SyncConfig`] failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Standard result type for rowsync APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AffectedGroups, Changeset, Engine, Error, Identified, IndexPath, Key, Location,
        ReportingLevel, ReportingPolicy, Result, StructuralSink, SyncConfig, SyncError,
    };

    #[cfg(feature = "widgets")]
    pub use crate::{DataSource, Hooks, SectionedView, ShadowView};

    pub use crate::{core, diff};
    #[cfg(feature = "widgets")]
    pub use crate::widgets;
}

pub use rowsync_core as core;
#[cfg(feature = "widgets")]
pub use rowsync_widgets as widgets;

/// The diff crate, under a name that does not clash with [`diff()`].
pub mod diff {
    pub use rowsync_diff::*;
}
