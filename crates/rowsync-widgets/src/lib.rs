#![forbid(unsafe_code)]

//! Sectioned list data source built on `rowsync-core`.
//!
//! A [`DataSource`] owns an [`Engine`](rowsync_core::Engine) and a
//! [`SectionedView`]. Updates are diffed by identity and played to the view
//! as section/row inserts and deletes; the view's questions (row counts,
//! cells, titles, move targets) and user actions (select, drag, delete) are
//! answered from the engine's store and the caller's [`Hooks`].
//!
//! [`ShadowView`] is a headless view that validates every call, for hosts
//! without a real widget and for tests.

pub mod data_source;
pub mod hooks;
pub mod shadow;
pub mod view;

pub use data_source::{CellRenderer, DataSource, EditingStyle};
pub use hooks::{Hooks, LocationHandler, LocationPredicate, TitleProvider};
pub use shadow::{ShadowView, ShadowViolation, ViewOp};
pub use view::SectionedView;
