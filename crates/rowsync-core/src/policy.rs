#![forbid(unsafe_code)]

//! Failure reporting policy.
//!
//! Two paths, chosen by [`SyncError::severity`]:
//!
//! ```text
//!   SyncError ──► severity()
//!                   │
//!        Invariant  │  Recoverable
//!          ┌────────┴────────┐
//!          ▼                 ▼
//!     fail handler?     warn handler?
//!      yes │  no         yes │  no
//!          ▼   ▼             ▼   ▼
//!       call  panic       call  ReportingLevel
//!                                 Fatal       → panic
//!                                 AssertDebug → panic in debug builds
//!                                 Log         → tracing::warn!
//!                                 Silent      → nothing
//! ```
//!
//! An installed handler fully replaces the default behaviour of its path.
//! Each [`Engine`](crate::engine::Engine) owns its policy; there is no
//! process-wide state.

use std::fmt;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{Severity, SyncError};

/// Default behaviour of the warn path when no warn handler is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum ReportingLevel {
    /// Panic on every recoverable condition.
    Fatal,
    /// Panic only when debug assertions are enabled.
    #[default]
    AssertDebug,
    /// Emit a `tracing` warning.
    Log,
    /// Ignore.
    Silent,
}

impl ReportingLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fatal => "fatal",
            Self::AssertDebug => "assert_debug",
            Self::Log => "log",
            Self::Silent => "silent",
        }
    }
}

impl fmt::Display for ReportingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback receiving a reported error.
pub type ReportHandler = Box<dyn Fn(&SyncError)>;

/// Reporting level plus optional fail/warn handlers.
#[derive(Default)]
pub struct ReportingPolicy {
    level: ReportingLevel,
    fail: Option<ReportHandler>,
    warn: Option<ReportHandler>,
}

impl fmt::Debug for ReportingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportingPolicy")
            .field("level", &self.level)
            .field("fail_handler", &self.fail.is_some())
            .field("warn_handler", &self.warn.is_some())
            .finish()
    }
}

impl ReportingPolicy {
    #[must_use]
    pub fn new(level: ReportingLevel) -> Self {
        Self {
            level,
            fail: None,
            warn: None,
        }
    }

    #[must_use]
    pub fn with_fail_handler(mut self, handler: impl Fn(&SyncError) + 'static) -> Self {
        self.fail = Some(Box::new(handler));
        self
    }

    #[must_use]
    pub fn with_warn_handler(mut self, handler: impl Fn(&SyncError) + 'static) -> Self {
        self.warn = Some(Box::new(handler));
        self
    }

    #[must_use]
    pub fn level(&self) -> ReportingLevel {
        self.level
    }

    pub fn set_level(&mut self, level: ReportingLevel) {
        self.level = level;
    }

    pub fn set_fail_handler(&mut self, handler: Option<ReportHandler>) {
        self.fail = handler;
    }

    pub fn set_warn_handler(&mut self, handler: Option<ReportHandler>) {
        self.warn = handler;
    }

    /// Report through the path matching the error's severity.
    pub fn report(&self, err: &SyncError) {
        match err.severity() {
            Severity::Invariant => self.fail(err),
            Severity::Recoverable => self.warn(err),
        }
    }

    /// Fail path. Panics unless a fail handler is installed.
    pub fn fail(&self, err: &SyncError) {
        match &self.fail {
            Some(handler) => handler(err),
            None => {
                tracing::error!(kind = err.kind(), error = %err, "rowsync invariant violated");
                panic!("FATAL ERROR: {err}");
            }
        }
    }

    /// Warn path. A warn handler wins; otherwise the level decides.
    pub fn warn(&self, err: &SyncError) {
        if let Some(handler) = &self.warn {
            handler(err);
            return;
        }
        match self.level {
            ReportingLevel::Fatal => panic!("WARNING: {err}"),
            ReportingLevel::AssertDebug => {
                if cfg!(debug_assertions) {
                    panic!("WARNING: {err}");
                }
            }
            ReportingLevel::Log => {
                tracing::warn!(
                    kind = err.kind(),
                    severity = ?err.severity(),
                    error = %err,
                    "rowsync warning"
                );
            }
            ReportingLevel::Silent => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::IndexPath;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recoverable() -> SyncError {
        SyncError::unknown_group("missing")
    }

    fn invariant() -> SyncError {
        SyncError::UnresolvedCell {
            path: IndexPath::new(3, 4),
        }
    }

    #[test]
    fn default_level_is_assert_debug() {
        assert_eq!(ReportingPolicy::default().level(), ReportingLevel::AssertDebug);
        assert_eq!(ReportingLevel::default().to_string(), "assert_debug");
    }

    #[test]
    fn warn_handler_replaces_level() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let policy = ReportingPolicy::new(ReportingLevel::Fatal)
            .with_warn_handler(move |e| sink.borrow_mut().push(e.kind()));
        policy.report(&recoverable());
        assert_eq!(*seen.borrow(), ["unknown_group"]);
    }

    #[test]
    fn fail_handler_replaces_panic() {
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        let policy = ReportingPolicy::default().with_fail_handler(move |_| *sink.borrow_mut() += 1);
        policy.report(&invariant());
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn fail_handler_does_not_see_warnings() {
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        let policy = ReportingPolicy::new(ReportingLevel::Silent)
            .with_fail_handler(move |_| *sink.borrow_mut() += 1);
        policy.report(&recoverable());
        assert_eq!(*seen.borrow(), 0);
    }

    #[test]
    #[should_panic(expected = "FATAL ERROR")]
    fn fail_without_handler_panics() {
        ReportingPolicy::new(ReportingLevel::Silent).report(&invariant());
    }

    #[test]
    #[should_panic(expected = "WARNING")]
    fn fatal_level_panics_on_warning() {
        ReportingPolicy::new(ReportingLevel::Fatal).report(&recoverable());
    }

    #[test]
    fn silent_and_log_levels_do_not_panic() {
        ReportingPolicy::new(ReportingLevel::Silent).report(&recoverable());
        ReportingPolicy::new(ReportingLevel::Log).report(&recoverable());
    }

    #[test]
    fn assert_debug_follows_build_profile() {
        let result = std::panic::catch_unwind(|| {
            ReportingPolicy::new(ReportingLevel::AssertDebug).report(&recoverable());
        });
        assert_eq!(result.is_err(), cfg!(debug_assertions));
    }

    #[test]
    fn setters_swap_handlers() {
        let mut policy = ReportingPolicy::new(ReportingLevel::Fatal);
        policy.set_warn_handler(Some(Box::new(|_| {})));
        policy.report(&recoverable());
        policy.set_warn_handler(None);
        policy.set_level(ReportingLevel::Silent);
        policy.report(&recoverable());
        assert_eq!(policy.level(), ReportingLevel::Silent);
    }
}
