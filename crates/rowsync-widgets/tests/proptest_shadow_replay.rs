#![forbid(unsafe_code)]

//! Property tests: a [`ShadowView`] driven by a [`DataSource`] stays in step.
//!
//! After every update, section insert/delete, row edit, programmatic move,
//! drag and row delete, the shadow view must report no violations and its
//! per-section row counts must equal the engine's item list lengths.
//!
//! Run:
//!   cargo test -p rowsync-widgets --test proptest_shadow_replay

use proptest::prelude::*;
use rowsync_core::{IndexPath, Location, ReportingLevel, ReportingPolicy};
use rowsync_widgets::{DataSource, EditingStyle, SectionedView, ShadowView};

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Action {
    Sections(Vec<String>),
    Rows(usize, Vec<String>),
    Move(IndexPath, IndexPath),
    Drag(IndexPath, IndexPath),
    Delete(IndexPath),
    Reload,
}

fn unique(prefix: &'static str, alphabet: u8, max_len: usize) -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(0..alphabet, 0..=max_len).prop_map(move |mut v| {
        let mut seen = std::collections::HashSet::new();
        v.retain(|k| seen.insert(*k));
        v.into_iter().map(|k| format!("{prefix}{k}")).collect()
    })
}

fn path() -> impl Strategy<Value = IndexPath> {
    (0usize..6, 0usize..10).prop_map(|(s, r)| IndexPath::new(s, r))
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        2 => unique("s", 6, 5).prop_map(Action::Sections),
        5 => (0usize..6, unique("r", 10, 8)).prop_map(|(s, rows)| Action::Rows(s, rows)),
        1 => (path(), path()).prop_map(|(a, b)| Action::Move(a, b)),
        1 => (path(), path()).prop_map(|(a, b)| Action::Drag(a, b)),
        1 => path().prop_map(Action::Delete),
        1 => Just(Action::Reload),
    ]
}

type Source = DataSource<String, (), ShadowView>;

fn quiet_source() -> Source {
    let mut ds = DataSource::new(ShadowView::new(), |_: &Location<String>| ());
    *ds.policy_mut() = ReportingPolicy::new(ReportingLevel::Silent).with_fail_handler(|_| {});
    ds
}

fn apply(ds: &mut Source, action: &Action) {
    match action {
        Action::Sections(sections) => {
            let _ = ds.update_sections(sections.iter().map(String::as_str));
        }
        Action::Rows(section, rows) => {
            if let Some(key) = ds.engine().group_at(*section).cloned() {
                let _ = ds.update_rows(rows.clone(), key.as_str());
            }
        }
        Action::Move(from, to) => {
            let _ = ds.move_item(*from, *to);
        }
        Action::Drag(from, to) => {
            // A widget only lets the user drop where the target is valid; it
            // shows the drop first and then reports it.
            let engine = ds.engine();
            let Some(source) = engine.group_at(from.group) else {
                return;
            };
            let Some(destination) = engine.group_at(to.group) else {
                return;
            };
            let Some(item) = engine.item_at(*from) else {
                return;
            };
            let dest_rows = engine.items(destination.as_str());
            if source != destination && dest_rows.contains(item) {
                return;
            }
            let room = if source == destination {
                dest_rows.len() - 1
            } else {
                dest_rows.len()
            };
            let to = IndexPath::new(to.group, to.item.min(room));
            ds.view_mut().move_row(*from, to);
            let _ = ds.move_row(*from, to);
        }
        Action::Delete(path) => {
            let _ = ds.commit_edit(EditingStyle::Delete, *path);
        }
        Action::Reload => ds.reload_all(),
    }
}

fn expected_counts(ds: &Source) -> Vec<usize> {
    ds.sections()
        .iter()
        .map(|key| ds.rows(key.as_str()).len())
        .collect()
}

// ═════════════════════════════════════════════════════════════════════════
// Shadow view tracks the engine
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(192))]

    #[test]
    fn shadow_view_tracks_engine(actions in proptest::collection::vec(action(), 1..32)) {
        let mut ds = quiet_source();
        for action in &actions {
            apply(&mut ds, action);
            let view = ds.view();
            prop_assert!(
                view.is_consistent(),
                "{:?} after {:?}",
                view.violations(),
                action
            );
            prop_assert_eq!(view.section_count(), ds.number_of_sections());
            prop_assert_eq!(view.row_counts(), expected_counts(&ds), "after {:?}", action);
            prop_assert!(ds.engine().store().check_invariants().is_ok());
        }
    }

    #[test]
    fn every_cell_resolves(actions in proptest::collection::vec(action(), 1..16)) {
        let mut ds = quiet_source();
        for action in &actions {
            apply(&mut ds, action);
        }
        for section in 0..ds.number_of_sections() {
            for row in 0..ds.number_of_rows(section) {
                prop_assert!(ds.cell_at(IndexPath::new(section, row)).is_some());
            }
        }
    }
}
