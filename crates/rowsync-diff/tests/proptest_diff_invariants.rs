//! Property-based invariant tests for the diff engine.
//!
//! 1. Replaying the runs against `old` yields exactly `new`.
//! 2. Equal + Delete keys reconstruct `old`; Equal + Insert keys reconstruct `new`.
//! 3. Runs are non-empty and adjacent runs never share an op.
//! 4. The Equal count equals an independently computed LCS length (minimality).
//! 5. Identical inputs produce a single Equal run (or none when empty).
//! 6. Determinism: same inputs always produce the same runs.

use proptest::prelude::*;
use rowsync_diff::{DiffOp, DiffRun, DiffStats, apply, diff, is_identity};

// ── Helpers ─────────────────────────────────────────────────────────────

/// Sequences drawn from a small alphabet so that matches are frequent.
fn keys(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(0u8..8, 0..=max_len)
}

/// Duplicate-free sequences, as the reconciliation engine feeds them.
fn unique_keys(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(0u8..24, 0..=max_len).prop_map(|mut v| {
        let mut seen = std::collections::HashSet::new();
        v.retain(|k| seen.insert(*k));
        v
    })
}

fn naive_lcs_len(a: &[u8], b: &[u8]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    for x in a {
        let mut cur = vec![0usize; b.len() + 1];
        for (j, y) in b.iter().enumerate() {
            cur[j + 1] = if x == y {
                prev[j] + 1
            } else {
                prev[j + 1].max(cur[j])
            };
        }
        prev = cur;
    }
    prev[b.len()]
}

fn collect(runs: &[DiffRun<u8>], keep: DiffOp) -> Vec<u8> {
    runs.iter()
        .filter(|r| r.op == DiffOp::Equal || r.op == keep)
        .flat_map(|r| r.keys.iter().copied())
        .collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Replay reconstructs the new sequence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn replay_yields_new(old in keys(40), new in keys(40)) {
        let runs = diff(&old, &new);
        prop_assert_eq!(apply(&old, &runs), Some(new.clone()));
    }

    #[test]
    fn replay_yields_new_unique(old in unique_keys(24), new in unique_keys(24)) {
        let runs = diff(&old, &new);
        prop_assert_eq!(apply(&old, &runs), Some(new.clone()));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Concatenation invariants
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn runs_reconstruct_both_sides(old in keys(40), new in keys(40)) {
        let runs = diff(&old, &new);
        prop_assert_eq!(collect(&runs, DiffOp::Delete), old);
        prop_assert_eq!(collect(&runs, DiffOp::Insert), new);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Runs are maximal
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn runs_are_maximal(old in keys(40), new in keys(40)) {
        let runs = diff(&old, &new);
        for run in &runs {
            prop_assert!(!run.is_empty());
        }
        for pair in runs.windows(2) {
            prop_assert_ne!(pair[0].op, pair[1].op);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Minimal edit distance
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn equal_count_is_lcs_length(old in keys(30), new in keys(30)) {
        let runs = diff(&old, &new);
        let stats = DiffStats::from_runs(&runs);
        let lcs = naive_lcs_len(&old, &new);
        prop_assert_eq!(stats.equal, lcs);
        prop_assert_eq!(stats.deleted, old.len() - lcs);
        prop_assert_eq!(stats.inserted, new.len() - lcs);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5–6. Identity and determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn identical_inputs_are_identity(seq in keys(40)) {
        let runs = diff(&seq, &seq);
        prop_assert!(is_identity(&runs));
        prop_assert!(runs.len() <= 1);
        prop_assert_eq!(runs.is_empty(), seq.is_empty());
    }

    #[test]
    fn deterministic(old in keys(30), new in keys(30)) {
        prop_assert_eq!(diff(&old, &new), diff(&old, &new));
    }
}
