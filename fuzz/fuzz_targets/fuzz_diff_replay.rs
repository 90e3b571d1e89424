#![no_main]

use libfuzzer_sys::fuzz_target;
use rowsync_diff::{DiffOp, DiffStats, apply, diff, is_identity};

fuzz_target!(|data: &[u8]| {
    // First byte splits the input into old and new; a small alphabet keeps
    // the sequences overlapping.
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    if rest.len() > 512 {
        return;
    }
    let split = usize::from(split).min(rest.len());
    let old: Vec<u8> = rest[..split].iter().map(|b| b % 16).collect();
    let new: Vec<u8> = rest[split..].iter().map(|b| b % 16).collect();

    let runs = diff(&old, &new);

    // Replaying the script on old must produce new.
    let replayed = apply(&old, &runs).expect("script does not apply to its own input");
    assert_eq!(replayed, new);

    // Runs are non-empty and maximal.
    for pair in runs.windows(2) {
        assert_ne!(pair[0].op, pair[1].op, "adjacent runs share an op");
    }
    assert!(runs.iter().all(|r| !r.is_empty()), "empty run");

    let stats = DiffStats::from_runs(&runs);
    assert_eq!(stats.equal + stats.deleted, old.len());
    assert_eq!(stats.equal + stats.inserted, new.len());
    assert_eq!(is_identity(&runs), old == new);
    if old == new {
        assert!(runs.iter().all(|r| r.op == DiffOp::Equal));
    }
});
