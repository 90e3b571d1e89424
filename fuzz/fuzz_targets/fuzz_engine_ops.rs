#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rowsync_core::{Changeset, Engine, IndexPath, ReportingLevel, ReportingPolicy};

#[derive(Debug, Arbitrary)]
enum Op {
    SetGroups(Vec<u8>),
    SetItems(u8, Vec<u8>),
    Move(u8, u8, u8, u8),
}

fn keys(prefix: char, raw: &[u8], alphabet: u8) -> Vec<String> {
    raw.iter()
        .take(16)
        .map(|b| format!("{prefix}{}", b % alphabet))
        .collect()
}

fuzz_target!(|ops: Vec<Op>| {
    let mut engine: Engine<String> = Engine::new()
        .with_policy(ReportingPolicy::new(ReportingLevel::Silent).with_fail_handler(|_| {}))
        .with_verify_postconditions(true);
    let mut sink = Changeset::new();

    for op in ops.iter().take(64) {
        match op {
            Op::SetGroups(raw) => {
                let groups = keys('g', raw, 8);
                if engine.set_groups(groups.iter().map(String::as_str), &mut sink).is_ok() {
                    assert_eq!(engine.groups(), groups.as_slice());
                }
            }
            Op::SetItems(group, raw) => {
                let group = format!("g{}", group % 8);
                let items = keys('i', raw, 12);
                if engine.set_items(&group, items.clone(), &mut sink).is_ok() {
                    assert_eq!(engine.items(&group), items.as_slice());
                }
            }
            Op::Move(a, b, c, d) => {
                let from = IndexPath::new(usize::from(a % 8), usize::from(b % 16));
                let to = IndexPath::new(usize::from(c % 8), usize::from(d % 20));
                let before = engine.store().total_items();
                let _ = engine.move_item(from, to, &mut sink);
                assert_eq!(engine.store().total_items(), before);
            }
        }
        if let Err(msg) = engine.store().check_invariants() {
            panic!("store invariant broken after {op:?}: {msg}");
        }
        sink.clear();
    }
});
