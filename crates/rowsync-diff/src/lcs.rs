#![forbid(unsafe_code)]

//! Longest-common-subsequence alignment.
//!
//! # Algorithm
//!
//! 1. Strip the common prefix and suffix; both become Equal runs.
//! 2. Fill a suffix table over the remaining middle:
//!    `lcs[i][j]` = LCS length of `old[i..]` and `new[j..]`.
//! 3. Walk forward from `(0, 0)`: equal keys are matched immediately (the
//!    earliest possible match), otherwise step along whichever axis keeps
//!    the larger remaining LCS. Ties consume the deletion first.
//!
//! The forward walk makes the alignment leftmost and deterministic: the same
//! inputs always yield the same runs.
//!
//! Middles larger than [`MAX_TABLE_CELLS`] are first split in half
//! (Hirschberg): one forward and one backward LCS row locate a column where
//! an optimal alignment crosses the middle of `old`, and each half is
//! aligned on its own. The result is still a minimal edit script, though
//! ties may resolve differently than a single table would.
//!
//! # Complexity
//!
//! | Phase          | Time        | Space                            |
//! |----------------|-------------|----------------------------------|
//! | prefix/suffix  | O(n + m)    | O(1)                             |
//! | split          | O(n' * m')  | O(n' + m')                       |
//! | suffix table   | O(n' * m')  | O(min(n' * m', MAX_TABLE_CELLS)) |
//! | walk           | O(n' + m')  | O(1)                             |
//!
//! where `n'`, `m'` are the lengths left after trimming. Splitting at most
//! doubles the comparison count.

use crate::run::{DiffOp, DiffRun};

/// Accumulates keys into maximal runs.
struct RunBuilder<K> {
    runs: Vec<DiffRun<K>>,
}

impl<K: Clone> RunBuilder<K> {
    fn new() -> Self {
        Self { runs: Vec::new() }
    }

    fn push(&mut self, op: DiffOp, key: &K) {
        match self.runs.last_mut() {
            Some(last) if last.op == op => last.keys.push(key.clone()),
            _ => self.runs.push(DiffRun::new(op, vec![key.clone()])),
        }
    }

    fn extend(&mut self, op: DiffOp, keys: &[K]) {
        for key in keys {
            self.push(op, key);
        }
    }

    fn finish(self) -> Vec<DiffRun<K>> {
        self.runs
    }
}

/// Compute the Equal/Insert/Delete runs that turn `old` into `new`.
///
/// Total for any inputs; duplicate keys within one side are aligned like any
/// other key.
///
/// ```
/// use rowsync_diff::{DiffOp, diff};
///
/// let runs = diff(&["0", "1", "2"], &["0", "5", "4", "2"]);
/// let ops: Vec<DiffOp> = runs.iter().map(|r| r.op).collect();
/// assert_eq!(ops, [DiffOp::Equal, DiffOp::Delete, DiffOp::Insert, DiffOp::Equal]);
/// ```
#[must_use]
pub fn diff<K: PartialEq + Clone>(old: &[K], new: &[K]) -> Vec<DiffRun<K>> {
    let prefix = old
        .iter()
        .zip(new.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let old_mid = &old[prefix..old.len() - suffix];
    let new_mid = &new[prefix..new.len() - suffix];

    let mut builder = RunBuilder::new();
    builder.extend(DiffOp::Equal, &old[..prefix]);
    align(old_mid, new_mid, &mut builder);
    builder.extend(DiffOp::Equal, &old[old.len() - suffix..]);
    let runs = builder.finish();

    #[cfg(feature = "tracing")]
    tracing::trace!(
        old_len = old.len(),
        new_len = new.len(),
        trimmed_prefix = prefix,
        trimmed_suffix = suffix,
        runs = runs.len(),
        "rowsync.diff"
    );

    runs
}

/// Middles with more table cells than this are split before aligning.
///
/// 1500 x 1500 cells of `u32` is about 9 MiB.
const MAX_TABLE_CELLS: usize = 1500 * 1500;

fn align<K: PartialEq + Clone>(old: &[K], new: &[K], builder: &mut RunBuilder<K>) {
    align_bounded(old, new, builder, MAX_TABLE_CELLS);
}

/// Hirschberg split: halve `old`, find where an optimal alignment crosses
/// the middle row from two linear-space LCS rows, and recurse on each half
/// until the pieces fit the table.
fn align_bounded<K: PartialEq + Clone>(
    old: &[K],
    new: &[K],
    builder: &mut RunBuilder<K>,
    max_cells: usize,
) {
    let m = old.len();
    let n = new.len();
    if m == 0 {
        builder.extend(DiffOp::Insert, new);
        return;
    }
    if n == 0 {
        builder.extend(DiffOp::Delete, old);
        return;
    }
    if (m + 1).saturating_mul(n + 1) <= max_cells || m == 1 {
        align_table(old, new, builder);
        return;
    }

    let mid = m / 2;
    let top: Vec<&K> = old[..mid].iter().collect();
    let bottom: Vec<&K> = old[mid..].iter().rev().collect();
    let forward = lcs_row(&top, &new.iter().collect::<Vec<_>>());
    let backward = lcs_row(&bottom, &new.iter().rev().collect::<Vec<_>>());

    // forward[k] = LCS(old[..mid], new[..k]); backward[n - k] = LCS(old[mid..], new[k..]).
    // The first maximum keeps the split leftmost.
    let mut split = 0usize;
    let mut best = forward[0] + backward[n];
    for k in 1..=n {
        let total = forward[k] + backward[n - k];
        if total > best {
            best = total;
            split = k;
        }
    }

    align_bounded(&old[..mid], &new[..split], builder, max_cells);
    align_bounded(&old[mid..], &new[split..], builder, max_cells);
}

/// Last row of the LCS prefix table of `a` against `b`, in O(len(b)) space.
fn lcs_row<K: PartialEq>(a: &[&K], b: &[&K]) -> Vec<u32> {
    let mut row = vec![0u32; b.len() + 1];
    for x in a {
        let mut diag = 0u32;
        for (j, y) in b.iter().enumerate() {
            let up = row[j + 1];
            row[j + 1] = if x == y { diag + 1 } else { up.max(row[j]) };
            diag = up;
        }
    }
    row
}

/// Full suffix table and forward walk. Only called on middles that fit
/// [`MAX_TABLE_CELLS`], or on a single old key.
fn align_table<K: PartialEq + Clone>(old: &[K], new: &[K], builder: &mut RunBuilder<K>) {
    let m = old.len();
    let n = new.len();
    let width = n + 1;
    let mut lcs = vec![0u32; (m + 1) * width];
    for i in (0..m).rev() {
        for j in (0..n).rev() {
            lcs[i * width + j] = if old[i] == new[j] {
                lcs[(i + 1) * width + j + 1] + 1
            } else {
                lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
            };
        }
    }

    let mut i = 0usize;
    let mut j = 0usize;
    while i < m && j < n {
        if old[i] == new[j] {
            builder.push(DiffOp::Equal, &old[i]);
            i += 1;
            j += 1;
        } else if lcs[(i + 1) * width + j] >= lcs[i * width + j + 1] {
            builder.push(DiffOp::Delete, &old[i]);
            i += 1;
        } else {
            builder.push(DiffOp::Insert, &new[j]);
            j += 1;
        }
    }
    builder.extend(DiffOp::Delete, &old[i..]);
    builder.extend(DiffOp::Insert, &new[j..]);
}
