#![forbid(unsafe_code)]

//! Diff runs and replay helpers.
//!
//! A [`DiffRun`] is a maximal span of keys sharing one [`DiffOp`]. A run list
//! is ordered so that it can be replayed left to right against the old
//! sequence with a single cursor:
//!
//! ```text
//! old:  [a, b, c]          runs: Equal[a] Delete[b] Insert[x, y] Equal[c]
//!
//! cursor=0  Equal[a]      -> cursor=1
//! cursor=1  Delete[b]     -> [a, c]            (cursor stays)
//! cursor=1  Insert[x, y]  -> [a, x, y, c]      cursor=3
//! cursor=3  Equal[c]      -> cursor=4
//! ```
//!
//! # Invariants
//!
//! 1. Equal + Insert keys, concatenated in run order, reconstruct `new`.
//! 2. Equal + Delete keys, concatenated in run order, reconstruct `old`.
//! 3. No run is empty and no two adjacent runs share an op.

use std::fmt;

/// The edit kind of a [`DiffRun`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffOp {
    /// Keys present at this point in both sequences.
    Equal,
    /// Keys present only in the new sequence.
    Insert,
    /// Keys present only in the old sequence.
    Delete,
}

impl fmt::Display for DiffOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Equal => "equal",
            Self::Insert => "insert",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// A maximal contiguous run of keys sharing one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRun<K> {
    /// The operation shared by every key in the run.
    pub op: DiffOp,
    /// The keys, in sequence order.
    pub keys: Vec<K>,
}

impl<K> DiffRun<K> {
    /// Create a run.
    #[must_use]
    pub fn new(op: DiffOp, keys: Vec<K>) -> Self {
        Self { op, keys }
    }

    /// Number of keys in the run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the run holds no keys. Runs produced by [`crate::diff`] never do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Key counts per operation over a run list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub equal: usize,
    pub inserted: usize,
    pub deleted: usize,
}

impl DiffStats {
    /// Tally a run list.
    #[must_use]
    pub fn from_runs<K>(runs: &[DiffRun<K>]) -> Self {
        runs.iter().fold(Self::default(), |mut stats, run| {
            match run.op {
                DiffOp::Equal => stats.equal += run.len(),
                DiffOp::Insert => stats.inserted += run.len(),
                DiffOp::Delete => stats.deleted += run.len(),
            }
            stats
        })
    }

    /// Number of structural edits (inserts plus deletes).
    #[must_use]
    pub fn edits(&self) -> usize {
        self.inserted + self.deleted
    }
}

/// Returns true when the run list describes no edit at all.
#[must_use]
pub fn is_identity<K>(runs: &[DiffRun<K>]) -> bool {
    runs.iter().all(|run| run.op == DiffOp::Equal)
}

/// Replay `runs` against `old` with a single cursor and return the result.
///
/// Returns `None` if the runs do not fit `old`: a Delete or Equal run names a
/// key that is not at the cursor, or runs out past the end.
#[must_use]
pub fn apply<K: PartialEq + Clone>(old: &[K], runs: &[DiffRun<K>]) -> Option<Vec<K>> {
    let mut out = old.to_vec();
    let mut cursor = 0usize;
    for run in runs {
        match run.op {
            DiffOp::Delete => {
                for key in &run.keys {
                    if out.get(cursor) != Some(key) {
                        return None;
                    }
                    out.remove(cursor);
                }
            }
            DiffOp::Insert => {
                for key in &run.keys {
                    out.insert(cursor, key.clone());
                    cursor += 1;
                }
            }
            DiffOp::Equal => {
                let end = cursor + run.len();
                if out.get(cursor..end)? != run.keys.as_slice() {
                    return None;
                }
                cursor = end;
            }
        }
    }
    (cursor == out.len()).then_some(out)
}
