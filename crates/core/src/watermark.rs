//! Consistency watermarks
//!
//! A [`Watermark`] maps a replica group id to the highest version the client
//! has observed from that group. The server must reach every listed version
//! before it answers a read, which is what gives a client read-your-writes
//! across transactions.
//!
//! Watermarks form a join-semilattice under [`Watermark::merge`]: merging takes
//! the per-key maximum, so it is commutative, associative and idempotent.
//!
//! [`SharedWatermark`] is the client-wide cell. Concurrent transactions fold
//! their observations into it under a mutex so no update is ever lost.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Replica group identifier
pub type GroupId = u32;

/// Per-group version lower bounds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watermark {
    versions: BTreeMap<GroupId, u64>,
}

impl Watermark {
    /// Create an empty watermark
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest version seen for `group`, if any
    pub fn get(&self, group: GroupId) -> Option<u64> {
        self.versions.get(&group).copied()
    }

    /// Number of groups tracked
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// True if no group has been observed yet
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Iterate `(group, version)` pairs in ascending group order
    pub fn iter(&self) -> impl Iterator<Item = (GroupId, u64)> + '_ {
        self.versions.iter().map(|(g, v)| (*g, *v))
    }

    /// Return a watermark with `group` raised to at least `version`.
    pub fn with(mut self, group: GroupId, version: u64) -> Self {
        self.raise(group, version);
        self
    }

    /// Join `self` with `other`, keeping the maximum version per group.
    ///
    /// Groups present only in `self` are kept unchanged. Neither input is
    /// modified.
    pub fn merge(&self, other: &Watermark) -> Watermark {
        let mut merged = self.clone();
        for (group, version) in other.iter() {
            merged.raise(group, version);
        }
        merged
    }

    /// True if every group in `other` is covered at or above its version here
    pub fn dominates(&self, other: &Watermark) -> bool {
        other
            .iter()
            .all(|(g, v)| self.get(g).map_or(false, |mine| mine >= v))
    }

    fn raise(&mut self, group: GroupId, version: u64) {
        let slot = self.versions.entry(group).or_insert(version);
        if *slot < version {
            *slot = version;
        }
    }
}

impl FromIterator<(GroupId, u64)> for Watermark {
    fn from_iter<I: IntoIterator<Item = (GroupId, u64)>>(iter: I) -> Self {
        let mut wm = Watermark::new();
        for (group, version) in iter {
            wm.raise(group, version);
        }
        wm
    }
}

// ============================================================================
// Client-wide watermark
// ============================================================================

/// Receiver of watermark observations
///
/// Transactions report every watermark they merge to a sink. The client
/// façade's [`SharedWatermark`] is the production sink.
pub trait WatermarkSink: Send + Sync {
    /// Fold `update` into the sink's state
    fn fold_in(&self, update: &Watermark);
}

/// Mutex-guarded watermark shared by every transaction of one client
///
/// Only [`read`](Self::read) and [`fold_in`](WatermarkSink::fold_in) are
/// exposed, so an update can never overwrite a concurrent one.
#[derive(Debug, Default)]
pub struct SharedWatermark {
    inner: Mutex<Watermark>,
}

impl SharedWatermark {
    /// Create an empty shared watermark
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current value
    pub fn read(&self) -> Watermark {
        self.inner.lock().clone()
    }
}

impl WatermarkSink for SharedWatermark {
    fn fold_in(&self, update: &Watermark) {
        if update.is_empty() {
            return;
        }
        let mut guard = self.inner.lock();
        *guard = guard.merge(update);
    }
}
