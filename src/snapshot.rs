//! Immutable MIB snapshots and the cell that publishes them.
//!
//! A [`Snapshot`] is built off to the side by a refresh cycle and never
//! mutated afterwards. [`SnapshotCell`] holds the current one behind a
//! `parking_lot::RwLock<Arc<Snapshot>>`: readers hold the read lock only long
//! enough to clone the `Arc`, and a publish swaps the pointer under the write
//! lock. A reader therefore sees either the old snapshot or the new one in
//! full, never a mix.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::handler::OidStore;

/// One complete, immutable view of the MIB subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// When the refresh cycle that produced this snapshot finished.
    pub built_at: DateTime<Utc>,
    /// The OID-value pairs.
    pub store: OidStore,
}

impl Snapshot {
    /// Wrap a finished store, stamped with the current time.
    pub fn new(store: OidStore) -> Self {
        Self::built_at(Utc::now(), store)
    }

    /// Wrap a finished store with an explicit build time.
    pub fn built_at(built_at: DateTime<Utc>, store: OidStore) -> Self {
        Self { built_at, store }
    }
}

/// Holder of the currently published snapshot.
///
/// Shared as `Arc<SnapshotCell>` between the refresher (the only writer) and
/// every query handler.
#[derive(Debug)]
pub struct SnapshotCell {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotCell {
    /// Create a cell with its initial snapshot.
    pub fn new(initial: Snapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// Clone a reference to the current snapshot.
    ///
    /// The returned `Arc` keeps that snapshot alive for as long as the caller
    /// needs it, even if a newer one is published meanwhile.
    pub fn load(&self) -> Arc<Snapshot> {
        self.current.read().clone()
    }

    /// Replace the current snapshot, returning the previous one.
    pub fn publish(&self, next: Snapshot) -> Arc<Snapshot> {
        let next = Arc::new(next);
        let mut guard = self.current.write();
        std::mem::replace(&mut *guard, next)
    }
}
