//! Handler over the published snapshot.

use std::sync::Arc;

use crate::oid::Oid;
use crate::snapshot::SnapshotCell;
use crate::varbind::VarBind;

use super::{MibHandler, SearchRange, bulk_walk};

/// Answers queries from whatever [`Snapshot`](crate::Snapshot) is current.
///
/// Construction needs a [`SnapshotCell`], and a cell cannot exist without an
/// initial snapshot, so there is no "not ready yet" state to handle.
#[derive(Debug, Clone)]
pub struct SnapshotHandler {
    cell: Arc<SnapshotCell>,
}

impl SnapshotHandler {
    /// Create a handler reading from `cell`.
    pub fn new(cell: Arc<SnapshotCell>) -> Self {
        Self { cell }
    }

    /// The shared cell this handler reads from.
    pub fn cell(&self) -> &Arc<SnapshotCell> {
        &self.cell
    }
}

impl MibHandler for SnapshotHandler {
    fn get(&self, oid: &Oid) -> VarBind {
        let snapshot = self.cell.load();
        VarBind::new(oid.clone(), snapshot.store.get(oid))
    }

    fn get_next(&self, range: &SearchRange) -> VarBind {
        self.cell.load().store.get_next(range)
    }

    fn get_many(&self, oids: &[Oid]) -> Vec<VarBind> {
        let snapshot = self.cell.load();
        oids.iter()
            .map(|oid| VarBind::new(oid.clone(), snapshot.store.get(oid)))
            .collect()
    }

    fn get_next_many(&self, ranges: &[SearchRange]) -> Vec<VarBind> {
        let snapshot = self.cell.load();
        ranges
            .iter()
            .map(|range| snapshot.store.get_next(range))
            .collect()
    }

    fn get_bulk(
        &self,
        ranges: &[SearchRange],
        non_repeaters: usize,
        max_repetitions: usize,
    ) -> Vec<VarBind> {
        let snapshot = self.cell.load();
        bulk_walk(ranges, non_repeaters, max_repetitions, |range| {
            snapshot.store.get_next(range)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::OidStore;
    use crate::oid;
    use crate::snapshot::Snapshot;
    use crate::value::Value;

    fn snapshot(value: i32) -> Snapshot {
        let store: OidStore = [
            (oid!(1, 3, 6, 1, 2, 1, 15, 2, 0), Value::Integer(value)),
            (oid!(1, 3, 6, 1, 2, 1, 15, 4, 0), Value::IpAddress([10, 0, 0, 1])),
        ]
        .into_iter()
        .collect();
        Snapshot::new(store)
    }

    #[test]
    fn test_reads_current_snapshot() {
        let cell = Arc::new(SnapshotCell::new(snapshot(1)));
        let handler = SnapshotHandler::new(cell.clone());

        let vb = handler.get(&oid!(1, 3, 6, 1, 2, 1, 15, 2, 0));
        assert_eq!(vb.value, Value::Integer(1));

        cell.publish(snapshot(2));
        let vb = handler.get(&oid!(1, 3, 6, 1, 2, 1, 15, 2, 0));
        assert_eq!(vb.value, Value::Integer(2));
    }

    #[test]
    fn test_missing_oid_is_sentinel() {
        let handler = SnapshotHandler::new(Arc::new(SnapshotCell::new(snapshot(1))));
        let vb = handler.get(&oid!(1, 3, 6, 1, 2, 1, 15, 9, 0));
        assert_eq!(vb, VarBind::no_such_object(oid!(1, 3, 6, 1, 2, 1, 15, 9, 0)));

        let vb = handler.get_next(&SearchRange::after(oid!(1, 3, 6, 1, 2, 1, 15, 4, 0)));
        assert_eq!(vb.value, Value::NoSuchObject);
    }

    #[test]
    fn test_walk_from_subtree_root() {
        let handler = SnapshotHandler::new(Arc::new(SnapshotCell::new(snapshot(7))));
        let out = handler.get_bulk(&[SearchRange::after(oid!(1, 3, 6, 1, 2, 1, 15))], 0, 10);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].value, Value::Integer(7));
        assert_eq!(out[1].value, Value::IpAddress([10, 0, 0, 1]));
        assert!(out[2].is_exception());
    }
}
