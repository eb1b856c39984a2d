//! MibHandler trait.

use crate::oid::Oid;
use crate::varbind::VarBind;

use super::SearchRange;

/// Handler for read-only SNMP MIB operations.
///
/// The AgentX session calls into a handler for every Get, GetNext and GetBulk
/// it receives. Answers come from memory, so the methods are synchronous.
///
/// # Sentinels
///
/// Neither method fails for "not found":
/// - [`get`](MibHandler::get) returns a [`Value::NoSuchObject`](crate::Value::NoSuchObject)
///   binding named by the requested OID;
/// - [`get_next`](MibHandler::get_next) returns a `NoSuchObject` binding named by
///   the range start when the range holds nothing. The AgentX layer turns that
///   into `endOfMibView` on the wire.
///
/// # Consistency
///
/// The batch methods (`get_many`, `get_next_many`, `get_bulk`) have default
/// implementations that call the single-OID methods in a loop. Handlers whose
/// data can change between calls override them so that every varbind of one
/// request is answered from the same data.
///
/// # Thread Safety
///
/// Handlers must be `Send + Sync` because queries may be served from several
/// tasks at once while a refresh is publishing new data.
pub trait MibHandler: Send + Sync + 'static {
    /// Handle a GET for a specific OID.
    fn get(&self, oid: &Oid) -> VarBind;

    /// Handle a GETNEXT for one search range.
    fn get_next(&self, range: &SearchRange) -> VarBind;

    /// Handle a GET with several OIDs.
    fn get_many(&self, oids: &[Oid]) -> Vec<VarBind> {
        oids.iter().map(|oid| self.get(oid)).collect()
    }

    /// Handle a GETNEXT with several search ranges.
    fn get_next_many(&self, ranges: &[SearchRange]) -> Vec<VarBind> {
        ranges.iter().map(|range| self.get_next(range)).collect()
    }

    /// Handle a GETBULK (RFC 2741 §7.2.3.3).
    ///
    /// The first `non_repeaters` ranges get a single GETNEXT each. The rest are
    /// walked up to `max_repetitions` times, row by row; the walk stops early
    /// once every repeater is exhausted.
    fn get_bulk(
        &self,
        ranges: &[SearchRange],
        non_repeaters: usize,
        max_repetitions: usize,
    ) -> Vec<VarBind> {
        bulk_walk(ranges, non_repeaters, max_repetitions, |range| {
            self.get_next(range)
        })
    }
}

/// GETBULK expansion over any GETNEXT function.
pub(crate) fn bulk_walk<F>(
    ranges: &[SearchRange],
    non_repeaters: usize,
    max_repetitions: usize,
    mut get_next: F,
) -> Vec<VarBind>
where
    F: FnMut(&SearchRange) -> VarBind,
{
    let split = non_repeaters.min(ranges.len());
    let (singles, repeaters) = ranges.split_at(split);

    let mut out: Vec<VarBind> = singles.iter().map(&mut get_next).collect();
    if repeaters.is_empty() {
        return out;
    }

    let mut cursors: Vec<SearchRange> = repeaters.to_vec();
    let mut exhausted = vec![false; repeaters.len()];

    for _ in 0..max_repetitions {
        for (idx, cursor) in cursors.iter_mut().enumerate() {
            if exhausted[idx] {
                out.push(VarBind::no_such_object(cursor.start.clone()));
                continue;
            }
            let vb = get_next(&*cursor);
            if vb.value.is_exception() {
                exhausted[idx] = true;
            } else {
                *cursor = SearchRange::new(vb.oid.clone(), false, cursor.end.clone());
            }
            out.push(vb);
        }
        if exhausted.iter().all(|e| *e) {
            break;
        }
    }

    out
}
