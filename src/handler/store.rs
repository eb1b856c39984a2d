//! Ordered OID store backing every published snapshot.

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::VarBind;

use super::SearchRange;

/// Ordered mapping from OID to value with exact and successor lookup.
///
/// Entries live in a `BTreeMap`, so lookups are correct whatever order the
/// builder adds keys in, and GETNEXT is a single range query.
///
/// # Example
///
/// ```rust
/// use bird_bgp_agentx::handler::{OidStore, SearchRange};
/// use bird_bgp_agentx::{Value, oid};
///
/// let mut store = OidStore::new();
/// store.insert(oid!(1, 3, 6, 1, 2, 1, 15, 2, 0), Value::Integer(64846));
/// *store.add(oid!(1, 3, 6, 1, 2, 1, 15, 1, 0)) = Value::from("4");
///
/// let next = store.get_next(&SearchRange::after(oid!(1, 3, 6, 1, 2, 1, 15)));
/// assert_eq!(next.oid, oid!(1, 3, 6, 1, 2, 1, 15, 1, 0));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OidStore {
    entries: BTreeMap<Oid, Value>,
}

impl OidStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add a slot for `oid` and return a handle to fill its value.
    ///
    /// A new slot starts as [`Value::NoSuchObject`]. Adding an OID that is
    /// already present returns the existing slot, so keys stay unique.
    pub fn add(&mut self, oid: Oid) -> &mut Value {
        self.entries.entry(oid).or_default()
    }

    /// Insert an OID-value pair, replacing any previous value.
    pub fn insert(&mut self, oid: Oid, value: Value) {
        self.entries.insert(oid, value);
    }

    /// Exact-match lookup.
    ///
    /// Returns [`Value::NoSuchObject`] when the OID is absent; absence is not an error.
    pub fn get(&self, oid: &Oid) -> Value {
        self.entries
            .get(oid)
            .cloned()
            .unwrap_or(Value::NoSuchObject)
    }

    /// Smallest entry inside `range`.
    ///
    /// An entry qualifies if its OID is greater than `range.start` (or equal,
    /// when `range.include` is set) and, if `range.end` is present, strictly
    /// less than it. Returns a `NoSuchObject` binding named by the start OID
    /// when nothing qualifies.
    pub fn get_next(&self, range: &SearchRange) -> VarBind {
        let lower = if range.include {
            Bound::Included(&range.start)
        } else {
            Bound::Excluded(&range.start)
        };

        self.entries
            .range::<Oid, _>((lower, Bound::Unbounded))
            .next()
            .filter(|(oid, _)| range.end.as_ref().is_none_or(|end| *oid < end))
            .map(|(oid, value)| VarBind::new(oid.clone(), value.clone()))
            .unwrap_or_else(|| VarBind::no_such_object(range.start.clone()))
    }

    /// Iterate over the entries under `prefix` in lexicographic order.
    pub fn walk<'a>(&'a self, prefix: &'a Oid) -> impl Iterator<Item = (&'a Oid, &'a Value)> + 'a {
        self.entries
            .range::<Oid, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(oid, _)| oid.starts_with(prefix))
    }

    /// Get the number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all OID-value pairs in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&Oid, &Value)> {
        self.entries.iter()
    }
}

impl FromIterator<(Oid, Value)> for OidStore {
    fn from_iter<I: IntoIterator<Item = (Oid, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use proptest::prelude::*;

    fn sample() -> OidStore {
        let mut store = OidStore::new();
        // deliberately out of order
        store.insert(oid!(1, 3, 6, 1, 3), Value::Integer(150));
        store.insert(oid!(1, 3, 6, 1, 1), Value::Integer(50));
        store.insert(oid!(1, 3, 6, 1, 2), Value::Integer(100));
        store
    }

    #[test]
    fn test_store_insert_and_get() {
        let store = sample();

        assert_eq!(store.get(&oid!(1, 3, 6, 1, 1)), Value::Integer(50));
        assert_eq!(store.get(&oid!(1, 3, 6, 1, 2)), Value::Integer(100));
        assert_eq!(store.get(&oid!(1, 3, 6, 1, 3)), Value::Integer(150));
        assert_eq!(store.get(&oid!(1, 3, 6, 1, 4)), Value::NoSuchObject);
        // prefix of a key is not the key
        assert_eq!(store.get(&oid!(1, 3, 6, 1)), Value::NoSuchObject);
    }

    #[test]
    fn test_store_add_handle() {
        let mut store = OidStore::new();
        *store.add(oid!(1, 3, 6, 1, 1)) = Value::Gauge32(7);
        assert_eq!(store.get(&oid!(1, 3, 6, 1, 1)), Value::Gauge32(7));

        // re-adding returns the same slot
        let slot = store.add(oid!(1, 3, 6, 1, 1));
        assert_eq!(*slot, Value::Gauge32(7));
        *slot = Value::Gauge32(8);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&oid!(1, 3, 6, 1, 1)), Value::Gauge32(8));
    }

    #[test]
    fn test_store_get_next() {
        let store = sample();

        // Before first
        let next = store.get_next(&SearchRange::after(oid!(1, 3, 6, 1, 0)));
        assert_eq!(next.oid, oid!(1, 3, 6, 1, 1));

        // Exact match returns next
        let next = store.get_next(&SearchRange::after(oid!(1, 3, 6, 1, 1)));
        assert_eq!(next.oid, oid!(1, 3, 6, 1, 2));
        assert_eq!(next.value, Value::Integer(100));

        // Between entries
        let next = store.get_next(&SearchRange::after(oid!(1, 3, 6, 1, 1, 5)));
        assert_eq!(next.oid, oid!(1, 3, 6, 1, 2));

        // After last
        let next = store.get_next(&SearchRange::after(oid!(1, 3, 6, 1, 3)));
        assert_eq!(next, VarBind::no_such_object(oid!(1, 3, 6, 1, 3)));
    }

    #[test]
    fn test_store_get_next_include() {
        let store = sample();
        let range = SearchRange::new(oid!(1, 3, 6, 1, 2), true, None);
        assert_eq!(store.get_next(&range).oid, oid!(1, 3, 6, 1, 2));

        let range = SearchRange::new(oid!(1, 3, 6, 1, 2), false, None);
        assert_eq!(store.get_next(&range).oid, oid!(1, 3, 6, 1, 3));
    }

    #[test]
    fn test_store_get_next_upper_bound() {
        let store = sample();

        // end is exclusive
        let range = SearchRange::new(oid!(1, 3, 6, 1, 1), false, Some(oid!(1, 3, 6, 1, 2)));
        assert_eq!(store.get_next(&range).value, Value::NoSuchObject);

        let range = SearchRange::new(oid!(1, 3, 6, 1, 1), false, Some(oid!(1, 3, 6, 1, 2, 0)));
        assert_eq!(store.get_next(&range).oid, oid!(1, 3, 6, 1, 2));

        // inverted range yields nothing instead of panicking
        let range = SearchRange::new(oid!(1, 3, 6, 1, 3), true, Some(oid!(1, 3, 6, 1, 1)));
        assert_eq!(store.get_next(&range).value, Value::NoSuchObject);
    }

    #[test]
    fn test_store_walk_prefix() {
        let mut store = sample();
        store.insert(oid!(1, 3, 6, 2), Value::Integer(1));
        store.insert(oid!(1, 3, 6), Value::Integer(0));

        let walked: Vec<_> = store.walk(&oid!(1, 3, 6, 1)).map(|(o, _)| o.clone()).collect();
        assert_eq!(
            walked,
            vec![oid!(1, 3, 6, 1, 1), oid!(1, 3, 6, 1, 2), oid!(1, 3, 6, 1, 3)]
        );
    }

    #[test]
    fn test_store_empty() {
        let store = OidStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert_eq!(
            store.get_next(&SearchRange::after(oid!(1, 3, 6, 1))).value,
            Value::NoSuchObject
        );
    }

    fn arb_oid() -> impl Strategy<Value = Oid> {
        prop::collection::vec(0u32..6, 1..6).prop_map(Oid::new)
    }

    proptest! {
        #[test]
        fn prop_get_next_walks_keys_in_order(keys in prop::collection::btree_set(arb_oid(), 1..40)) {
            let store: OidStore = keys.iter().cloned().map(|k| (k, Value::Null)).collect();
            let sorted: Vec<Oid> = keys.into_iter().collect();

            for pair in sorted.windows(2) {
                let next = store.get_next(&SearchRange::after(pair[0].clone()));
                prop_assert_eq!(&next.oid, &pair[1]);
            }
            let last = sorted.last().cloned().unwrap();
            prop_assert_eq!(store.get_next(&SearchRange::after(last)).value, Value::NoSuchObject);
        }

        #[test]
        fn prop_get_next_is_strict_successor(
            keys in prop::collection::btree_set(arb_oid(), 0..30),
            probe in arb_oid(),
        ) {
            let store: OidStore = keys.iter().cloned().map(|k| (k, Value::Null)).collect();
            let expected = keys.iter().find(|k| **k > probe).cloned();
            let next = store.get_next(&SearchRange::after(probe.clone()));
            match expected {
                Some(k) => prop_assert_eq!(next.oid, k),
                None => prop_assert_eq!(next, VarBind::no_such_object(probe)),
            }
        }
    }
}
