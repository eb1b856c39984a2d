//! Search ranges for GETNEXT-style lookups.

use crate::oid::Oid;

/// A GETNEXT search range (RFC 2741 §5.2).
///
/// The range starts at `start` (inclusive when `include` is set) and ends
/// strictly before `end`. `end == None` means no upper bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRange {
    /// Lower bound.
    pub start: Oid,
    /// Whether `start` itself may be returned.
    pub include: bool,
    /// Exclusive upper bound, if any.
    pub end: Option<Oid>,
}

impl SearchRange {
    /// Create a range. An empty `end` OID is treated as unbounded.
    pub fn new(start: Oid, include: bool, end: Option<Oid>) -> Self {
        Self {
            start,
            include,
            end: end.filter(|e| !e.is_empty()),
        }
    }

    /// Plain GETNEXT: everything strictly after `start`.
    pub fn after(start: Oid) -> Self {
        Self {
            start,
            include: false,
            end: None,
        }
    }

    /// True if `oid` lies inside the range.
    pub fn contains(&self, oid: &Oid) -> bool {
        let above = if self.include {
            oid >= &self.start
        } else {
            oid > &self.start
        };
        above && self.end.as_ref().is_none_or(|end| oid < end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    #[test]
    fn test_contains() {
        let range = SearchRange::new(oid!(1, 3, 6, 1, 2), false, Some(oid!(1, 3, 6, 1, 3)));
        assert!(!range.contains(&oid!(1, 3, 6, 1, 2)));
        assert!(range.contains(&oid!(1, 3, 6, 1, 2, 0)));
        assert!(!range.contains(&oid!(1, 3, 6, 1, 3)));

        let range = SearchRange::new(oid!(1, 3, 6, 1, 2), true, None);
        assert!(range.contains(&oid!(1, 3, 6, 1, 2)));
        assert!(range.contains(&oid!(2)));
    }

    #[test]
    fn test_empty_end_is_unbounded() {
        let range = SearchRange::new(oid!(1, 3), false, Some(Oid::empty()));
        assert_eq!(range.end, None);
        assert!(range.contains(&oid!(1, 4)));
    }
}
