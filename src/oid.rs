//! Object Identifier (OID) type.
//!
//! OIDs are stored as a small vector of `u32` arcs. Ordering is the SNMP
//! lexicographic order: arcs are compared one by one as unsigned integers,
//! the first difference decides, and a strict prefix sorts before every OID
//! that extends it (`1.3.6.1.2` < `1.3.6.1.2.1` < `1.3.6.1.3`).

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::error::{Error, OidErrorKind, Result};

/// Maximum number of arcs accepted by [`Oid::parse`] and the AgentX decoder.
///
/// RFC 2741 encodes the arc count in a single octet.
pub const MAX_OID_LEN: usize = 128;

/// Object Identifier.
///
/// Immutable once built; derived operations such as [`child`](Oid::child)
/// return new values.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// Create an OID from an owned arc vector.
    pub fn new(arcs: impl IntoIterator<Item = u32>) -> Self {
        Self {
            arcs: arcs.into_iter().collect(),
        }
    }

    /// Create an OID from a slice of arcs.
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// The empty OID (zero arcs). AgentX uses it as the "no upper bound" marker.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse dotted notation, e.g. `"1.3.6.1.2.1.15"`. A leading dot is accepted.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim().strip_prefix('.').unwrap_or(s.trim());
        if trimmed.is_empty() {
            return Err(Error::invalid_oid_with_input(OidErrorKind::Empty, s));
        }

        let mut arcs = SmallVec::new();
        for part in trimmed.split('.') {
            let arc = part
                .parse::<u32>()
                .map_err(|_| Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s))?;
            arcs.push(arc);
        }

        if arcs.len() > MAX_OID_LEN {
            return Err(Error::invalid_oid_with_input(
                OidErrorKind::TooManyArcs {
                    count: arcs.len(),
                    max: MAX_OID_LEN,
                },
                s,
            ));
        }

        Ok(Self { arcs })
    }

    /// The arcs of this OID.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// True for the zero-arc OID.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// True if `prefix` is a (non-strict) prefix of this OID.
    pub fn starts_with(&self, prefix: &Oid) -> bool {
        self.arcs.starts_with(&prefix.arcs)
    }

    /// Return a new OID with `arc` appended.
    pub fn child(&self, arc: u32) -> Self {
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Self { arcs }
    }

    /// Return a new OID with all of `suffix` appended.
    pub fn extend(&self, suffix: &[u32]) -> Self {
        let mut arcs = self.arcs.clone();
        arcs.extend_from_slice(suffix);
        Self { arcs }
    }

    /// Return a new OID with the four octets of `addr` appended, the index
    /// encoding used by IpAddress-keyed MIB tables.
    pub fn with_ipv4_index(&self, addr: Ipv4Addr) -> Self {
        let octets = addr.octets().map(u32::from);
        self.extend(&octets)
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.arcs {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_slice(arcs)
    }
}

/// Build an [`Oid`] from literal arcs.
///
/// ```rust
/// use bird_bgp_agentx::oid;
///
/// let bgp = oid!(1, 3, 6, 1, 2, 1, 15);
/// assert_eq!(bgp.to_string(), "1.3.6.1.2.1.15");
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),*])
    };
}
