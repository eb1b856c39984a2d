//! BGP4-MIB object names.
//!
//! Display names for the objects this subagent serves. Not MIB support,
//! just a fixed table.

use crate::Oid;
use crate::mib;

/// Scalar objects, matched exactly.
static SCALARS: &[(&[u32], &str)] = &[
    (mib::BGP_VERSION, "bgpVersion.0"),
    (mib::BGP_LOCAL_AS, "bgpLocalAs.0"),
    (mib::BGP_IDENTIFIER, "bgpIdentifier.0"),
    (mib::BGP4_MIB, "bgp"),
    (&[1, 3, 6, 1, 2, 1, 15, 3], "bgpPeerTable"),
    (&[1, 3, 6, 1, 2, 1, 15, 3, 1], "bgpPeerEntry"),
];

/// Table columns, matched by prefix; the instance suffix is kept.
static COLUMNS: &[(&[u32], &str)] = &[
    (mib::BGP_PEER_STATE, "bgpPeerState"),
    (mib::BGP_PEER_REMOTE_ADDR, "bgpPeerRemoteAddr"),
    (mib::BGP_PEER_REMOTE_AS, "bgpPeerRemoteAs"),
    (mib::BGP_PEER_FSM_ESTABLISHED_TIME, "bgpPeerFsmEstablishedTime"),
];

/// Look up a display name for an OID.
///
/// Column instances come back as `bgpPeerState.10.0.0.1`.
pub fn lookup(oid: &Oid) -> Option<String> {
    let arcs = oid.arcs();
    if let Some((_, name)) = SCALARS.iter().find(|(pattern, _)| *pattern == arcs) {
        return Some((*name).to_owned());
    }
    COLUMNS.iter().find_map(|(column, name)| {
        let index = arcs.strip_prefix(*column)?;
        let mut out = (*name).to_owned();
        for arc in index {
            out.push('.');
            out.push_str(&arc.to_string());
        }
        Some(out)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    #[test]
    fn test_scalar() {
        assert_eq!(
            lookup(&oid!(1, 3, 6, 1, 2, 1, 15, 2, 0)).as_deref(),
            Some("bgpLocalAs.0")
        );
    }

    #[test]
    fn test_column_instance() {
        assert_eq!(
            lookup(&oid!(1, 3, 6, 1, 2, 1, 15, 3, 1, 16, 192, 168, 20, 12)).as_deref(),
            Some("bgpPeerFsmEstablishedTime.192.168.20.12")
        );
    }

    #[test]
    fn test_unknown() {
        assert_eq!(lookup(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)), None);
        // bgpPeerEntry column 1 is not served
        assert_eq!(lookup(&oid!(1, 3, 6, 1, 2, 1, 15, 3, 1, 1, 10, 0, 0, 1)), None);
    }
}
