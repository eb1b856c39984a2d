//! BGP4-MIB (RFC 4273) layout.
//!
//! Lays parsed daemon records onto the fixed subset of `1.3.6.1.2.1.15` the
//! subagent serves:
//!
//! | Object                         | OID suffix    | Type        |
//! |--------------------------------|---------------|-------------|
//! | `bgpVersion.0`                 | `1.0`         | OctetString |
//! | `bgpLocalAs.0`                 | `2.0`         | Integer     |
//! | `bgpPeerState.A`               | `3.1.2.A`     | Integer     |
//! | `bgpPeerRemoteAddr.A`          | `3.1.7.A`     | IpAddress   |
//! | `bgpPeerRemoteAs.A`            | `3.1.9.A`     | Integer     |
//! | `bgpPeerFsmEstablishedTime.A`  | `3.1.16.A`    | Gauge32     |
//! | `bgpIdentifier.0`              | `4.0`         | IpAddress   |
//!
//! `A` is the peer's IPv4 address as four arcs.

use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};

use crate::bird::{BgpSession, RouterStatus};
use crate::handler::OidStore;
use crate::oid::Oid;
use crate::snapshot::Snapshot;
use crate::value::Value;

/// `bgp` subtree root, the registration point.
pub const BGP4_MIB: &[u32] = &[1, 3, 6, 1, 2, 1, 15];
/// `bgpVersion.0`
pub const BGP_VERSION: &[u32] = &[1, 3, 6, 1, 2, 1, 15, 1, 0];
/// `bgpLocalAs.0`
pub const BGP_LOCAL_AS: &[u32] = &[1, 3, 6, 1, 2, 1, 15, 2, 0];
/// `bgpPeerState` column.
pub const BGP_PEER_STATE: &[u32] = &[1, 3, 6, 1, 2, 1, 15, 3, 1, 2];
/// `bgpPeerRemoteAddr` column.
pub const BGP_PEER_REMOTE_ADDR: &[u32] = &[1, 3, 6, 1, 2, 1, 15, 3, 1, 7];
/// `bgpPeerRemoteAs` column.
pub const BGP_PEER_REMOTE_AS: &[u32] = &[1, 3, 6, 1, 2, 1, 15, 3, 1, 9];
/// `bgpPeerFsmEstablishedTime` column.
pub const BGP_PEER_FSM_ESTABLISHED_TIME: &[u32] = &[1, 3, 6, 1, 2, 1, 15, 3, 1, 16];
/// `bgpIdentifier.0`
pub const BGP_IDENTIFIER: &[u32] = &[1, 3, 6, 1, 2, 1, 15, 4, 0];

/// Value served for `bgpVersion.0`.
const VERSION: &str = "4";

/// The registered subtree as an [`Oid`].
pub fn subtree() -> Oid {
    Oid::from_slice(BGP4_MIB)
}

/// Map a daemon FSM state string to its `bgpPeerState` code.
///
/// `Established` 6, `Active` 3, `Connect` 2; everything else, including
/// `Idle`, `Down`, `Passive` and strings this table has never seen, is 1
/// (idle).
pub fn peer_state_code(state: &str) -> i32 {
    match state {
        "Established" => 6,
        "Active" => 3,
        "Connect" => 2,
        _ => 1,
    }
}

/// Build the store for one snapshot.
///
/// `sessions` should already be sorted by neighbor address. Peers without an
/// IPv4 neighbor address have no row index in this table and are skipped.
/// Never fails: every missing input has a zero value.
pub fn build_store(status: &RouterStatus, sessions: &[BgpSession], now: DateTime<Utc>) -> OidStore {
    let mut store = OidStore::new();

    *store.add(Oid::from_slice(BGP_VERSION)) = Value::from(VERSION);
    *store.add(Oid::from_slice(BGP_LOCAL_AS)) =
        Value::Integer(sessions.first().map_or(0, |s| as_integer(s.local_as)));

    let peers: Vec<(Ipv4Addr, &BgpSession)> = sessions
        .iter()
        .filter_map(|session| match session.ipv4_neighbor() {
            Some(addr) => Some((addr, session)),
            None => {
                tracing::debug!(
                    bird.protocol = %session.name,
                    bird.neighbor = ?session.neighbor_address,
                    "peer has no IPv4 neighbor address, not in bgpPeerTable"
                );
                None
            }
        })
        .collect();

    let state = Oid::from_slice(BGP_PEER_STATE);
    let remote_addr = Oid::from_slice(BGP_PEER_REMOTE_ADDR);
    let remote_as = Oid::from_slice(BGP_PEER_REMOTE_AS);
    let established = Oid::from_slice(BGP_PEER_FSM_ESTABLISHED_TIME);

    for (addr, session) in &peers {
        *store.add(state.with_ipv4_index(*addr)) = Value::Integer(peer_state_code(&session.state));
    }
    for (addr, _) in &peers {
        *store.add(remote_addr.with_ipv4_index(*addr)) = Value::from(*addr);
    }
    for (addr, session) in &peers {
        *store.add(remote_as.with_ipv4_index(*addr)) = Value::Integer(as_integer(session.neighbor_as));
    }
    for (addr, session) in &peers {
        *store.add(established.with_ipv4_index(*addr)) =
            Value::Gauge32(established_seconds(session, now));
    }

    *store.add(Oid::from_slice(BGP_IDENTIFIER)) =
        Value::from(status.router_id.unwrap_or(Ipv4Addr::UNSPECIFIED));

    store
}

/// Build a complete snapshot stamped with `now`.
pub fn build_snapshot(status: &RouterStatus, sessions: &[BgpSession], now: DateTime<Utc>) -> Snapshot {
    Snapshot::built_at(now, build_store(status, sessions, now))
}

/// Seconds the session has been up, 0 when down or when `since` is unknown.
fn established_seconds(session: &BgpSession, now: DateTime<Utc>) -> u32 {
    match (session.up, session.since) {
        (true, Some(since)) => {
            let secs = (now - since).num_seconds().max(0);
            u32::try_from(secs).unwrap_or(u32::MAX)
        }
        _ => 0,
    }
}

/// AS numbers above `i32::MAX` do not fit an SNMP Integer and read as 0.
fn as_integer(asn: u32) -> i32 {
    i32::try_from(asn).unwrap_or(0)
}
