//! Common test fixtures and constants.

use std::net::Ipv4Addr;

use bird_bgp_agentx::{Oid, oid};
use chrono::{DateTime, TimeZone, Utc};

// =============================================================================
// Captured daemon output
// =============================================================================

/// `show status` text with reply codes already stripped.
pub const SHOW_STATUS: &str = include_str!("../data/show_status.txt");

/// `show protocols all` text with two BGP sessions among other protocols.
pub const SHOW_PROTOCOLS_ALL: &str = include_str!("../data/show_protocols_all.txt");

/// Established neighbor in the sample.
pub const PEER_UP: Ipv4Addr = Ipv4Addr::new(192, 168, 32, 1);
/// Active (not established) neighbor in the sample.
pub const PEER_ACTIVE: Ipv4Addr = Ipv4Addr::new(192, 168, 32, 253);
/// Router ID in the sample.
pub const ROUTER_ID: Ipv4Addr = Ipv4Addr::new(192, 168, 32, 79);
/// Local and neighbor AS of both sample sessions.
pub const SAMPLE_AS: i32 = 64846;

/// One day after the established session came up (as UTC).
pub fn sample_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 13, 20, 41, 14).unwrap()
}

/// Render plain reply text the way the daemon sends it on the wire.
///
/// The first line gets code `1000-`, the rest are continuations, and a
/// `0000` line terminates the reply.
pub fn coded(text: &str) -> String {
    let mut out = String::new();
    for (i, line) in text.lines().enumerate() {
        if i == 0 {
            out.push_str("1000-");
        } else {
            out.push(' ');
        }
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("0000 \n");
    out
}

// =============================================================================
// BGP4-MIB OIDs
// =============================================================================

/// Subtree root: 1.3.6.1.2.1.15
pub fn bgp() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 15)
}
pub fn bgp_version() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 15, 1, 0)
}
pub fn bgp_local_as() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 15, 2, 0)
}
pub fn bgp_identifier() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 15, 4, 0)
}
pub fn peer_state(addr: Ipv4Addr) -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 15, 3, 1, 2).with_ipv4_index(addr)
}
pub fn peer_remote_addr(addr: Ipv4Addr) -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 15, 3, 1, 7).with_ipv4_index(addr)
}
pub fn peer_remote_as(addr: Ipv4Addr) -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 15, 3, 1, 9).with_ipv4_index(addr)
}
pub fn peer_established_time(addr: Ipv4Addr) -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 15, 3, 1, 16).with_ipv4_index(addr)
}

/// OID outside the registered subtree.
pub fn nonexistent_oid() -> Oid {
    oid!(1, 3, 6, 1, 99, 99, 99, 0)
}

/// Every OID of the sample snapshot, in walk order.
pub fn sample_walk_order() -> Vec<Oid> {
    vec![
        bgp_version(),
        bgp_local_as(),
        peer_state(PEER_UP),
        peer_state(PEER_ACTIVE),
        peer_remote_addr(PEER_UP),
        peer_remote_addr(PEER_ACTIVE),
        peer_remote_as(PEER_UP),
        peer_remote_as(PEER_ACTIVE),
        peer_established_time(PEER_UP),
        peer_established_time(PEER_ACTIVE),
        bgp_identifier(),
    ]
}
