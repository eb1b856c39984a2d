//! Typed records parsed from the daemon's text output.

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};

use chrono::{DateTime, Utc};

/// Router-wide facts from `show status`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterStatus {
    /// The router ID, if the daemon reported a parsable one.
    pub router_id: Option<Ipv4Addr>,
    /// Hostname; empty when absent.
    pub hostname: String,
}

/// Route counters of one channel (address family) of a BGP session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    pub imported: u32,
    pub exported: u32,
    pub preferred: u32,
}

/// One BGP protocol instance from `show protocols all`.
///
/// Every field keeps its zero value when the daemon omitted it or printed
/// something unparsable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BgpSession {
    /// Protocol instance name, e.g. `ber1_gw1`.
    pub name: String,
    /// Routing table, `None` when the daemon prints `---`.
    pub table: Option<String>,
    /// True when the protocol is `up`.
    pub up: bool,
    /// When the protocol last changed state.
    pub since: Option<DateTime<Utc>>,
    /// BGP FSM state as the daemon spells it (`Established`, `Active`, ...).
    pub state: String,
    pub neighbor_address: Option<IpAddr>,
    pub neighbor_as: u32,
    pub local_as: u32,
    /// Per-channel route counters keyed by channel name (`ipv4`, `ipv6`, ...).
    pub channels: BTreeMap<String, ChannelStats>,
}

impl BgpSession {
    /// The neighbor address when it is IPv4.
    pub fn ipv4_neighbor(&self) -> Option<Ipv4Addr> {
        match self.neighbor_address {
            Some(IpAddr::V4(addr)) => Some(addr),
            _ => None,
        }
    }

    /// Sort key: the neighbor address as a 16-byte number.
    ///
    /// IPv4 addresses are mapped into IPv6 space; a missing address is 0.
    pub fn address_key(&self) -> u128 {
        match self.neighbor_address {
            Some(IpAddr::V4(addr)) => u128::from(addr.to_ipv6_mapped()),
            Some(IpAddr::V6(addr)) => u128::from(addr),
            None => 0,
        }
    }
}
