//! SNMP value types served by the subagent.

use std::fmt;
use std::net::Ipv4Addr;

use bytes::Bytes;

use crate::oid::Oid;

/// A typed SNMP value.
///
/// Covers every varbind type AgentX can carry (RFC 2741 §5.4). The BGP4-MIB
/// subtree itself only serves `Integer`, `OctetString`, `IpAddress` and
/// `Gauge32`; the rest are needed to decode whatever the master sends.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// INTEGER (Integer32).
    Integer(i32),
    /// OCTET STRING.
    OctetString(Bytes),
    /// NULL.
    Null,
    /// OBJECT IDENTIFIER.
    ObjectIdentifier(Oid),
    /// IpAddress (4 octets, network order).
    IpAddress([u8; 4]),
    /// Counter32.
    Counter32(u32),
    /// Gauge32 / Unsigned32.
    Gauge32(u32),
    /// TimeTicks (hundredths of a second).
    TimeTicks(u32),
    /// Opaque.
    Opaque(Bytes),
    /// Counter64.
    Counter64(u64),
    /// The object is not present. Used as the "nothing here" sentinel.
    #[default]
    NoSuchObject,
    /// The object type exists but not this instance.
    NoSuchInstance,
    /// No successor in the requested range.
    EndOfMibView,
}

impl Value {
    /// True for the three exception values.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }

    /// Short type name as printed by net-snmp tools.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::OctetString(_) => "STRING",
            Value::Null => "NULL",
            Value::ObjectIdentifier(_) => "OID",
            Value::IpAddress(_) => "IpAddress",
            Value::Counter32(_) => "Counter32",
            Value::Gauge32(_) => "Gauge32",
            Value::TimeTicks(_) => "Timeticks",
            Value::Opaque(_) => "Opaque",
            Value::Counter64(_) => "Counter64",
            Value::NoSuchObject => "NoSuchObject",
            Value::NoSuchInstance => "NoSuchInstance",
            Value::EndOfMibView => "EndOfMibView",
        }
    }

    /// Returns the integer value if this is an `Integer`.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value of any unsigned 32-bit type.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<Ipv4Addr> for Value {
    fn from(addr: Ipv4Addr) -> Self {
        Value::IpAddress(addr.octets())
    }
}

impl From<&'static str> for Value {
    fn from(s: &'static str) -> Self {
        Value::OctetString(Bytes::from_static(s.as_bytes()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::OctetString(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
            Value::Null => write!(f, "NULL"),
            Value::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Value::IpAddress(o) => write!(f, "{}.{}.{}.{}", o[0], o[1], o[2], o[3]),
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => write!(f, "{}", v),
            Value::Opaque(bytes) => {
                for b in bytes.iter() {
                    write!(f, "{:02X}", b)?;
                }
                Ok(())
            }
            Value::Counter64(v) => write!(f, "{}", v),
            Value::NoSuchObject => write!(f, "noSuchObject"),
            Value::NoSuchInstance => write!(f, "noSuchInstance"),
            Value::EndOfMibView => write!(f, "endOfMibView"),
        }
    }
}
