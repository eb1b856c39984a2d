//! AgentX payload encoding.
//!
//! Everything is written in network byte order; the header announces that
//! with the `NETWORK_BYTE_ORDER` flag. Unlike BER, AgentX fields carry no
//! nested lengths, so the buffer simply grows forward.

use bytes::{BufMut, Bytes, BytesMut};

use crate::handler::SearchRange;
use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::VarBind;

/// Internet prefix `1.3.6.1` that the OID `prefix` byte abbreviates.
pub(crate) const INTERNET_PREFIX: [u32; 4] = [1, 3, 6, 1];

/// Varbind type tags (RFC 2741 §5.4).
pub mod value_type {
    pub const INTEGER: u16 = 2;
    pub const OCTET_STRING: u16 = 4;
    pub const NULL: u16 = 5;
    pub const OBJECT_IDENTIFIER: u16 = 6;
    pub const IP_ADDRESS: u16 = 64;
    pub const COUNTER32: u16 = 65;
    pub const GAUGE32: u16 = 66;
    pub const TIMETICKS: u16 = 67;
    pub const OPAQUE: u16 = 68;
    pub const COUNTER64: u16 = 70;
    pub const NO_SUCH_OBJECT: u16 = 128;
    pub const NO_SUCH_INSTANCE: u16 = 129;
    pub const END_OF_MIB_VIEW: u16 = 130;
}

/// Growable buffer for one PDU payload.
pub struct EncodeBuf {
    buf: BytesMut,
}

impl EncodeBuf {
    /// Create a new encode buffer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create a new encode buffer with specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    pub fn push_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn push_u16(&mut self, value: u16) {
        self.buf.put_u16(value);
    }

    pub fn push_u32(&mut self, value: u32) {
        self.buf.put_u32(value);
    }

    pub fn push_u64(&mut self, value: u64) {
        self.buf.put_u64(value);
    }

    /// Push `count` zero bytes.
    pub fn push_reserved(&mut self, count: usize) {
        self.buf.put_bytes(0, count);
    }

    /// Encode an octet string: length, data, zero padding to a 4-byte boundary.
    pub fn push_octet_string(&mut self, data: &[u8]) {
        self.push_u32(data.len() as u32);
        self.buf.put_slice(data);
        self.push_reserved(padding(data.len()));
    }

    /// Encode an object identifier with its `include` bit.
    ///
    /// OIDs under `1.3.6.1.N` (0 < N < 256) use the prefix compression.
    pub fn push_oid(&mut self, oid: &Oid, include: bool) {
        let arcs = oid.arcs();
        let (prefix, rest) = match arcs {
            [a, b, c, d, n, rest @ ..]
                if [*a, *b, *c, *d] == INTERNET_PREFIX && (1..=255).contains(n) =>
            {
                (*n as u8, rest)
            }
            _ => (0, arcs),
        };

        self.push_u8(rest.len() as u8);
        self.push_u8(prefix);
        self.push_u8(include as u8);
        self.push_u8(0);
        for arc in rest {
            self.push_u32(*arc);
        }
    }

    /// Encode a search range: start (with include) then end.
    pub fn push_search_range(&mut self, range: &SearchRange) {
        self.push_oid(&range.start, range.include);
        match &range.end {
            Some(end) => self.push_oid(end, false),
            None => self.push_oid(&Oid::empty(), false),
        }
    }

    /// Encode one varbind.
    pub fn push_varbind(&mut self, vb: &VarBind) {
        self.push_u16(value_type_of(&vb.value));
        self.push_u16(0);
        self.push_oid(&vb.oid, false);

        match &vb.value {
            Value::Integer(v) => self.push_u32(*v as u32),
            Value::OctetString(data) | Value::Opaque(data) => self.push_octet_string(data),
            Value::ObjectIdentifier(oid) => self.push_oid(oid, false),
            Value::IpAddress(octets) => self.push_octet_string(octets),
            Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => self.push_u32(*v),
            Value::Counter64(v) => self.push_u64(*v),
            Value::Null | Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => {}
        }
    }

    /// Get the current length of encoded data.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Finish encoding and return the bytes.
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

impl Default for EncodeBuf {
    fn default() -> Self {
        Self::new()
    }
}

/// Bytes of padding after `len` bytes of octet-string data.
pub(crate) fn padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

/// Wire type tag for a value.
pub(crate) fn value_type_of(value: &Value) -> u16 {
    match value {
        Value::Integer(_) => value_type::INTEGER,
        Value::OctetString(_) => value_type::OCTET_STRING,
        Value::Null => value_type::NULL,
        Value::ObjectIdentifier(_) => value_type::OBJECT_IDENTIFIER,
        Value::IpAddress(_) => value_type::IP_ADDRESS,
        Value::Counter32(_) => value_type::COUNTER32,
        Value::Gauge32(_) => value_type::GAUGE32,
        Value::TimeTicks(_) => value_type::TIMETICKS,
        Value::Opaque(_) => value_type::OPAQUE,
        Value::Counter64(_) => value_type::COUNTER64,
        Value::NoSuchObject => value_type::NO_SUCH_OBJECT,
        Value::NoSuchInstance => value_type::NO_SUCH_INSTANCE,
        Value::EndOfMibView => value_type::END_OF_MIB_VIEW,
    }
}
