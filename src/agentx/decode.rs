//! AgentX payload decoding.
//!
//! Multi-byte fields follow the byte order the sender announced in the
//! header. Errors carry the offset from the start of the payload.

use bytes::Bytes;

use crate::error::{DecodeErrorKind, Error, Result};
use crate::handler::SearchRange;
use crate::oid::{MAX_OID_LEN, Oid};
use crate::value::Value;
use crate::varbind::VarBind;

use super::encode::{INTERNET_PREFIX, padding, value_type};

/// Cursor over one PDU payload.
pub struct Decoder {
    data: Bytes,
    pos: usize,
    big_endian: bool,
}

impl Decoder {
    /// Create a decoder over `data` in the given byte order.
    pub fn new(data: Bytes, big_endian: bool) -> Self {
        Self {
            data,
            pos: 0,
            big_endian,
        }
    }

    /// Current offset into the payload.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize) -> Result<&[u8]> {
        if self.remaining() < n {
            return Err(Error::decode(
                self.pos,
                DecodeErrorKind::InsufficientData {
                    needed: n,
                    available: self.remaining(),
                },
            ));
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.data[start..self.pos])
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let big_endian = self.big_endian;
        let b = self.take(2)?;
        let bytes = [b[0], b[1]];
        Ok(if big_endian {
            u16::from_be_bytes(bytes)
        } else {
            u16::from_le_bytes(bytes)
        })
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let big_endian = self.big_endian;
        let b = self.take(4)?;
        let bytes = [b[0], b[1], b[2], b[3]];
        Ok(if big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        })
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let big_endian = self.big_endian;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(self.take(8)?);
        Ok(if big_endian {
            u64::from_be_bytes(bytes)
        } else {
            u64::from_le_bytes(bytes)
        })
    }

    /// Skip `count` reserved bytes.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.take(count).map(|_| ())
    }

    /// Take everything left in the payload.
    pub fn read_rest(&mut self) -> Bytes {
        let rest = self.data.slice(self.pos..);
        self.pos = self.data.len();
        rest
    }

    /// Decode an octet string, consuming its padding.
    pub fn read_octet_string(&mut self) -> Result<Bytes> {
        let len = self.read_u32()? as usize;
        if len > self.remaining() {
            return Err(Error::decode(
                self.pos,
                DecodeErrorKind::InsufficientData {
                    needed: len,
                    available: self.remaining(),
                },
            ));
        }
        let value = self.data.slice(self.pos..self.pos + len);
        self.pos += len;
        self.skip(padding(len))?;
        Ok(value)
    }

    /// Decode an object identifier and its `include` bit.
    pub fn read_oid(&mut self) -> Result<(Oid, bool)> {
        let start = self.pos;
        let n_subid = self.read_u8()? as usize;
        let prefix = self.read_u8()?;
        let include = self.read_u8()? != 0;
        self.skip(1)?;

        let total = n_subid + if prefix != 0 { 5 } else { 0 };
        if total > MAX_OID_LEN {
            return Err(Error::decode(start, DecodeErrorKind::OidTooLong { count: total }));
        }

        let mut arcs = Vec::with_capacity(total);
        if prefix != 0 {
            arcs.extend_from_slice(&INTERNET_PREFIX);
            arcs.push(prefix as u32);
        }
        for _ in 0..n_subid {
            arcs.push(self.read_u32()?);
        }
        Ok((Oid::new(arcs), include))
    }

    /// Decode a search range. A null end OID means unbounded.
    pub fn read_search_range(&mut self) -> Result<SearchRange> {
        let (start, include) = self.read_oid()?;
        let (end, _) = self.read_oid()?;
        Ok(SearchRange::new(start, include, Some(end)))
    }

    /// Decode search ranges until the payload is used up.
    pub fn read_search_range_list(&mut self) -> Result<Vec<SearchRange>> {
        let mut ranges = Vec::new();
        while !self.is_empty() {
            ranges.push(self.read_search_range()?);
        }
        Ok(ranges)
    }

    /// Decode one varbind.
    pub fn read_varbind(&mut self) -> Result<VarBind> {
        let type_offset = self.pos;
        let ty = self.read_u16()?;
        self.skip(2)?;
        let (oid, _) = self.read_oid()?;

        let value = match ty {
            value_type::INTEGER => Value::Integer(self.read_u32()? as i32),
            value_type::OCTET_STRING => Value::OctetString(self.read_octet_string()?),
            value_type::NULL => Value::Null,
            value_type::OBJECT_IDENTIFIER => Value::ObjectIdentifier(self.read_oid()?.0),
            value_type::IP_ADDRESS => {
                let offset = self.pos;
                let data = self.read_octet_string()?;
                let octets: [u8; 4] = data.as_ref().try_into().map_err(|_| {
                    Error::decode(
                        offset,
                        DecodeErrorKind::InvalidIpAddressLength { length: data.len() },
                    )
                })?;
                Value::IpAddress(octets)
            }
            value_type::COUNTER32 => Value::Counter32(self.read_u32()?),
            value_type::GAUGE32 => Value::Gauge32(self.read_u32()?),
            value_type::TIMETICKS => Value::TimeTicks(self.read_u32()?),
            value_type::OPAQUE => Value::Opaque(self.read_octet_string()?),
            value_type::COUNTER64 => Value::Counter64(self.read_u64()?),
            value_type::NO_SUCH_OBJECT => Value::NoSuchObject,
            value_type::NO_SUCH_INSTANCE => Value::NoSuchInstance,
            value_type::END_OF_MIB_VIEW => Value::EndOfMibView,
            other => {
                return Err(Error::decode(
                    type_offset,
                    DecodeErrorKind::UnknownValueType(other),
                ));
            }
        };
        Ok(VarBind::new(oid, value))
    }

    /// Decode varbinds until the payload is used up.
    pub fn read_varbind_list(&mut self) -> Result<Vec<VarBind>> {
        let mut varbinds = Vec::new();
        while !self.is_empty() {
            varbinds.push(self.read_varbind()?);
        }
        Ok(varbinds)
    }

    /// Fail if any payload bytes are left.
    pub fn finish(&self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::decode(
                self.pos,
                DecodeErrorKind::TrailingData {
                    remaining: self.remaining(),
                },
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agentx::encode::EncodeBuf;
    use crate::oid;

    fn decoder(bytes: &[u8]) -> Decoder {
        Decoder::new(Bytes::copy_from_slice(bytes), true)
    }

    #[test]
    fn test_read_prefixed_oid() {
        let mut d = decoder(&[2, 2, 1, 0, 0, 0, 0, 1, 0, 0, 0, 15]);
        let (oid, include) = d.read_oid().unwrap();
        assert_eq!(oid, oid!(1, 3, 6, 1, 2, 1, 15));
        assert!(include);
        assert!(d.is_empty());
    }

    #[test]
    fn test_read_little_endian() {
        let mut d = Decoder::new(Bytes::from_static(&[1, 0, 0, 0, 2, 0]), false);
        assert_eq!(d.read_u32().unwrap(), 1);
        assert_eq!(d.read_u16().unwrap(), 2);
    }

    #[test]
    fn test_search_range_null_end_is_unbounded() {
        let mut buf = EncodeBuf::new();
        buf.push_oid(&oid!(1, 3, 6, 1, 2, 1, 15), false);
        buf.push_oid(&Oid::empty(), false);
        let mut d = Decoder::new(buf.finish(), true);
        let range = d.read_search_range().unwrap();
        assert_eq!(range, SearchRange::after(oid!(1, 3, 6, 1, 2, 1, 15)));
    }

    #[test]
    fn test_varbind_values_decode() {
        let varbinds = vec![
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 15, 1, 0), Value::from("4")),
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 15, 2, 0), Value::Integer(-3)),
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 15, 4, 0), Value::IpAddress([192, 168, 32, 79])),
            VarBind::new(oid!(1, 3, 6, 1, 4, 1, 1), Value::Counter64(1 << 40 | 7)),
            VarBind::new(oid!(1, 3, 6, 1, 4, 1, 2), Value::ObjectIdentifier(oid!(1, 3, 6, 1, 4))),
            VarBind::end_of_mib_view(oid!(1, 3, 6, 1, 2, 1, 15)),
        ];
        let mut buf = EncodeBuf::new();
        for vb in &varbinds {
            buf.push_varbind(vb);
        }
        let mut d = Decoder::new(buf.finish(), true);
        assert_eq!(d.read_varbind_list().unwrap(), varbinds);
    }

    #[test]
    fn test_counter64_little_endian() {
        let mut bytes = vec![70, 0, 0, 0, 0, 0, 0, 0];
        bytes.extend_from_slice(&0x0000_0100_0000_0007u64.to_le_bytes());
        let mut d = Decoder::new(Bytes::from(bytes), false);
        assert_eq!(d.read_varbind().unwrap().value, Value::Counter64(0x0000_0100_0000_0007));
    }

    #[test]
    fn test_truncated_input() {
        let mut d = decoder(&[2, 2, 1, 0, 0, 0, 0, 1]);
        let err = d.read_oid().unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                offset: 8,
                kind: DecodeErrorKind::InsufficientData { needed: 4, available: 0 }
            }
        ));
    }

    #[test]
    fn test_octet_string_length_overflow() {
        let mut d = decoder(&[0xff, 0xff, 0xff, 0xff, 1, 2]);
        assert!(d.read_octet_string().is_err());
    }

    #[test]
    fn test_bad_ip_address_length() {
        let mut bytes = vec![0, 64, 0, 0, 0, 0, 0, 0];
        bytes.extend_from_slice(&[0, 0, 0, 3, 1, 2, 3, 0]);
        let err = decoder(&bytes).read_varbind().unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                kind: DecodeErrorKind::InvalidIpAddressLength { length: 3 },
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_value_type() {
        let err = decoder(&[0, 99, 0, 0, 0, 0, 0, 0]).read_varbind().unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                offset: 0,
                kind: DecodeErrorKind::UnknownValueType(99)
            }
        ));
    }

    #[test]
    fn test_oid_too_long() {
        let mut d = decoder(&[200, 0, 0, 0]);
        assert!(matches!(
            d.read_oid(),
            Err(Error::Decode {
                kind: DecodeErrorKind::OidTooLong { count: 200 },
                ..
            })
        ));
    }

    #[test]
    fn test_finish_reports_trailing_bytes() {
        let mut d = decoder(&[0, 0, 0, 1, 9]);
        d.read_u32().unwrap();
        assert!(d.finish().is_err());
    }
}
