//! AgentX PDU header (RFC 2741 §6.1).
//!
//! ```text
//! | version | type | flags | reserved |
//! |              sessionID            |
//! |            transactionID          |
//! |              packetID             |
//! |            payload_length         |
//! ```
//!
//! The four 32-bit fields use the byte order announced by the
//! `NETWORK_BYTE_ORDER` flag.

use std::fmt;

use crate::error::{DecodeErrorKind, Error, Result};

/// Header length in bytes.
pub const HEADER_LEN: usize = 20;

/// Protocol version carried in every header.
pub const VERSION: u8 = 1;

/// Largest payload accepted from the master.
pub const MAX_PAYLOAD_LEN: usize = 1 << 20;

/// Header flag bits.
pub mod flags {
    pub const INSTANCE_REGISTRATION: u8 = 0x01;
    pub const NEW_INDEX: u8 = 0x02;
    pub const ANY_INDEX: u8 = 0x04;
    pub const NON_DEFAULT_CONTEXT: u8 = 0x08;
    pub const NETWORK_BYTE_ORDER: u8 = 0x10;
}

/// AgentX PDU types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PduType {
    Open = 1,
    Close = 2,
    Register = 3,
    Unregister = 4,
    Get = 5,
    GetNext = 6,
    GetBulk = 7,
    TestSet = 8,
    CommitSet = 9,
    UndoSet = 10,
    CleanupSet = 11,
    Notify = 12,
    Ping = 13,
    IndexAllocate = 14,
    IndexDeallocate = 15,
    AddAgentCaps = 16,
    RemoveAgentCaps = 17,
    Response = 18,
}

impl PduType {
    /// Decode a PDU type octet.
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            1 => Self::Open,
            2 => Self::Close,
            3 => Self::Register,
            4 => Self::Unregister,
            5 => Self::Get,
            6 => Self::GetNext,
            7 => Self::GetBulk,
            8 => Self::TestSet,
            9 => Self::CommitSet,
            10 => Self::UndoSet,
            11 => Self::CleanupSet,
            12 => Self::Notify,
            13 => Self::Ping,
            14 => Self::IndexAllocate,
            15 => Self::IndexDeallocate,
            16 => Self::AddAgentCaps,
            17 => Self::RemoveAgentCaps,
            18 => Self::Response,
            _ => return None,
        })
    }

    /// True for PDU types that may carry a context when
    /// `NON_DEFAULT_CONTEXT` is set.
    pub fn allows_context(self) -> bool {
        !matches!(
            self,
            Self::Open
                | Self::Close
                | Self::Response
                | Self::CommitSet
                | Self::UndoSet
                | Self::CleanupSet
        )
    }
}

impl fmt::Display for PduType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "Open",
            Self::Close => "Close",
            Self::Register => "Register",
            Self::Unregister => "Unregister",
            Self::Get => "Get",
            Self::GetNext => "GetNext",
            Self::GetBulk => "GetBulk",
            Self::TestSet => "TestSet",
            Self::CommitSet => "CommitSet",
            Self::UndoSet => "UndoSet",
            Self::CleanupSet => "CleanupSet",
            Self::Notify => "Notify",
            Self::Ping => "Ping",
            Self::IndexAllocate => "IndexAllocate",
            Self::IndexDeallocate => "IndexDeallocate",
            Self::AddAgentCaps => "AddAgentCaps",
            Self::RemoveAgentCaps => "RemoveAgentCaps",
            Self::Response => "Response",
        };
        write!(f, "{}-PDU", name)
    }
}

/// Decoded PDU header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub pdu_type: PduType,
    pub flags: u8,
    pub session_id: u32,
    pub transaction_id: u32,
    pub packet_id: u32,
    pub payload_len: u32,
}

impl Header {
    /// Header for a new outgoing PDU. `payload_len` is filled in on encode.
    pub fn new(pdu_type: PduType, session_id: u32, transaction_id: u32, packet_id: u32) -> Self {
        Self {
            pdu_type,
            flags: 0,
            session_id,
            transaction_id,
            packet_id,
            payload_len: 0,
        }
    }

    /// Header of the Response to this PDU.
    pub fn response(&self) -> Self {
        Self::new(
            PduType::Response,
            self.session_id,
            self.transaction_id,
            self.packet_id,
        )
    }

    /// True if the multi-byte fields are big-endian.
    pub fn is_network_byte_order(&self) -> bool {
        self.flags & flags::NETWORK_BYTE_ORDER != 0
    }

    /// True if a context octet string precedes the PDU body.
    pub fn has_context(&self) -> bool {
        self.flags & flags::NON_DEFAULT_CONTEXT != 0 && self.pdu_type.allows_context()
    }

    /// Decode the first [`HEADER_LEN`] bytes of `buf`.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_LEN {
            return Err(Error::decode(
                0,
                DecodeErrorKind::InsufficientData {
                    needed: HEADER_LEN,
                    available: buf.len(),
                },
            ));
        }
        if buf[0] != VERSION {
            return Err(Error::decode(0, DecodeErrorKind::UnsupportedVersion(buf[0])));
        }
        let pdu_type = PduType::from_u8(buf[1])
            .ok_or_else(|| Error::decode(1, DecodeErrorKind::UnknownPduType(buf[1])))?;
        let flag_bits = buf[2];

        let word = |at: usize| {
            let bytes = [buf[at], buf[at + 1], buf[at + 2], buf[at + 3]];
            if flag_bits & flags::NETWORK_BYTE_ORDER != 0 {
                u32::from_be_bytes(bytes)
            } else {
                u32::from_le_bytes(bytes)
            }
        };

        let header = Self {
            pdu_type,
            flags: flag_bits,
            session_id: word(4),
            transaction_id: word(8),
            packet_id: word(12),
            payload_len: word(16),
        };

        let len = header.payload_len as usize;
        if len > MAX_PAYLOAD_LEN {
            return Err(Error::decode(
                16,
                DecodeErrorKind::PayloadTooLarge {
                    length: len,
                    max: MAX_PAYLOAD_LEN,
                },
            ));
        }
        Ok(header)
    }

    /// Encode in network byte order with the given payload length.
    pub fn encode(&self, payload_len: u32) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0] = VERSION;
        out[1] = self.pdu_type as u8;
        out[2] = self.flags | flags::NETWORK_BYTE_ORDER;
        out[4..8].copy_from_slice(&self.session_id.to_be_bytes());
        out[8..12].copy_from_slice(&self.transaction_id.to_be_bytes());
        out[12..16].copy_from_slice(&self.packet_id.to_be_bytes());
        out[16..20].copy_from_slice(&payload_len.to_be_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_network_order() {
        let header = Header::new(PduType::Open, 0, 0, 7);
        let bytes = header.encode(24);
        assert_eq!(
            bytes,
            [1, 1, 0x10, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 7, 0, 0, 0, 24]
        );
        let decoded = Header::decode(&bytes).unwrap();
        assert_eq!(decoded.packet_id, 7);
        assert_eq!(decoded.payload_len, 24);
        assert!(decoded.is_network_byte_order());
    }

    #[test]
    fn test_decode_little_endian() {
        let bytes = [1, 5, 0, 0, 9, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 16, 0, 0, 0];
        let header = Header::decode(&bytes).unwrap();
        assert_eq!(header.pdu_type, PduType::Get);
        assert_eq!(header.session_id, 9);
        assert_eq!(header.transaction_id, 2);
        assert_eq!(header.packet_id, 3);
        assert_eq!(header.payload_len, 16);
        assert!(!header.is_network_byte_order());
    }

    #[test]
    fn test_decode_rejects_bad_header() {
        let mut bytes = Header::new(PduType::Get, 1, 1, 1).encode(0);
        bytes[0] = 2;
        assert!(matches!(
            Header::decode(&bytes),
            Err(Error::Decode {
                kind: DecodeErrorKind::UnsupportedVersion(2),
                ..
            })
        ));

        let mut bytes = Header::new(PduType::Get, 1, 1, 1).encode(0);
        bytes[1] = 99;
        assert!(matches!(
            Header::decode(&bytes),
            Err(Error::Decode {
                kind: DecodeErrorKind::UnknownPduType(99),
                ..
            })
        ));

        let bytes = Header::new(PduType::Get, 1, 1, 1).encode(u32::MAX);
        assert!(matches!(
            Header::decode(&bytes),
            Err(Error::Decode {
                kind: DecodeErrorKind::PayloadTooLarge { .. },
                ..
            })
        ));

        assert!(Header::decode(&[1, 5, 0]).is_err());
    }

    #[test]
    fn test_response_copies_ids() {
        let request = Header::new(PduType::GetNext, 4, 5, 6);
        let response = request.response();
        assert_eq!(response.pdu_type, PduType::Response);
        assert_eq!(
            (response.session_id, response.transaction_id, response.packet_id),
            (4, 5, 6)
        );
    }

    #[test]
    fn test_context_only_where_allowed() {
        let mut header = Header::new(PduType::Get, 1, 1, 1);
        header.flags = flags::NON_DEFAULT_CONTEXT;
        assert!(header.has_context());
        header.pdu_type = PduType::CommitSet;
        assert!(!header.has_context());
    }

    #[test]
    fn test_pdu_type_display() {
        assert_eq!(PduType::GetBulk.to_string(), "GetBulk-PDU");
        assert_eq!(PduType::from_u8(18), Some(PduType::Response));
        assert_eq!(PduType::from_u8(0), None);
    }
}
