//! AgentX PDUs (RFC 2741 §6.2).

use std::fmt;

use bytes::{Bytes, BytesMut};

use crate::error::Result;
use crate::handler::SearchRange;
use crate::oid::Oid;
use crate::varbind::VarBind;

use super::decode::Decoder;
use super::encode::EncodeBuf;
use super::header::{HEADER_LEN, Header, PduType, flags};

/// `res.error` values of a Response-PDU.
///
/// Codes below 256 are the SNMP error-status values; 256 and up are AgentX
/// administrative errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentxStatus {
    NoError,
    GenErr,
    NoAccess,
    WrongType,
    WrongLength,
    WrongEncoding,
    WrongValue,
    NoCreation,
    InconsistentValue,
    ResourceUnavailable,
    CommitFailed,
    UndoFailed,
    NotWritable,
    InconsistentName,
    OpenFailed,
    NotOpen,
    IndexWrongType,
    IndexAlreadyAllocated,
    IndexNoneAvailable,
    IndexNotAllocated,
    UnsupportedContext,
    DuplicateRegistration,
    UnknownRegistration,
    UnknownAgentCaps,
    ParseError,
    RequestDenied,
    ProcessingError,
    /// Any code not listed above.
    Other(u16),
}

impl AgentxStatus {
    pub fn from_u16(code: u16) -> Self {
        match code {
            0 => Self::NoError,
            5 => Self::GenErr,
            6 => Self::NoAccess,
            7 => Self::WrongType,
            8 => Self::WrongLength,
            9 => Self::WrongEncoding,
            10 => Self::WrongValue,
            11 => Self::NoCreation,
            12 => Self::InconsistentValue,
            13 => Self::ResourceUnavailable,
            14 => Self::CommitFailed,
            15 => Self::UndoFailed,
            17 => Self::NotWritable,
            18 => Self::InconsistentName,
            256 => Self::OpenFailed,
            257 => Self::NotOpen,
            258 => Self::IndexWrongType,
            259 => Self::IndexAlreadyAllocated,
            260 => Self::IndexNoneAvailable,
            261 => Self::IndexNotAllocated,
            262 => Self::UnsupportedContext,
            263 => Self::DuplicateRegistration,
            264 => Self::UnknownRegistration,
            265 => Self::UnknownAgentCaps,
            266 => Self::ParseError,
            267 => Self::RequestDenied,
            268 => Self::ProcessingError,
            other => Self::Other(other),
        }
    }

    pub fn as_u16(self) -> u16 {
        match self {
            Self::NoError => 0,
            Self::GenErr => 5,
            Self::NoAccess => 6,
            Self::WrongType => 7,
            Self::WrongLength => 8,
            Self::WrongEncoding => 9,
            Self::WrongValue => 10,
            Self::NoCreation => 11,
            Self::InconsistentValue => 12,
            Self::ResourceUnavailable => 13,
            Self::CommitFailed => 14,
            Self::UndoFailed => 15,
            Self::NotWritable => 17,
            Self::InconsistentName => 18,
            Self::OpenFailed => 256,
            Self::NotOpen => 257,
            Self::IndexWrongType => 258,
            Self::IndexAlreadyAllocated => 259,
            Self::IndexNoneAvailable => 260,
            Self::IndexNotAllocated => 261,
            Self::UnsupportedContext => 262,
            Self::DuplicateRegistration => 263,
            Self::UnknownRegistration => 264,
            Self::UnknownAgentCaps => 265,
            Self::ParseError => 266,
            Self::RequestDenied => 267,
            Self::ProcessingError => 268,
            Self::Other(code) => code,
        }
    }

    pub fn is_ok(self) -> bool {
        self == Self::NoError
    }
}

impl fmt::Display for AgentxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoError => "noAgentXError",
            Self::GenErr => "genErr",
            Self::NoAccess => "noAccess",
            Self::WrongType => "wrongType",
            Self::WrongLength => "wrongLength",
            Self::WrongEncoding => "wrongEncoding",
            Self::WrongValue => "wrongValue",
            Self::NoCreation => "noCreation",
            Self::InconsistentValue => "inconsistentValue",
            Self::ResourceUnavailable => "resourceUnavailable",
            Self::CommitFailed => "commitFailed",
            Self::UndoFailed => "undoFailed",
            Self::NotWritable => "notWritable",
            Self::InconsistentName => "inconsistentName",
            Self::OpenFailed => "openFailed",
            Self::NotOpen => "notOpen",
            Self::IndexWrongType => "indexWrongType",
            Self::IndexAlreadyAllocated => "indexAlreadyAllocated",
            Self::IndexNoneAvailable => "indexNoneAvailable",
            Self::IndexNotAllocated => "indexNotAllocated",
            Self::UnsupportedContext => "unsupportedContext",
            Self::DuplicateRegistration => "duplicateRegistration",
            Self::UnknownRegistration => "unknownRegistration",
            Self::UnknownAgentCaps => "unknownAgentCaps",
            Self::ParseError => "parseError",
            Self::RequestDenied => "requestDenied",
            Self::ProcessingError => "processingError",
            Self::Other(code) => return write!(f, "error({})", code),
        };
        write!(f, "{}", name)
    }
}

/// `reason` of a Close-PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    Other,
    ParseError,
    ProtocolError,
    Timeouts,
    Shutdown,
    ByManager,
}

impl CloseReason {
    /// Decode a reason octet; unknown values map to `Other`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            2 => Self::ParseError,
            3 => Self::ProtocolError,
            4 => Self::Timeouts,
            5 => Self::Shutdown,
            6 => Self::ByManager,
            _ => Self::Other,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Other => 1,
            Self::ParseError => 2,
            Self::ProtocolError => 3,
            Self::Timeouts => 4,
            Self::Shutdown => 5,
            Self::ByManager => 6,
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Other => "reasonOther",
            Self::ParseError => "reasonParseError",
            Self::ProtocolError => "reasonProtocolError",
            Self::Timeouts => "reasonTimeouts",
            Self::Shutdown => "reasonShutdown",
            Self::ByManager => "reasonByManager",
        };
        write!(f, "{}", name)
    }
}

/// A (sub)tree registration, shared by Register and Unregister.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub timeout: u8,
    pub priority: u8,
    pub range_subid: u8,
    pub subtree: Oid,
    pub upper_bound: Option<u32>,
}

impl Registration {
    /// Register a whole subtree (no range).
    pub fn subtree(subtree: Oid, priority: u8) -> Self {
        Self {
            timeout: 0,
            priority,
            range_subid: 0,
            subtree,
            upper_bound: None,
        }
    }
}

/// Decoded PDU body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pdu {
    Open {
        timeout: u8,
        id: Oid,
        description: Bytes,
    },
    Close {
        reason: CloseReason,
    },
    Register(Registration),
    Unregister(Registration),
    Get {
        oids: Vec<Oid>,
    },
    GetNext {
        ranges: Vec<SearchRange>,
    },
    GetBulk {
        non_repeaters: u16,
        max_repetitions: u16,
        ranges: Vec<SearchRange>,
    },
    TestSet {
        varbinds: Vec<VarBind>,
    },
    CommitSet,
    UndoSet,
    CleanupSet,
    Ping,
    Response {
        sys_uptime: u32,
        status: AgentxStatus,
        index: u16,
        varbinds: Vec<VarBind>,
    },
    /// A PDU type a subagent never has to understand, payload kept raw.
    Unsupported {
        pdu_type: PduType,
        payload: Bytes,
    },
}

impl Pdu {
    pub fn pdu_type(&self) -> PduType {
        match self {
            Self::Open { .. } => PduType::Open,
            Self::Close { .. } => PduType::Close,
            Self::Register(_) => PduType::Register,
            Self::Unregister(_) => PduType::Unregister,
            Self::Get { .. } => PduType::Get,
            Self::GetNext { .. } => PduType::GetNext,
            Self::GetBulk { .. } => PduType::GetBulk,
            Self::TestSet { .. } => PduType::TestSet,
            Self::CommitSet => PduType::CommitSet,
            Self::UndoSet => PduType::UndoSet,
            Self::CleanupSet => PduType::CleanupSet,
            Self::Ping => PduType::Ping,
            Self::Response { .. } => PduType::Response,
            Self::Unsupported { pdu_type, .. } => *pdu_type,
        }
    }

    /// A Response carrying `varbinds` and no error.
    pub fn response(varbinds: Vec<VarBind>, sys_uptime: u32) -> Self {
        Self::Response {
            sys_uptime,
            status: AgentxStatus::NoError,
            index: 0,
            varbinds,
        }
    }

    /// A Response reporting `status` for the varbind at 1-based `index`.
    pub fn error_response(status: AgentxStatus, index: u16, sys_uptime: u32) -> Self {
        Self::Response {
            sys_uptime,
            status,
            index,
            varbinds: Vec::new(),
        }
    }

    fn encode_body(&self, buf: &mut EncodeBuf) {
        match self {
            Self::Open {
                timeout,
                id,
                description,
            } => {
                buf.push_u8(*timeout);
                buf.push_reserved(3);
                buf.push_oid(id, false);
                buf.push_octet_string(description);
            }
            Self::Close { reason } => {
                buf.push_u8(reason.as_u8());
                buf.push_reserved(3);
            }
            Self::Register(reg) => {
                buf.push_u8(reg.timeout);
                encode_registration(buf, reg);
            }
            Self::Unregister(reg) => {
                buf.push_u8(0);
                encode_registration(buf, reg);
            }
            Self::Get { oids } => {
                for oid in oids {
                    buf.push_oid(oid, false);
                    buf.push_oid(&Oid::empty(), false);
                }
            }
            Self::GetNext { ranges } => {
                for range in ranges {
                    buf.push_search_range(range);
                }
            }
            Self::GetBulk {
                non_repeaters,
                max_repetitions,
                ranges,
            } => {
                buf.push_u16(*non_repeaters);
                buf.push_u16(*max_repetitions);
                for range in ranges {
                    buf.push_search_range(range);
                }
            }
            Self::TestSet { varbinds } => {
                for vb in varbinds {
                    buf.push_varbind(vb);
                }
            }
            Self::CommitSet | Self::UndoSet | Self::CleanupSet | Self::Ping => {}
            Self::Response {
                sys_uptime,
                status,
                index,
                varbinds,
            } => {
                buf.push_u32(*sys_uptime);
                buf.push_u16(status.as_u16());
                buf.push_u16(*index);
                for vb in varbinds {
                    buf.push_varbind(vb);
                }
            }
            Self::Unsupported { payload, .. } => {
                for b in payload.iter() {
                    buf.push_u8(*b);
                }
            }
        }
    }

    fn decode_body(pdu_type: PduType, d: &mut Decoder) -> Result<Self> {
        let pdu = match pdu_type {
            PduType::Open => {
                let timeout = d.read_u8()?;
                d.skip(3)?;
                let (id, _) = d.read_oid()?;
                let description = d.read_octet_string()?;
                Self::Open {
                    timeout,
                    id,
                    description,
                }
            }
            PduType::Close => {
                let reason = CloseReason::from_u8(d.read_u8()?);
                d.skip(3)?;
                Self::Close { reason }
            }
            PduType::Register => {
                let timeout = d.read_u8()?;
                let mut reg = decode_registration(d)?;
                reg.timeout = timeout;
                Self::Register(reg)
            }
            PduType::Unregister => {
                d.skip(1)?;
                Self::Unregister(decode_registration(d)?)
            }
            PduType::Get => Self::Get {
                oids: d
                    .read_search_range_list()?
                    .into_iter()
                    .map(|range| range.start)
                    .collect(),
            },
            PduType::GetNext => Self::GetNext {
                ranges: d.read_search_range_list()?,
            },
            PduType::GetBulk => {
                let non_repeaters = d.read_u16()?;
                let max_repetitions = d.read_u16()?;
                Self::GetBulk {
                    non_repeaters,
                    max_repetitions,
                    ranges: d.read_search_range_list()?,
                }
            }
            PduType::TestSet => Self::TestSet {
                varbinds: d.read_varbind_list()?,
            },
            PduType::CommitSet => Self::CommitSet,
            PduType::UndoSet => Self::UndoSet,
            PduType::CleanupSet => Self::CleanupSet,
            PduType::Ping => Self::Ping,
            PduType::Response => {
                let sys_uptime = d.read_u32()?;
                let status = AgentxStatus::from_u16(d.read_u16()?);
                let index = d.read_u16()?;
                Self::Response {
                    sys_uptime,
                    status,
                    index,
                    varbinds: d.read_varbind_list()?,
                }
            }
            other => {
                let payload = d.read_rest();
                return Ok(Self::Unsupported {
                    pdu_type: other,
                    payload,
                });
            }
        };
        d.finish()?;
        Ok(pdu)
    }
}

fn encode_registration(buf: &mut EncodeBuf, reg: &Registration) {
    buf.push_u8(reg.priority);
    buf.push_u8(reg.range_subid);
    buf.push_u8(0);
    buf.push_oid(&reg.subtree, false);
    if reg.range_subid != 0 {
        buf.push_u32(reg.upper_bound.unwrap_or(0));
    }
}

fn decode_registration(d: &mut Decoder) -> Result<Registration> {
    let priority = d.read_u8()?;
    let range_subid = d.read_u8()?;
    d.skip(1)?;
    let (subtree, _) = d.read_oid()?;
    let upper_bound = if range_subid != 0 {
        Some(d.read_u32()?)
    } else {
        None
    };
    Ok(Registration {
        timeout: 0,
        priority,
        range_subid,
        subtree,
        upper_bound,
    })
}

/// A header plus its PDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub header: Header,
    /// Non-default context, when the header flags one.
    pub context: Option<Bytes>,
    pub pdu: Pdu,
}

impl Packet {
    /// Build a packet in the default context; the header type follows the PDU.
    pub fn new(mut header: Header, pdu: Pdu) -> Self {
        header.pdu_type = pdu.pdu_type();
        Self {
            header,
            context: None,
            pdu,
        }
    }

    /// Encode header and payload.
    pub fn encode(&self) -> Bytes {
        let mut body = EncodeBuf::new();
        let mut header = self.header;
        header.flags &= !flags::NON_DEFAULT_CONTEXT;
        if let Some(context) = &self.context
            && header.pdu_type.allows_context()
        {
            header.flags |= flags::NON_DEFAULT_CONTEXT;
            body.push_octet_string(context);
        }
        self.pdu.encode_body(&mut body);
        let body = body.finish();

        let mut out = BytesMut::with_capacity(HEADER_LEN + body.len());
        out.extend_from_slice(&header.encode(body.len() as u32));
        out.extend_from_slice(&body);
        out.freeze()
    }

    /// Decode a payload whose header has already been read.
    pub fn decode(header: Header, payload: Bytes) -> Result<Self> {
        let mut d = Decoder::new(payload, header.is_network_byte_order());
        let context = if header.has_context() {
            Some(d.read_octet_string()?)
        } else {
            None
        };
        let pdu = Pdu::decode_body(header.pdu_type, &mut d)?;
        Ok(Self {
            header,
            context,
            pdu,
        })
    }

    /// Decode a complete packet from one buffer.
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        let header = Header::decode(buf)?;
        let end = HEADER_LEN + header.payload_len as usize;
        if buf.len() < end {
            return Err(crate::error::Error::decode(
                HEADER_LEN,
                crate::error::DecodeErrorKind::InsufficientData {
                    needed: header.payload_len as usize,
                    available: buf.len() - HEADER_LEN,
                },
            ));
        }
        Self::decode(header, Bytes::copy_from_slice(&buf[HEADER_LEN..end]))
    }
}
