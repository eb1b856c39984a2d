//! Error types for bird-bgp-agentx.
//!
//! [`Error`] is `#[non_exhaustive]` to allow adding new variants without breaking changes.
//!
//! The variants fall into four families:
//!
//! - daemon communication ([`Error::DaemonIo`], [`Error::DaemonTimeout`],
//!   [`Error::DaemonReply`], [`Error::DaemonGreeting`]): abort one refresh cycle,
//!   the previous snapshot stays published;
//! - [`Error::Parse`]: daemon output the parser cannot recover from, handled
//!   like a communication failure;
//! - AgentX ([`Error::Registration`], [`Error::AgentxIo`], [`Error::Decode`],
//!   [`Error::AgentxResponse`], [`Error::SessionClosed`]): registration failures
//!   are fatal at startup, the rest end the current session;
//! - [`Error::InvalidOid`] for malformed OID input.

use std::time::Duration;

use crate::agentx::{AgentxStatus, CloseReason, PduType};
use crate::oid::Oid;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Daemon output parse error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A BGP protocol header line missing its state or since column.
    MalformedHeader { fields: usize },
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedHeader { fields } => {
                write!(f, "malformed BGP protocol header ({} fields, need 5)", fields)
            }
        }
    }
}

/// AgentX decode error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Header version is not 1.
    UnsupportedVersion(u8),
    /// Unknown PDU type.
    UnknownPduType(u8),
    /// Insufficient data for read.
    InsufficientData { needed: usize, available: usize },
    /// Payload length exceeds maximum.
    PayloadTooLarge { length: usize, max: usize },
    /// Unknown varbind type.
    UnknownValueType(u16),
    /// IpAddress value that is not 4 octets.
    InvalidIpAddressLength { length: usize },
    /// OID with more sub-identifiers than MAX_OID_LEN.
    OidTooLong { count: usize },
    /// Payload bytes left over after the PDU body.
    TrailingData { remaining: usize },
}

impl std::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedVersion(v) => write!(f, "unsupported AgentX version: {}", v),
            Self::UnknownPduType(t) => write!(f, "unknown PDU type: {}", t),
            Self::InsufficientData { needed, available } => {
                write!(f, "need {} bytes but only {} remaining", needed, available)
            }
            Self::PayloadTooLarge { length, max } => {
                write!(f, "payload length {} exceeds maximum {}", length, max)
            }
            Self::UnknownValueType(t) => write!(f, "unknown varbind type: {}", t),
            Self::InvalidIpAddressLength { length } => {
                write!(f, "IP address must be 4 bytes, got {}", length)
            }
            Self::OidTooLong { count } => write!(f, "OID has {} sub-identifiers", count),
            Self::TrailingData { remaining } => {
                write!(f, "{} unexpected bytes after PDU body", remaining)
            }
        }
    }
}

/// OID validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidErrorKind {
    /// Empty OID string.
    Empty,
    /// Invalid arc value.
    InvalidArc,
    /// OID has too many arcs (exceeds MAX_OID_LEN).
    TooManyArcs { count: usize, max: usize },
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty OID"),
            Self::InvalidArc => write!(f, "invalid arc value"),
            Self::TooManyArcs { count, max } => {
                write!(f, "OID has {} arcs, exceeds maximum {}", count, max)
            }
        }
    }
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error talking to the routing daemon.
    #[error("daemon I/O error during {operation}: {source}")]
    DaemonIo {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The daemon did not finish a reply in time.
    #[error("daemon timeout after {elapsed:?} during {operation}")]
    DaemonTimeout {
        operation: &'static str,
        elapsed: Duration,
    },

    /// The daemon answered with an error reply code (8xxx runtime, 9xxx syntax).
    #[error("daemon error reply {code}: {message}")]
    DaemonReply { code: u16, message: Box<str> },

    /// The control socket did not open with the expected welcome line.
    #[error("unexpected daemon greeting: {line:?}")]
    DaemonGreeting { line: Box<str> },

    /// Daemon output that cannot be parsed as a whole.
    #[error("parse error: {kind} in {input:?}")]
    Parse {
        kind: ParseErrorKind,
        input: Box<str>,
    },

    /// The AgentX master refused to open the session or register the subtree.
    #[error("AgentX registration of {subtree} failed: {status}")]
    Registration { subtree: Oid, status: AgentxStatus },

    /// The AgentX master answered a request with an error status.
    #[error("AgentX {pdu_type} failed: {status}")]
    AgentxResponse {
        pdu_type: PduType,
        status: AgentxStatus,
    },

    /// I/O error on the AgentX connection.
    #[error("AgentX I/O error: {source}")]
    AgentxIo {
        #[source]
        source: std::io::Error,
    },

    /// The AgentX master did not answer in time.
    #[error("AgentX timeout after {elapsed:?} waiting for {pdu_type} response")]
    AgentxTimeout { pdu_type: PduType, elapsed: Duration },

    /// Malformed AgentX PDU.
    #[error("AgentX decode error at offset {offset}: {kind}")]
    Decode {
        offset: usize,
        kind: DecodeErrorKind,
    },

    /// The AgentX session ended.
    #[error("AgentX session closed: {reason}")]
    SessionClosed { reason: CloseReason },

    /// Invalid OID format.
    #[error("invalid OID: {kind}")]
    InvalidOid {
        kind: OidErrorKind,
        input: Option<Box<str>>,
    },
}

impl Error {
    /// Create a daemon I/O error.
    pub fn daemon_io(operation: &'static str, source: std::io::Error) -> Self {
        Self::DaemonIo { operation, source }
    }

    /// Create a parse error carrying the offending input fragment.
    pub fn parse(kind: ParseErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::Parse {
            kind,
            input: input.into(),
        }
    }

    /// Create an AgentX decode error.
    pub fn decode(offset: usize, kind: DecodeErrorKind) -> Self {
        Self::Decode { offset, kind }
    }

    /// Create an invalid OID error from a kind (no input string).
    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    /// True for failures talking to the routing daemon.
    ///
    /// These abort a single refresh cycle; the next tick retries.
    pub fn is_daemon_communication(&self) -> bool {
        matches!(
            self,
            Self::DaemonIo { .. }
                | Self::DaemonTimeout { .. }
                | Self::DaemonReply { .. }
                | Self::DaemonGreeting { .. }
        )
    }

    /// True for AgentX session-level failures after which a reconnect may help.
    pub fn is_session_lost(&self) -> bool {
        matches!(
            self,
            Self::AgentxIo { .. }
                | Self::AgentxTimeout { .. }
                | Self::Decode { .. }
                | Self::SessionClosed { .. }
        )
    }
}
