//! AgentX protocol (RFC 2741), subagent side.
//!
//! Only the parts a read-only subagent needs are modelled in detail: Open,
//! Close, Register and Unregister on the way out; Get, GetNext, GetBulk,
//! the SET family and Response on the way in. Other PDU types decode to
//! [`Pdu::Unsupported`] with their payload kept raw.
//!
//! - [`header`]: the fixed 20-byte header
//! - [`EncodeBuf`] / [`Decoder`]: payload fields (OIDs, octet strings,
//!   search ranges, varbinds)
//! - [`pdu`]: PDU bodies and [`Packet`]
//! - [`Connection`]: frames over a byte stream

mod conn;
mod decode;
mod encode;
pub mod header;
pub mod pdu;

pub use conn::Connection;
pub use decode::Decoder;
pub use encode::{EncodeBuf, value_type};
pub use header::{HEADER_LEN, Header, PduType, flags};
pub use pdu::{AgentxStatus, CloseReason, Packet, Pdu, Registration};
