//! Framed AgentX stream.
//!
//! A frame is a 20-byte header followed by `payload_length` bytes. The
//! framing survives a payload that fails to decode, so the caller can answer
//! it with `parseError` and carry on. A bad header loses sync and is fatal
//! for the session.

use std::path::Path;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::UnixStream;

use crate::error::{Error, Result};

use super::header::{HEADER_LEN, Header};
use super::pdu::Packet;

/// One AgentX connection to the master agent.
#[derive(Debug)]
pub struct Connection<S> {
    stream: S,
}

impl Connection<UnixStream> {
    /// Connect to a master listening on a Unix socket.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let stream = UnixStream::connect(path.as_ref())
            .await
            .map_err(|source| Error::AgentxIo { source })?;
        Ok(Self::new(stream))
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an established stream.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Read the next frame.
    ///
    /// An orderly EOF from the master is reported as `AgentxIo` with
    /// `UnexpectedEof`; the master is supposed to send Close first.
    pub async fn read_frame(&mut self) -> Result<(Header, Bytes)> {
        let mut head = [0u8; HEADER_LEN];
        self.stream
            .read_exact(&mut head)
            .await
            .map_err(|source| Error::AgentxIo { source })?;
        let header = Header::decode(&head)?;

        let mut payload = BytesMut::zeroed(header.payload_len as usize);
        self.stream
            .read_exact(&mut payload)
            .await
            .map_err(|source| Error::AgentxIo { source })?;

        tracing::trace!(
            agentx.pdu_type = %header.pdu_type,
            agentx.packet_id = header.packet_id,
            agentx.payload_len = header.payload_len,
            "received frame"
        );
        Ok((header, payload.freeze()))
    }

    /// Read and decode the next packet.
    pub async fn read_packet(&mut self) -> Result<Packet> {
        let (header, payload) = self.read_frame().await?;
        Packet::decode(header, payload)
    }

    /// Encode and send one packet.
    pub async fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        let bytes = packet.encode();
        tracing::trace!(
            agentx.pdu_type = %packet.header.pdu_type,
            agentx.packet_id = packet.header.packet_id,
            agentx.len = bytes.len(),
            "sending frame"
        );
        self.stream
            .write_all(&bytes)
            .await
            .map_err(|source| Error::AgentxIo { source })?;
        self.stream
            .flush()
            .await
            .map_err(|source| Error::AgentxIo { source })
    }

    /// Mutable access to the underlying stream, bypassing the framing.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Give back the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}
