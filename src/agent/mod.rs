//! AgentX subagent session.
//!
//! A [`Subagent`] is one open, registered session with the master agent.
//! [`Subagent::connect`] opens the session and registers the BGP4-MIB
//! subtree; [`Subagent::serve`] then answers the master's requests from a
//! [`MibHandler`] until the session ends.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bird_bgp_agentx::{AgentConfig, Snapshot, SnapshotCell};
//! use bird_bgp_agentx::agent::Subagent;
//! use bird_bgp_agentx::handler::{OidStore, SnapshotHandler};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> bird_bgp_agentx::Result<()> {
//! let cell = Arc::new(SnapshotCell::new(Snapshot::new(OidStore::new())));
//! let handler = SnapshotHandler::new(cell);
//!
//! let config = AgentConfig::default();
//! let session = Subagent::connect(&config).await?;
//! session.serve(&handler, CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Session end
//!
//! `serve` returns `Ok(())` only after cancellation, having sent
//! Close(`reasonShutdown`). A Close from the master yields
//! [`Error::SessionClosed`]; I/O failures and undecodable headers yield the
//! matching error. All of these satisfy [`Error::is_session_lost`], and the
//! caller is expected to reconnect.

mod set_handler;

use std::time::{Duration, Instant};

use tokio::net::UnixStream;
use tokio_util::sync::CancellationToken;

use crate::agentx::{
    AgentxStatus, CloseReason, Connection, Header, Packet, Pdu, PduType, Registration,
};
use crate::config::AgentConfig;
use crate::error::{Error, Result};
use crate::handler::{MibHandler, SearchRange};
use crate::mib;
use crate::oid::Oid;
use crate::varbind::VarBind;

/// An open, registered AgentX session.
#[derive(Debug)]
pub struct Subagent<S> {
    conn: Connection<S>,
    session_id: u32,
    next_packet_id: u32,
    started: Instant,
    subtree: Oid,
    timeout: Duration,
}

impl Subagent<UnixStream> {
    /// Connect to the master socket, open a session and register BGP4-MIB.
    ///
    /// # Errors
    ///
    /// [`Error::AgentxIo`] if the socket cannot be reached,
    /// [`Error::Registration`] if the master refuses the Open or the Register.
    pub async fn connect(config: &AgentConfig) -> Result<Self> {
        let conn = Connection::connect(&config.master_socket).await?;
        tracing::debug!(
            agentx.master = %config.master_socket.display(),
            "connected to master"
        );
        Self::open(conn, config, mib::subtree()).await
    }
}

impl<S> Subagent<S> {
    /// Session id assigned by the master.
    pub fn session_id(&self) -> u32 {
        self.session_id
    }

    /// The registered subtree.
    pub fn subtree(&self) -> &Oid {
        &self.subtree
    }

    /// Hundredths of a second since the session was opened.
    fn sys_uptime(&self) -> u32 {
        (self.started.elapsed().as_millis() / 10).min(u32::MAX as u128) as u32
    }
}

impl<S> Subagent<S>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send,
{
    /// Open a session over `conn` and register `subtree`.
    pub async fn open(conn: Connection<S>, config: &AgentConfig, subtree: Oid) -> Result<Self> {
        let mut session = Self {
            conn,
            session_id: 0,
            next_packet_id: 1,
            started: Instant::now(),
            subtree,
            timeout: config.agentx_timeout,
        };

        let response = session
            .request(Pdu::Open {
                timeout: config.open_timeout_secs(),
                id: session.subtree.clone(),
                description: config.description.clone().into_bytes().into(),
            })
            .await?;
        session.check(PduType::Open, &response)?;
        session.session_id = response.header.session_id;

        let response = session
            .request(Pdu::Register(Registration::subtree(
                session.subtree.clone(),
                config.priority,
            )))
            .await?;
        session.check(PduType::Register, &response)?;

        tracing::info!(
            agentx.session_id = session.session_id,
            agentx.subtree = %session.subtree,
            agentx.priority = config.priority,
            "registered with master"
        );
        Ok(session)
    }

    fn check(&self, pdu_type: PduType, response: &Packet) -> Result<()> {
        match &response.pdu {
            Pdu::Response { status, .. } if status.is_ok() => Ok(()),
            Pdu::Response { status, .. } => Err(Error::Registration {
                subtree: self.subtree.clone(),
                status: *status,
            }),
            _ => Err(Error::AgentxResponse {
                pdu_type,
                status: AgentxStatus::ProcessingError,
            }),
        }
    }

    /// Send a subagent-originated PDU and wait for its Response.
    async fn request(&mut self, pdu: Pdu) -> Result<Packet> {
        let pdu_type = pdu.pdu_type();
        let packet_id = self.next_packet_id;
        self.next_packet_id = self.next_packet_id.wrapping_add(1);

        let header = Header::new(pdu_type, self.session_id, 0, packet_id);
        self.conn.write_packet(&Packet::new(header, pdu)).await?;
        let timeout = self.timeout;

        let start = Instant::now();
        match tokio::time::timeout(timeout, await_response(&mut self.conn, packet_id)).await {
            Ok(result) => result,
            Err(_) => Err(Error::AgentxTimeout {
                pdu_type,
                elapsed: start.elapsed(),
            }),
        }
    }

    /// Answer requests from `handler` until the session ends or `cancel`
    /// fires.
    pub async fn serve<H: MibHandler>(mut self, handler: &H, cancel: CancellationToken) -> Result<()> {
        loop {
            let frame = tokio::select! {
                _ = cancel.cancelled() => {
                    self.close(CloseReason::Shutdown).await;
                    return Ok(());
                }
                frame = self.conn.read_frame() => frame?,
            };

            let (header, payload) = frame;
            let reply_header = header.response();
            let reply = match Packet::decode(header, payload) {
                Ok(packet) => self.dispatch(handler, packet)?,
                Err(e) => {
                    tracing::warn!(
                        agentx.pdu_type = %header.pdu_type,
                        error = %e,
                        "undecodable PDU"
                    );
                    (header.pdu_type != PduType::Response).then(|| {
                        Pdu::error_response(AgentxStatus::ParseError, 0, self.sys_uptime())
                    })
                }
            };

            if let Some(pdu) = reply {
                let packet = Packet {
                    header: reply_header,
                    context: None,
                    pdu,
                };
                self.conn.write_packet(&packet).await?;
            }
        }
    }

    /// Compute the Response to one request, if it gets one.
    fn dispatch<H: MibHandler>(&self, handler: &H, packet: Packet) -> Result<Option<Pdu>> {
        let sys_uptime = self.sys_uptime();
        if packet.context.is_some() && packet.header.pdu_type.allows_context() {
            return Ok(Some(Pdu::error_response(
                AgentxStatus::UnsupportedContext,
                0,
                sys_uptime,
            )));
        }

        let reply = match packet.pdu {
            Pdu::Get { oids } => Some(Pdu::response(handler.get_many(&oids), sys_uptime)),
            Pdu::GetNext { ranges } => {
                let varbinds = handler.get_next_many(&ranges);
                Some(Pdu::response(end_of_view(&ranges, varbinds), sys_uptime))
            }
            Pdu::GetBulk {
                non_repeaters,
                max_repetitions,
                ranges,
            } => {
                let varbinds = handler.get_bulk(
                    &ranges,
                    non_repeaters as usize,
                    max_repetitions as usize,
                );
                Some(Pdu::response(
                    varbinds.into_iter().map(exception_to_end_of_view).collect(),
                    sys_uptime,
                ))
            }
            Pdu::TestSet { .. } | Pdu::CommitSet | Pdu::UndoSet | Pdu::CleanupSet => {
                self.handle_set(&packet.pdu)
            }
            Pdu::Ping => Some(Pdu::response(Vec::new(), sys_uptime)),
            Pdu::Close { reason } => {
                tracing::warn!(agentx.reason = %reason, "master closed the session");
                return Err(Error::SessionClosed { reason });
            }
            Pdu::Response { .. } => {
                tracing::debug!(
                    agentx.packet_id = packet.header.packet_id,
                    "stray response"
                );
                None
            }
            other => {
                tracing::debug!(agentx.pdu_type = %other.pdu_type(), "unexpected PDU");
                Some(Pdu::error_response(
                    AgentxStatus::ProcessingError,
                    0,
                    sys_uptime,
                ))
            }
        };
        Ok(reply)
    }

    /// Send Close. The master does not answer a Close, and the session is
    /// over either way, so failures are only logged.
    async fn close(&mut self, reason: CloseReason) {
        let header = Header::new(PduType::Close, self.session_id, 0, self.next_packet_id);
        let packet = Packet::new(header, Pdu::Close { reason });
        match self.conn.write_packet(&packet).await {
            Ok(()) => tracing::info!(
                agentx.session_id = self.session_id,
                agentx.reason = %reason,
                "closed session"
            ),
            Err(e) => tracing::debug!(error = %e, "failed to send Close"),
        }
    }
}

/// Read until the Response to `packet_id` arrives.
async fn await_response<S>(conn: &mut Connection<S>, packet_id: u32) -> Result<Packet>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send,
{
    loop {
        let packet = conn.read_packet().await?;
        if matches!(packet.pdu, Pdu::Response { .. }) && packet.header.packet_id == packet_id {
            return Ok(packet);
        }
        tracing::debug!(
            agentx.pdu_type = %packet.header.pdu_type,
            agentx.packet_id = packet.header.packet_id,
            "ignoring PDU while waiting for response"
        );
    }
}

/// GetNext answers with no successor become `endOfMibView` named by the
/// range start.
fn end_of_view(ranges: &[SearchRange], varbinds: Vec<VarBind>) -> Vec<VarBind> {
    varbinds
        .into_iter()
        .zip(ranges)
        .map(|(vb, range)| {
            if vb.is_exception() {
                VarBind::end_of_mib_view(range.start.clone())
            } else {
                vb
            }
        })
        .collect()
}

fn exception_to_end_of_view(vb: VarBind) -> VarBind {
    if vb.is_exception() {
        VarBind::end_of_mib_view(vb.oid)
    } else {
        vb
    }
}
