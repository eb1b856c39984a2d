//! Mock daemon and mock AgentX master.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bird_bgp_agentx::agentx::{
    AgentxStatus, Connection, Header, Packet, Pdu, PduType, Registration,
};
use bird_bgp_agentx::{DaemonClient, Error, Result};
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::net::UnixListener;
use tokio::task::{JoinHandle, JoinSet};

// =============================================================================
// Daemon side
// =============================================================================

/// `DaemonClient` answering from a fixed script, one entry per request.
///
/// Runs out with an I/O error. Commands seen are recorded.
pub struct ScriptedDaemon {
    replies: VecDeque<Result<String>>,
    pub commands: Arc<Mutex<Vec<String>>>,
}

impl ScriptedDaemon {
    pub fn new(replies: impl IntoIterator<Item = Result<String>>) -> Self {
        Self {
            replies: replies.into_iter().collect(),
            commands: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Script answering one poll (status then protocols) per pair.
    pub fn polls(polls: impl IntoIterator<Item = (&'static str, &'static str)>) -> Self {
        Self::new(
            polls
                .into_iter()
                .flat_map(|(status, protocols)| [Ok(status.to_owned()), Ok(protocols.to_owned())]),
        )
    }
}

impl DaemonClient for ScriptedDaemon {
    async fn request(&mut self, command: &str) -> Result<String> {
        self.commands.lock().push(command.to_owned());
        self.replies
            .pop_front()
            .unwrap_or_else(|| Err(io_error("script exhausted")))
    }
}

/// A daemon I/O error for scripts.
pub fn io_error(message: &str) -> Error {
    Error::daemon_io(
        "read",
        std::io::Error::new(std::io::ErrorKind::ConnectionReset, message.to_owned()),
    )
}

/// Unix-socket daemon that greets every connection and answers each command
/// line with `respond(command)`, already coded for the wire.
///
/// Dropping it closes the listener and every open connection.
pub struct MockBird {
    pub path: PathBuf,
    task: JoinHandle<()>,
}

impl MockBird {
    pub fn spawn(path: &Path, respond: fn(&str) -> String) -> Self {
        let listener = UnixListener::bind(path).unwrap();
        let task = tokio::spawn(async move {
            let mut connections = JoinSet::new();
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                connections.spawn(async move {
                    let (read, mut write) = stream.into_split();
                    if write.write_all(b"0001 BIRD 2.15.1 ready.\n").await.is_err() {
                        return;
                    }
                    let mut lines = BufReader::new(read).lines();
                    while let Ok(Some(command)) = lines.next_line().await {
                        let reply = respond(command.trim());
                        if write.write_all(reply.as_bytes()).await.is_err() {
                            return;
                        }
                    }
                });
            }
        });
        Self {
            path: path.to_owned(),
            task,
        }
    }
}

impl Drop for MockBird {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// =============================================================================
// AgentX master side
// =============================================================================

/// Session id the mock master hands out.
pub const SESSION_ID: u32 = 0x2a;

/// Master end of an in-memory AgentX connection.
pub struct MockMaster {
    pub conn: Connection<DuplexStream>,
    next_packet_id: u32,
}

/// A connected (subagent stream, master) pair.
pub fn master_pair() -> (DuplexStream, MockMaster) {
    let (subagent, master) = tokio::io::duplex(64 * 1024);
    (
        subagent,
        MockMaster {
            conn: Connection::new(master),
            next_packet_id: 100,
        },
    )
}

impl MockMaster {
    /// Accept Open and Register, answering both with `register_status`
    /// applied to the Register only. Returns the Registration received.
    pub async fn accept(&mut self, register_status: AgentxStatus) -> Registration {
        let open = self.conn.read_packet().await.unwrap();
        assert!(matches!(open.pdu, Pdu::Open { .. }), "expected Open, got {:?}", open.pdu);
        let mut header = open.header.response();
        header.session_id = SESSION_ID;
        self.reply(header, Pdu::response(Vec::new(), 0)).await;

        let register = self.conn.read_packet().await.unwrap();
        assert_eq!(register.header.session_id, SESSION_ID);
        let Pdu::Register(registration) = register.pdu else {
            panic!("expected Register, got {:?}", register.pdu);
        };
        self.reply(
            register.header.response(),
            Pdu::error_response(register_status, 0, 0),
        )
        .await;
        registration
    }

    async fn reply(&mut self, header: Header, pdu: Pdu) {
        self.conn.write_packet(&Packet::new(header, pdu)).await.unwrap();
    }

    /// Send a master-originated PDU and return its packet id.
    pub async fn send(&mut self, pdu: Pdu) -> u32 {
        let packet_id = self.next_packet_id;
        self.next_packet_id += 1;
        let header = Header::new(pdu.pdu_type(), SESSION_ID, packet_id, packet_id);
        self.conn.write_packet(&Packet::new(header, pdu)).await.unwrap();
        packet_id
    }

    /// Send raw bytes, for malformed-PDU tests.
    pub async fn send_raw(&mut self, pdu_type: PduType, payload: &[u8]) -> u32 {
        let packet_id = self.next_packet_id;
        self.next_packet_id += 1;
        let mut bytes = Header::new(pdu_type, SESSION_ID, packet_id, packet_id)
            .encode(payload.len() as u32)
            .to_vec();
        bytes.extend_from_slice(payload);
        self.conn.get_mut().write_all(&bytes).await.unwrap();
        packet_id
    }

    /// Send a request and read its Response.
    pub async fn request(&mut self, pdu: Pdu) -> Packet {
        let packet_id = self.send(pdu).await;
        let response = self.conn.read_packet().await.unwrap();
        assert_eq!(response.header.pdu_type, PduType::Response);
        assert_eq!(response.header.packet_id, packet_id);
        response
    }
}
