//! BIRD control-socket client.
//!
//! The control protocol is line based. Every reply line starts either with a
//! four-digit code followed by `-` (more lines with this code follow) or a
//! space (last line with this code), or with a single space for a
//! continuation of the previous code:
//!
//! ```text
//! 0001 BIRD 2.15.1 ready.
//! 1000-BIRD 2.15.1
//! 1011-Router ID is 192.168.32.79
//!  Hostname is infra2
//! 0013 Daemon is up and running
//! ```
//!
//! A code starting with `0` ends a successful reply; `8` (runtime error) and
//! `9` (syntax error) end a failed one.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use crate::error::{Error, Result};

/// Request/response access to a routing daemon.
///
/// The refresher owns its client exclusively, so `request` takes `&mut self`
/// and never runs concurrently with itself.
pub trait DaemonClient: Send {
    /// Send one command and return the full text of its reply.
    fn request(&mut self, command: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Code the daemon greets new control connections with.
const GREETING_CODE: u16 = 1;

/// One classified reply line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReplyLine<'a> {
    /// `DDDD-text` or `DDDD text`.
    Coded { code: u16, text: &'a str },
    /// Anything else; ` text` loses its leading space.
    Continuation(&'a str),
}

impl<'a> ReplyLine<'a> {
    pub(crate) fn parse(line: &'a str) -> Self {
        let bytes = line.as_bytes();
        let is_coded = bytes.len() >= 4
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && matches!(bytes.get(4), None | Some(b'-') | Some(b' '));

        if is_coded {
            // four ASCII digits always fit in u16
            let code = line[..4].parse().unwrap_or(0);
            Self::Coded {
                code,
                text: line.get(5..).unwrap_or(""),
            }
        } else {
            Self::Continuation(line.strip_prefix(' ').unwrap_or(line))
        }
    }

    /// True if this line ends the reply.
    pub(crate) fn is_final(&self) -> bool {
        matches!(self, Self::Coded { code, .. } if matches!(code / 1000, 0 | 8 | 9))
    }

    fn text(&self) -> &'a str {
        match self {
            Self::Coded { text, .. } | Self::Continuation(text) => text,
        }
    }
}

/// Client for the BIRD control socket.
///
/// Connects lazily: the socket is opened on the first request and after any
/// failure, so a restarted daemon is picked up without restarting the
/// subagent.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use bird_bgp_agentx::bird::{BirdClient, DaemonClient};
///
/// # async fn example() -> bird_bgp_agentx::Result<()> {
/// let mut client = BirdClient::new("/run/bird/bird.ctl", Duration::from_secs(10));
/// let text = client.request("show status").await?;
/// println!("{}", text);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BirdClient {
    path: PathBuf,
    timeout: Duration,
    conn: Option<BufReader<UnixStream>>,
}

impl BirdClient {
    /// Create a client for the socket at `path`. No I/O happens until the
    /// first request.
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
            conn: None,
        }
    }

    /// Create a client and connect right away, validating the greeting.
    pub async fn connect(path: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        let mut client = Self::new(path, timeout);
        client.ensure_connected().await?;
        Ok(client)
    }

    /// Socket path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True while a validated connection is held.
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    async fn ensure_connected(&mut self) -> Result<&mut BufReader<UnixStream>> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => self.open().await?,
        };
        Ok(self.conn.insert(conn))
    }

    async fn open(&self) -> Result<BufReader<UnixStream>> {
        let start = Instant::now();
        let fut = async {
            let stream = UnixStream::connect(&self.path)
                .await
                .map_err(|e| Error::daemon_io("connect", e))?;
            let mut conn = BufReader::new(stream);

            let mut line = String::new();
            read_line(&mut conn, &mut line).await?;
            match ReplyLine::parse(&line) {
                ReplyLine::Coded {
                    code: GREETING_CODE,
                    text,
                } => {
                    tracing::debug!(bird.socket = %self.path.display(), bird.greeting = text, "connected to daemon");
                    Ok(conn)
                }
                _ => Err(Error::DaemonGreeting {
                    line: line.as_str().into(),
                }),
            }
        };

        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| Error::DaemonTimeout {
                operation: "connect",
                elapsed: start.elapsed(),
            })?
    }

    async fn round_trip(&mut self, command: &str) -> Result<String> {
        let timeout = self.timeout;
        let start = Instant::now();
        let conn = self.ensure_connected().await?;

        let fut = async {
            let mut request = command.trim_end_matches('\n').to_owned();
            request.push('\n');
            conn.get_mut()
                .write_all(request.as_bytes())
                .await
                .map_err(|e| Error::daemon_io("write", e))?;

            read_reply(conn).await
        };

        tokio::time::timeout(timeout, fut)
            .await
            .map_err(|_| Error::DaemonTimeout {
                operation: "read reply",
                elapsed: start.elapsed(),
            })?
    }
}

impl DaemonClient for BirdClient {
    async fn request(&mut self, command: &str) -> Result<String> {
        tracing::trace!(bird.command = command, "sending daemon command");
        let result = self.round_trip(command).await;

        // A daemon error reply still leaves the stream in sync; anything else
        // may not, so start over on the next request.
        if let Err(e) = &result
            && !matches!(e, Error::DaemonReply { .. })
        {
            tracing::debug!(bird.socket = %self.path.display(), error = %e, "dropping daemon connection");
            self.conn = None;
        }
        result
    }
}

async fn read_line(conn: &mut BufReader<UnixStream>, line: &mut String) -> Result<()> {
    line.clear();
    let n = conn
        .read_line(line)
        .await
        .map_err(|e| Error::daemon_io("read", e))?;
    if n == 0 {
        return Err(Error::daemon_io(
            "read",
            std::io::ErrorKind::UnexpectedEof.into(),
        ));
    }
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(())
}

/// Read lines up to the terminating code and return their text joined by `\n`.
async fn read_reply(conn: &mut BufReader<UnixStream>) -> Result<String> {
    let mut out = String::new();
    let mut line = String::new();

    loop {
        read_line(conn, &mut line).await?;
        let reply = ReplyLine::parse(&line);
        tracing::trace!(bird.line = %line, "daemon reply line");

        if let ReplyLine::Coded { code, text } = reply
            && code >= 8000
        {
            return Err(Error::DaemonReply {
                code,
                message: text.into(),
            });
        }

        let text = reply.text();
        if !text.is_empty() {
            out.push_str(text);
            out.push('\n');
        }
        if reply.is_final() {
            return Ok(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::UnixListener;

    #[test]
    fn test_reply_line_classification() {
        assert_eq!(
            ReplyLine::parse("1011-Router ID is 192.168.32.79"),
            ReplyLine::Coded {
                code: 1011,
                text: "Router ID is 192.168.32.79"
            }
        );
        assert_eq!(
            ReplyLine::parse("0013 Daemon is up and running"),
            ReplyLine::Coded {
                code: 13,
                text: "Daemon is up and running"
            }
        );
        assert_eq!(
            ReplyLine::parse(" Hostname is infra2"),
            ReplyLine::Continuation("Hostname is infra2")
        );
        assert_eq!(
            ReplyLine::parse("0000"),
            ReplyLine::Coded { code: 0, text: "" }
        );
        // digits not followed by a separator are plain text
        assert_eq!(
            ReplyLine::parse("12345 routes"),
            ReplyLine::Continuation("12345 routes")
        );
    }

    #[test]
    fn test_final_codes() {
        assert!(ReplyLine::parse("0000 ").is_final());
        assert!(ReplyLine::parse("8001 Protocol is down").is_final());
        assert!(ReplyLine::parse("9001 syntax error").is_final());
        assert!(!ReplyLine::parse("1002-ber1_gw1 BGP").is_final());
        assert!(!ReplyLine::parse(" continuation").is_final());
    }

    fn socket_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("bird.ctl")
    }

    /// Accept one connection, greet, then answer each command from `replies`.
    fn serve(listener: UnixListener, replies: Vec<&'static str>) -> tokio::task::JoinHandle<Vec<String>> {
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            stream.write_all(b"0001 BIRD 2.15.1 ready.\n").await.unwrap();
            let mut commands = Vec::new();
            let mut buf = [0u8; 256];
            for reply in replies {
                let n = stream.read(&mut buf).await.unwrap();
                commands.push(String::from_utf8_lossy(&buf[..n]).into_owned());
                stream.write_all(reply.as_bytes()).await.unwrap();
            }
            commands
        })
    }

    #[tokio::test]
    async fn test_request_strips_codes() {
        let dir = tempfile::tempdir().unwrap();
        let path = socket_path(&dir);
        let listener = UnixListener::bind(&path).unwrap();
        let server = serve(
            listener,
            vec!["1000-BIRD 2.15.1\n1011-Router ID is 192.168.32.79\n Hostname is infra2\n0013 Daemon is up and running\n"],
        );

        let mut client = BirdClient::connect(&path, Duration::from_secs(5)).await.unwrap();
        let text = client.request("show status").await.unwrap();
        assert_eq!(
            text,
            "BIRD 2.15.1\nRouter ID is 192.168.32.79\nHostname is infra2\nDaemon is up and running\n"
        );
        assert_eq!(server.await.unwrap(), vec!["show status\n".to_owned()]);
    }

    #[tokio::test]
    async fn test_error_reply_keeps_connection() {
        let dir = tempfile::tempdir().unwrap();
        let path = socket_path(&dir);
        let listener = UnixListener::bind(&path).unwrap();
        let server = serve(listener, vec!["9001 syntax error\n", "0000 \n"]);

        let mut client = BirdClient::new(&path, Duration::from_secs(5));
        let err = client.request("show bogus").await.unwrap_err();
        assert!(matches!(err, Error::DaemonReply { code: 9001, .. }));
        assert!(err.is_daemon_communication());
        assert!(client.is_connected());

        assert_eq!(client.request("show status").await.unwrap(), "");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_bad_greeting() {
        let dir = tempfile::tempdir().unwrap();
        let path = socket_path(&dir);
        let listener = UnixListener::bind(&path).unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            stream.write_all(b"hello\n").await.unwrap();
        });

        let err = BirdClient::connect(&path, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DaemonGreeting { .. }));
    }

    #[tokio::test]
    async fn test_missing_socket_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = BirdClient::new(socket_path(&dir), Duration::from_secs(1));
        let err = client.request("show status").await.unwrap_err();
        assert!(matches!(err, Error::DaemonIo { operation: "connect", .. }));
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_timeout_drops_connection() {
        let dir = tempfile::tempdir().unwrap();
        let path = socket_path(&dir);
        let listener = UnixListener::bind(&path).unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            stream.write_all(b"0001 BIRD ready.\n").await.unwrap();
            // partial reply, never terminated
            stream.write_all(b"1000-BIRD 2.15.1\n").await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(stream);
        });

        let mut client = BirdClient::new(&path, Duration::from_millis(100));
        let err = client.request("show status").await.unwrap_err();
        assert!(matches!(err, Error::DaemonTimeout { .. }));
        assert!(!client.is_connected());
        server.abort();
    }

    #[tokio::test]
    async fn test_reconnects_after_daemon_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = socket_path(&dir);

        let listener = UnixListener::bind(&path).unwrap();
        let first = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            stream.write_all(b"0001 BIRD ready.\n").await.unwrap();
            // daemon goes away before answering
        });

        let mut client = BirdClient::new(&path, Duration::from_secs(5));
        assert!(client.request("show status").await.is_err());
        first.await.unwrap();
        assert!(!client.is_connected());

        std::fs::remove_file(&path).unwrap();
        let listener = UnixListener::bind(&path).unwrap();
        let second = serve(listener, vec!["0013 Daemon is up and running\n"]);

        let text = client.request("show status").await.unwrap();
        assert_eq!(text, "Daemon is up and running\n");
        second.await.unwrap();
    }
}
