//! Process configuration.
//!
//! [`AgentConfig`] holds the socket paths, the poll interval and the
//! timeouts on both sides. Defaults match a stock BIRD and net-snmp
//! installation.
//!
//! ```rust
//! use bird_bgp_agentx::AgentConfig;
//! use std::time::Duration;
//!
//! let config = AgentConfig::default()
//!     .bird_socket("/run/bird/bird.ctl")
//!     .refresh_interval(Duration::from_secs(10))
//!     .priority(100);
//! assert_eq!(config.priority, 100);
//! ```

use std::path::PathBuf;
use std::time::Duration;

/// Default BIRD control socket.
pub const DEFAULT_BIRD_SOCKET: &str = "/run/bird/bird.ctl";

/// Default AgentX master socket (net-snmp).
pub const DEFAULT_MASTER_SOCKET: &str = "/var/agentx/master";

/// Default registration priority. Lower values win; 127 is the RFC default.
pub const DEFAULT_PRIORITY: u8 = 127;

/// Subagent configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Routing daemon control socket.
    pub bird_socket: PathBuf,
    /// Time between snapshot refreshes.
    pub refresh_interval: Duration,
    /// AgentX master socket.
    pub master_socket: PathBuf,
    /// Registration priority for the BGP4-MIB subtree.
    pub priority: u8,
    /// Bound on one daemon request, including connect.
    pub daemon_timeout: Duration,
    /// Session timeout announced in the Open-PDU, also the bound on each
    /// response the subagent waits for.
    pub agentx_timeout: Duration,
    /// Delay before reconnecting to the master after the session is lost.
    pub reconnect_interval: Duration,
    /// Description sent in the Open-PDU.
    pub description: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            bird_socket: PathBuf::from(DEFAULT_BIRD_SOCKET),
            refresh_interval: Duration::from_secs(3),
            master_socket: PathBuf::from(DEFAULT_MASTER_SOCKET),
            priority: DEFAULT_PRIORITY,
            daemon_timeout: Duration::from_secs(10),
            agentx_timeout: Duration::from_secs(60),
            reconnect_interval: Duration::from_secs(1),
            description: concat!("bird-bgp-agentx ", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

macro_rules! duration_setters {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(mut self, value: Duration) -> Self {
                self.$name = value;
                self
            }
        )*
    };
}

impl AgentConfig {
    /// Set the routing daemon control socket path.
    pub fn bird_socket(mut self, path: impl Into<PathBuf>) -> Self {
        self.bird_socket = path.into();
        self
    }

    /// Set the AgentX master socket path.
    pub fn master_socket(mut self, path: impl Into<PathBuf>) -> Self {
        self.master_socket = path.into();
        self
    }

    /// Set the registration priority.
    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    duration_setters! {
        /// Set the refresh interval.
        refresh_interval,
        /// Set the daemon request timeout.
        daemon_timeout,
        /// Set the AgentX session timeout.
        agentx_timeout,
        /// Set the master reconnect delay.
        reconnect_interval,
    }

    /// The session timeout as the Open-PDU's one-octet seconds field.
    ///
    /// Saturates at 255 seconds.
    pub fn open_timeout_secs(&self) -> u8 {
        self.agentx_timeout.as_secs().min(u8::MAX as u64) as u8
    }
}
