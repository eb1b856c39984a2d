//! # bird-bgp-agentx
//!
//! AgentX subagent that publishes BGP session state from the BIRD routing
//! daemon as the read-only BGP4-MIB subtree `1.3.6.1.2.1.15`.
//!
//! # How it fits together
//!
//! ```text
//!   BIRD control socket          AgentX master (snmpd)
//!          ^                            |
//!          | show status                | Get / GetNext / GetBulk
//!          | show protocols all         v
//!   +-------------+  publish   +--------------+   load   +-----------------+
//!   |  Refresher  | ---------> | SnapshotCell | <------- | SnapshotHandler |
//!   +-------------+            +--------------+          +-----------------+
//! ```
//!
//! - [`refresh::Refresher`] polls the daemon every refresh interval, parses
//!   the replies ([`bird`]), lays them onto the MIB ([`mib`]) and publishes a
//!   new [`Snapshot`]. A failed cycle leaves the previous snapshot in place.
//! - [`agent::Subagent`] holds the AgentX session and answers the master's
//!   queries through a [`MibHandler`](handler::MibHandler).
//! - Queries never block refreshes and never see a half-built snapshot.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bird_bgp_agentx::{AgentConfig, BirdClient};
//! use bird_bgp_agentx::agent::Subagent;
//! use bird_bgp_agentx::handler::SnapshotHandler;
//! use bird_bgp_agentx::refresh::Refresher;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> bird_bgp_agentx::Result<()> {
//! let config = AgentConfig::default();
//! let client = BirdClient::new(&config.bird_socket, config.daemon_timeout);
//!
//! // The first snapshot must succeed; there is nothing to serve without it.
//! let refresher = Refresher::start(client).await?;
//! let handler = SnapshotHandler::new(Arc::clone(refresher.cell()));
//!
//! let cancel = CancellationToken::new();
//! tokio::spawn(refresher.run(config.refresh_interval, cancel.clone()));
//!
//! let session = Subagent::connect(&config).await?;
//! session.serve(&handler, cancel).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Dumping a snapshot
//!
//! With the `cli` feature, `bird-bgp-agentx --once` polls the daemon a single
//! time and prints the MIB without touching AgentX.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod agent;
pub mod agentx;
pub mod bird;
pub mod config;
pub mod error;
pub mod handler;
pub mod mib;
pub mod oid;
pub mod prelude;
pub mod refresh;
pub mod snapshot;
pub mod value;
pub mod varbind;

#[cfg(feature = "cli")]
#[cfg_attr(docsrs, doc(cfg(feature = "cli")))]
pub mod cli;

pub use bird::{BirdClient, DaemonClient};
pub use config::AgentConfig;
pub use error::{Error, Result};
pub use oid::Oid;
pub use snapshot::{Snapshot, SnapshotCell};
pub use value::Value;
pub use varbind::VarBind;
