//! Prelude module for convenient imports.
//!
//! ```rust,no_run
//! use bird_bgp_agentx::prelude::*;
//! ```
//!
//! This imports:
//! - Core types: [`Oid`], [`Value`], [`VarBind`], [`Snapshot`], [`SnapshotCell`]
//! - Daemon access: [`BirdClient`], [`DaemonClient`]
//! - Query side: [`MibHandler`], [`SearchRange`], [`SnapshotHandler`]
//! - Error handling: [`Error`], [`Result`]
//! - The [`oid!`] macro for compile-time OID construction

pub use crate::agent::Subagent;
pub use crate::bird::{BirdClient, DaemonClient};
pub use crate::config::AgentConfig;
pub use crate::error::{Error, Result};
pub use crate::handler::{MibHandler, SearchRange, SnapshotHandler};
pub use crate::oid::Oid;
pub use crate::refresh::Refresher;
pub use crate::snapshot::{Snapshot, SnapshotCell};
pub use crate::value::Value;
pub use crate::varbind::VarBind;

#[doc(no_inline)]
pub use crate::oid;
