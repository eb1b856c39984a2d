//! Handler types and traits for read-only MIB operations.
//!
//! This module provides the query side of the subagent:
//!
//! - [`MibHandler`] - Trait the AgentX session calls for Get, GetNext and GetBulk
//! - [`OidStore`] - Ordered OID store with exact and successor lookup
//! - [`SearchRange`] - A GETNEXT search range with optional upper bound
//! - [`SnapshotHandler`] - Handler answering from the published [`Snapshot`](crate::Snapshot)
//!
//! # Basic Handler Example
//!
//! A minimal handler over a fixed store:
//!
//! ```rust
//! use bird_bgp_agentx::handler::{MibHandler, OidStore, SearchRange};
//! use bird_bgp_agentx::{Oid, Value, VarBind, oid};
//!
//! struct Fixed(OidStore);
//!
//! impl MibHandler for Fixed {
//!     fn get(&self, oid: &Oid) -> VarBind {
//!         VarBind::new(oid.clone(), self.0.get(oid))
//!     }
//!
//!     fn get_next(&self, range: &SearchRange) -> VarBind {
//!         self.0.get_next(range)
//!     }
//! }
//!
//! let mut store = OidStore::new();
//! store.insert(oid!(1, 3, 6, 1, 2, 1, 15, 1, 0), Value::from("4"));
//! let handler = Fixed(store);
//!
//! let vb = handler.get_next(&SearchRange::after(oid!(1, 3, 6, 1, 2, 1, 15)));
//! assert_eq!(vb.value, Value::from("4"));
//! ```
//!
//! # Snapshots
//!
//! In the running subagent the handler is a [`SnapshotHandler`]. It clones the
//! current snapshot reference once per request, so every varbind of a
//! multi-varbind request is answered from the same data even if a refresh
//! publishes mid-request.

mod range;
mod snapshot;
mod store;
mod traits;

pub use range::SearchRange;
pub use snapshot::SnapshotHandler;
pub use store::OidStore;
pub(crate) use traits::bulk_walk;
pub use traits::MibHandler;
