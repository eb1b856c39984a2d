//! BIRD routing daemon access.
//!
//! - [`BirdClient`] speaks the control-socket protocol and implements
//!   [`DaemonClient`]
//! - [`parse_status`] and [`parse_protocols`] turn reply text into
//!   [`RouterStatus`] and [`BgpSession`] records

mod client;
mod model;
mod parse;

pub use client::{BirdClient, DaemonClient};
pub use model::{BgpSession, ChannelStats, RouterStatus};
pub use parse::{parse_protocols, parse_protocols_in, parse_status};

/// Command whose reply [`parse_status`] understands.
pub const SHOW_STATUS: &str = "show status";

/// Command whose reply [`parse_protocols`] understands.
pub const SHOW_PROTOCOLS_ALL: &str = "show protocols all";
