//! SET-family handling (RFC 2741 §7.2.4).
//!
//! The master drives a SET as TestSet, then CommitSet or CleanupSet, then
//! UndoSet if a commit elsewhere failed. Everything this subagent serves is
//! read-only, so the test phase always refuses and the later phases only
//! ever arrive out of sequence.

use crate::agentx::{AgentxStatus, Pdu};
use crate::varbind::VarBind;

use super::Subagent;

impl<S> Subagent<S> {
    /// Answer a SET-family PDU. `None` means no Response is sent.
    pub(super) fn handle_set(&self, pdu: &Pdu) -> Option<Pdu> {
        let sys_uptime = self.sys_uptime();
        match pdu {
            Pdu::TestSet { varbinds } => Some(test_set(varbinds, sys_uptime)),
            Pdu::CommitSet => {
                tracing::debug!("CommitSet without an accepted TestSet");
                Some(Pdu::error_response(AgentxStatus::CommitFailed, 0, sys_uptime))
            }
            Pdu::UndoSet => Some(Pdu::error_response(AgentxStatus::UndoFailed, 0, sys_uptime)),
            // CleanupSet is never answered
            _ => None,
        }
    }
}

fn test_set(varbinds: &[VarBind], sys_uptime: u32) -> Pdu {
    match varbinds.first() {
        Some(first) => {
            tracing::debug!(agentx.oid = %first.oid, "refusing TestSet");
            Pdu::error_response(AgentxStatus::NotWritable, 1, sys_uptime)
        }
        None => Pdu::response(Vec::new(), sys_uptime),
    }
}
