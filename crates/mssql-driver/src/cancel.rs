//! ATTENTION-based query cancellation.
//!
//! The driver is single-threaded and blocking-cooperative: there is no
//! background reader task, so `cancel()` is not a handle callable from
//! another task while the main thread blocks in `execute_query` — it is a
//! method a caller invokes on its own [`crate::client::Connection`], for
//! example from a signal handler or a watchdog thread holding its own
//! reference to the connection. It writes a zero-payload ATTENTION PDU and
//! then drains the receive stream, discarding tokens, until a DONE token
//! carries the ATTENTION-acknowledged status bit. This is a restricted
//! instance of the same token dispatch ordinary query execution uses, not a
//! separate parser.

use tds_protocol::token::{DispatchedToken, TokenDispatch};
use tds_protocol::PacketType;

use crate::error::Result;
use mssql_transport::Transport;

/// Result of draining the connection after sending ATTENTION.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The server acknowledged the cancellation (a DONE token with the
    /// ATTENTION bit set was observed).
    Acknowledged,
}

/// Send an ATTENTION PDU and drain the receive stream until the server
/// acknowledges the cancellation.
///
/// Tokens observed while draining (rows, further DONE tokens without the
/// ATTENTION bit, INFO/ERROR) are discarded; this restricted pass only
/// cares about reaching the acknowledgment.
pub(crate) fn cancel(
    transport: &mut dyn Transport,
    dispatch: &mut TokenDispatch,
) -> Result<CancelOutcome> {
    transport.send(PacketType::Attention)?;

    loop {
        let pdu = transport.receive_pdu()?;
        let mut acknowledged = false;
        dispatch.feed(pdu, |token| {
            if let DispatchedToken::Done(done) = token {
                if done.status.attn {
                    acknowledged = true;
                }
            }
        })?;
        if acknowledged {
            return Ok(CancelOutcome::Acknowledged);
        }
    }
}
