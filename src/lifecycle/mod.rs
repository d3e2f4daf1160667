//! One handler per session-management operation. Each takes the arguments
//! straight off the shared XDR cursor, drives [`state::StateManager`], and
//! returns either the encodable result body or the status to report —
//! never touching `reader`/`writer` beyond its own operation's bytes, since
//! the dispatcher relies on that to keep walking the rest of the COMPOUND.

pub mod bind_conn_to_session;
pub mod create_session;
pub mod destroy_clientid;
pub mod destroy_session;
pub mod exchange_id;
pub mod free_stateid;
pub mod reclaim_complete;
pub mod sequence;
pub mod test_stateid;

use state::{Clock, MetricsRecorder, SessionId, StateManager};
use wire::{Nfs4Status, SessionHandle};

/// Resolve a wire session handle to a live `SessionId`, rejecting handles
/// minted by a previous server boot before the registry lookup even runs.
fn session_id_from_handle<C: Clock, M: MetricsRecorder>(
    state: &StateManager<C, M>,
    handle: SessionHandle,
) -> Result<SessionId, Nfs4Status> {
    if handle.boot_epoch() != state.boot_epoch() {
        return Err(Nfs4Status::BadSession);
    }
    Ok(SessionId(handle.index()))
}
