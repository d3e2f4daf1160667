use state::{Clock, MetricsRecorder, StateManager};
use wire::lifecycle::DestroySessionArgs;
use wire::{Nfs4Status, XdrReader};

use super::session_id_from_handle;

pub fn handle<C: Clock, M: MetricsRecorder>(
    state: &StateManager<C, M>,
    reader: &mut XdrReader,
) -> Result<(), Nfs4Status> {
    let args = DestroySessionArgs::decode(reader).map_err(Nfs4Status::from)?;
    let session_id = session_id_from_handle(state, args.session_id)?;
    state.destroy_session(session_id).map_err(Nfs4Status::from)
}
