use state::{ClientId, Clock, MetricsRecorder, StateManager};
use wire::lifecycle::ReclaimCompleteArgs;
use wire::{Nfs4Status, XdrReader};

/// `one_fs` (RECLAIM_COMPLETE's per-filesystem variant) is accepted but not
/// distinguished from the whole-client case: this core tracks reclaim
/// completion once per client, not per filesystem.
pub fn handle<C: Clock, M: MetricsRecorder>(
    state: &StateManager<C, M>,
    client_id: ClientId,
    reader: &mut XdrReader,
) -> Result<(), Nfs4Status> {
    let ReclaimCompleteArgs { one_fs: _ } =
        ReclaimCompleteArgs::decode(reader).map_err(Nfs4Status::from)?;
    state.reclaim_complete(client_id).map_err(Nfs4Status::from)
}
