use state::{ClientId, Clock, MetricsRecorder, StateManager};
use wire::lifecycle::DestroyClientIdArgs;
use wire::{Nfs4Status, XdrReader};

pub fn handle<C: Clock, M: MetricsRecorder>(
    state: &StateManager<C, M>,
    reader: &mut XdrReader,
) -> Result<(), Nfs4Status> {
    let args = DestroyClientIdArgs::decode(reader).map_err(Nfs4Status::from)?;
    state
        .destroy_clientid(ClientId(args.client_id))
        .map_err(Nfs4Status::from)
}
