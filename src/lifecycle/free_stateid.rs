use state::{Clock, MetricsRecorder, StateManager};
use wire::lifecycle::FreeStateidArgs;
use wire::{Nfs4Status, XdrReader};

pub fn handle<C: Clock, M: MetricsRecorder>(
    state: &StateManager<C, M>,
    reader: &mut XdrReader,
) -> Result<(), Nfs4Status> {
    let args = FreeStateidArgs::decode(reader).map_err(Nfs4Status::from)?;
    state.free_stateid(&args.stateid).map_err(Nfs4Status::from)
}
