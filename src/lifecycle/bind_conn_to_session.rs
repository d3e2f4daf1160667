use state::{Clock, ConnId, ConnTransport, DirectionRequest, MetricsRecorder, StateManager};
use wire::lifecycle::{BindConnToSessionArgs, BindConnToSessionResult, RequestedDirection};
use wire::{Nfs4Status, XdrReader};

use super::session_id_from_handle;

fn to_direction_request(direction: RequestedDirection) -> DirectionRequest {
    match direction {
        RequestedDirection::Fore => DirectionRequest::Fore,
        RequestedDirection::Back => DirectionRequest::Back,
        RequestedDirection::Both => DirectionRequest::Both,
    }
}

pub fn handle<C: Clock, M: MetricsRecorder>(
    state: &StateManager<C, M>,
    conn_id: ConnId,
    reader: &mut XdrReader,
) -> Result<BindConnToSessionResult, Nfs4Status> {
    let args = BindConnToSessionArgs::decode(reader).map_err(Nfs4Status::from)?;
    let session_id = session_id_from_handle(state, args.session_id)?;

    let transport = if args.use_rdma {
        ConnTransport::Rdma
    } else {
        ConnTransport::Tcp
    };

    let direction = state
        .bind_connection(conn_id, session_id, transport, to_direction_request(args.direction))
        .map_err(Nfs4Status::from)?;

    Ok(BindConnToSessionResult {
        session_id: args.session_id,
        granted_both: direction.carries_back(),
        use_rdma: args.use_rdma,
    })
}
