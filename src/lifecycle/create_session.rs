use state::{ChannelAttrs, ClientId, Clock, MetricsRecorder, StateManager};
use wire::lifecycle::{ChannelAttrsWire, CreateSessionArgs, CreateSessionResult};
use wire::{Nfs4Status, SessionHandle, XdrReader};

pub fn handle<C: Clock, M: MetricsRecorder>(
    state: &StateManager<C, M>,
    reader: &mut XdrReader,
) -> Result<CreateSessionResult, Nfs4Status> {
    let args = CreateSessionArgs::decode(reader).map_err(Nfs4Status::from)?;

    let fore_requested = from_wire(args.fore_chan);
    let back_requested = args.back_chan.map(from_wire);

    let result = state
        .create_session(
            ClientId(args.client_id),
            args.seqid,
            fore_requested,
            back_requested,
        )
        .map_err(Nfs4Status::from)?;

    Ok(CreateSessionResult {
        session_id: SessionHandle::new(state.boot_epoch(), result.session_id.get()),
        seqid: args.seqid,
        flags: 0,
        fore_chan: to_wire(result.fore),
        back_chan: result.back.map(to_wire),
    })
}

fn from_wire(wire: ChannelAttrsWire) -> ChannelAttrs {
    ChannelAttrs {
        max_request_size: wire.max_request_size,
        max_response_size: wire.max_response_size,
        max_ops: wire.max_ops,
        slot_count: wire.max_requests.max(1) as usize,
    }
}

fn to_wire(attrs: ChannelAttrs) -> ChannelAttrsWire {
    ChannelAttrsWire {
        header_pad_size: 0,
        max_request_size: attrs.max_request_size,
        max_response_size: attrs.max_response_size,
        max_response_size_cached: attrs.max_response_size,
        max_ops: attrs.max_ops,
        max_requests: attrs.slot_count as u32,
    }
}
