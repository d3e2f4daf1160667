use state::{Clock, ExchangeOutcome, MetricsRecorder, StateManager};
use wire::lifecycle::{ExchangeIdArgs, ExchangeIdResult};
use wire::{Nfs4Status, XdrReader};

/// `EXCHGID4_FLAG_CONFIRMED_R`: set when the returned client id reuses an
/// already-confirmed record (the trunking/update case) rather than minting
/// a fresh unconfirmed one.
const EXCHGID4_FLAG_CONFIRMED_R: u32 = 0x0000_0004;

pub fn handle<C: Clock, M: MetricsRecorder>(
    state: &StateManager<C, M>,
    principal: &str,
    reader: &mut XdrReader,
) -> Result<ExchangeIdResult, Nfs4Status> {
    let args = ExchangeIdArgs::decode(reader).map_err(Nfs4Status::from)?;

    // SP4_NONE is state_protect_how == 0; anything else asks for SSV/machine
    // credential protection this core has no GSS machinery to provide. The
    // request's state-protect union may carry trailing fields we then never
    // read, but rejecting here always ends the COMPOUND, so the cursor
    // mismatch never matters for a later operation.
    if args.state_protect_how != 0 {
        return Err(Nfs4Status::NotSupp);
    }

    match state.exchange_id(args.client_owner, args.verifier, principal) {
        Ok(ExchangeOutcome::NewUnconfirmed(client_id)) => Ok(ExchangeIdResult {
            client_id: client_id.get(),
            sequence_id: 1,
            flags: 0,
        }),
        Ok(ExchangeOutcome::Update(client_id)) => Ok(ExchangeIdResult {
            client_id: client_id.get(),
            sequence_id: 1,
            flags: EXCHGID4_FLAG_CONFIRMED_R,
        }),
        Err(err) => Err(err.into()),
    }
}
