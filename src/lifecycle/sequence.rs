use state::{Clock, ConnId, MetricsRecorder, SessionId, SlotDecisionSummary, StateManager};
use wire::lifecycle::{SequenceArgs, SequenceResult};
use wire::{Nfs4Status, XdrReader};

use super::session_id_from_handle;

/// What the dispatcher should do after SEQUENCE runs. Unlike every other
/// lifecycle op, SEQUENCE's outcome controls whether the rest of the
/// COMPOUND executes at all, so it cannot be reduced to a plain
/// `Result<_, Nfs4Status>`.
pub enum SequenceDecision {
    /// A retransmission of an already-completed request: the entire cached
    /// COMPOUND4res should be returned verbatim, skipping every other op.
    Replayed { reply: Vec<u8>, status: Nfs4Status },
    /// A fresh request. The dispatcher should keep processing the
    /// COMPOUND's remaining operations, and remember `session_id`/`slot_id`
    /// so the final reply gets cached via `complete_sequence`.
    Proceed {
        session_id: SessionId,
        slot_id: usize,
        cache_this: bool,
        client_id: state::ClientId,
        result: SequenceResult,
    },
    /// The slot table rejected this sequence id outright; the COMPOUND
    /// stops here with no further ops processed.
    Rejected(Nfs4Status),
}

pub fn handle<C: Clock, M: MetricsRecorder>(
    state: &StateManager<C, M>,
    reader: &mut XdrReader,
    conn_id: ConnId,
) -> SequenceDecision {
    let args = match SequenceArgs::decode(reader) {
        Ok(args) => args,
        Err(err) => return SequenceDecision::Rejected(err.into()),
    };
    let session_id = match session_id_from_handle(state, args.session_id) {
        Ok(id) => id,
        Err(status) => return SequenceDecision::Rejected(status),
    };
    let slot_id = args.slot_id as usize;

    let outcome = match state.sequence(session_id, slot_id, args.sequence_id, args.highest_slot_id, conn_id) {
        Ok(outcome) => outcome,
        Err(err) => return SequenceDecision::Rejected(err.into()),
    };

    match outcome.decision {
        SlotDecisionSummary::NewRequest => SequenceDecision::Proceed {
            session_id,
            slot_id,
            cache_this: args.cache_this,
            client_id: outcome.client_id,
            result: SequenceResult {
                session_id: args.session_id,
                sequence_id: args.sequence_id,
                slot_id: args.slot_id,
                highest_slot_id: outcome.highest_slot_id,
                target_highest_slot_id: outcome.highest_slot_id,
                status_flags: 0,
            },
        },
        SlotDecisionSummary::CachedReply => match state.replay(session_id, slot_id, args.sequence_id) {
            Some((reply, status)) => SequenceDecision::Replayed { reply, status },
            None => SequenceDecision::Rejected(Nfs4Status::SeqMisordered),
        },
        SlotDecisionSummary::Misordered => SequenceDecision::Rejected(Nfs4Status::SeqMisordered),
        SlotDecisionSummary::BadSlot => SequenceDecision::Rejected(Nfs4Status::BadSlot),
        SlotDecisionSummary::Delay => SequenceDecision::Rejected(Nfs4Status::Delay),
        SlotDecisionSummary::RetryUncachedRep => SequenceDecision::Rejected(Nfs4Status::RetryUncachedRep),
        // The connection this COMPOUND arrived on is draining: stop here
        // with DELAY so the client retries on another connection, without
        // running the rest of the COMPOUND.
        SlotDecisionSummary::Draining => SequenceDecision::Rejected(Nfs4Status::Delay),
    }
}
