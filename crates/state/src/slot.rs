use std::sync::atomic::{AtomicBool, Ordering};

use wire::Nfs4Status;

/// One entry in a session's fore- or back-channel slot table.
///
/// The in-flight flag is a per-slot atomic so a concurrent SEQUENCE on the
/// *same* slot can be rejected with `Delay` without taking the registry
/// lock at all, and without holding any lock across handler execution.
#[derive(Debug)]
pub struct Slot {
    in_flight: AtomicBool,
    highest: u32,
    cached: Option<(Vec<u8>, Nfs4Status)>,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            in_flight: AtomicBool::new(false),
            highest: 0,
            cached: None,
        }
    }
}

impl Slot {
    pub fn highest(&self) -> u32 {
        self.highest
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn try_mark_in_flight(&self) -> bool {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn clear_in_flight(&self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

/// The outcome of a SEQUENCE lookup against a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotDecision {
    NewRequest,
    CachedReply(Vec<u8>, Nfs4Status),
    /// Covers both the "older" and "gap" rows of the decision table: both
    /// are NFS4ERR_SEQ_MISORDERED.
    Misordered,
    BadSlot,
    /// Slot is mid-request; caller should retry. Distinct from
    /// `RetryUncachedRep`, which means the *same* request is still being
    /// processed but has not yet produced a cached reply.
    Delay,
    RetryUncachedRep,
}

/// Fixed-size array of slots for one channel direction of one session.
#[derive(Debug)]
pub struct SlotTable {
    slots: Vec<Slot>,
}

impl SlotTable {
    pub fn new(size: usize) -> Self {
        Self {
            slots: (0..size).map(|_| Slot::default()).collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Apply the SEQUENCE decision table to one slot. Does not renew the
    /// client's lease or touch connection bookkeeping — callers layer that
    /// on top once a `NewRequest`/`CachedReply` decision is reached, since
    /// those effects belong to the session/client, not the slot.
    pub fn apply_sequence(&self, slot_id: usize, sequence_id: u32) -> SlotDecision {
        let Some(slot) = self.slots.get(slot_id) else {
            return SlotDecision::BadSlot;
        };

        let highest = slot.highest();

        if sequence_id == highest.wrapping_add(1) {
            if !slot.try_mark_in_flight() {
                return SlotDecision::Delay;
            }
            return SlotDecision::NewRequest;
        }

        if sequence_id == highest {
            return match &slot.cached {
                Some((bytes, status)) => SlotDecision::CachedReply(bytes.clone(), *status),
                None => SlotDecision::RetryUncachedRep,
            };
        }

        SlotDecision::Misordered
    }

    /// Commit the result of a `NewRequest` decision: advance `highest`,
    /// store the cached reply (if requested), and clear the in-flight flag.
    pub fn complete(&mut self, slot_id: usize, reply: Vec<u8>, status: Nfs4Status, cache: bool) {
        let Some(slot) = self.slots.get_mut(slot_id) else {
            return;
        };

        slot.highest = slot.highest.wrapping_add(1);
        slot.cached = if cache { Some((reply, status)) } else { None };
        slot.clear_in_flight();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_slot_accepts_seq_one() {
        let table = SlotTable::new(4);
        assert_eq!(table.apply_sequence(0, 1), SlotDecision::NewRequest);
    }

    #[test]
    fn in_flight_slot_delays_same_slot() {
        let table = SlotTable::new(4);
        assert_eq!(table.apply_sequence(0, 1), SlotDecision::NewRequest);
        // A second SEQUENCE for the same request (identical seqid) while the
        // first is still being processed must DELAY, not be treated as a
        // new or misordered request.
        assert_eq!(table.apply_sequence(0, 1), SlotDecision::Delay);
    }

    #[test]
    fn replay_returns_byte_identical_cache() {
        let mut table = SlotTable::new(4);
        assert_eq!(table.apply_sequence(0, 1), SlotDecision::NewRequest);
        table.complete(0, b"reply-bytes".to_vec(), Nfs4Status::Ok, true);

        match table.apply_sequence(0, 1) {
            SlotDecision::CachedReply(bytes, status) => {
                assert_eq!(bytes, b"reply-bytes");
                assert_eq!(status, Nfs4Status::Ok);
            }
            other => panic!("expected CachedReply, got {other:?}"),
        }
    }

    #[test]
    fn retry_of_an_uncached_completed_request_is_retry_uncached_rep() {
        let mut table = SlotTable::new(4);
        assert_eq!(table.apply_sequence(0, 1), SlotDecision::NewRequest);
        // Completed without caching a reply (an op the replay cache never
        // stores a result for), then the same seqid comes in again.
        table.complete(0, vec![], Nfs4Status::Ok, false);
        assert_eq!(table.apply_sequence(0, 1), SlotDecision::RetryUncachedRep);
    }

    #[test]
    fn older_and_gap_sequence_ids_are_misordered() {
        let mut table = SlotTable::new(4);
        table.apply_sequence(0, 1);
        table.complete(0, vec![], Nfs4Status::Ok, false);

        assert_eq!(table.apply_sequence(0, 0), SlotDecision::Misordered);
        assert_eq!(table.apply_sequence(0, 5), SlotDecision::Misordered);
    }

    #[test]
    fn out_of_range_slot_is_bad_slot() {
        let table = SlotTable::new(2);
        assert_eq!(table.apply_sequence(5, 1), SlotDecision::BadSlot);
    }
}
