use ahash::{HashSet, HashSetExt};

use crate::ids::ClientId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GracePhase {
    Active,
    Ended,
}

/// Reclaim-grace coordinator, one instance per server boot.
///
/// Grace starts active at construction and ends the first time either its
/// duration elapses or every client expected to reclaim has called
/// RECLAIM_COMPLETE, whichever comes first. The end transition fires its
/// caller-visible effect exactly once: once `phase` flips to `Ended` it
/// never flips back, so a reaper tick and an administrative force-end
/// racing each other cannot both report having ended it.
pub struct GracePeriodState {
    phase: GracePhase,
    started_at: u64,
    expires_at: u64,
    pending: HashSet<ClientId>,
}

impl GracePeriodState {
    pub fn new(now: u64, duration_secs: u64, expected_clients: impl IntoIterator<Item = ClientId>) -> Self {
        Self {
            phase: GracePhase::Active,
            started_at: now,
            expires_at: now.saturating_add(duration_secs),
            pending: expected_clients.into_iter().collect(),
        }
    }

    pub fn phase(&self) -> GracePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == GracePhase::Active
    }

    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, client_id: ClientId) -> bool {
        self.pending.contains(&client_id)
    }

    /// RECLAIM_COMPLETE for one client. A client not in the pending set
    /// (never registered, or already reclaimed) is not an error here —
    /// callers that need CompleteAlready semantics check `is_pending`
    /// themselves before calling this.
    pub fn record_reclaim_complete(&mut self, client_id: ClientId) {
        self.pending.remove(&client_id);
    }

    /// Re-check end conditions and transition if met. Returns `true` only
    /// on the call that actually performs the transition, so callers can
    /// use the return value to decide whether to run end-of-grace side
    /// effects (unblocking deferred locks, logging).
    pub fn tick(&mut self, now: u64) -> bool {
        if self.phase == GracePhase::Ended {
            return false;
        }
        if now >= self.expires_at || self.pending.is_empty() {
            self.phase = GracePhase::Ended;
            log::info!(
                "grace period ended: elapsed={} pending_at_end={}",
                now.saturating_sub(self.started_at),
                self.pending.len()
            );
            return true;
        }
        false
    }

    /// Administrative force-end, bypassing both the duration and pending
    /// count. Still only fires the transition once.
    pub fn force_end(&mut self, now: u64) -> bool {
        if self.phase == GracePhase::Ended {
            return false;
        }
        self.phase = GracePhase::Ended;
        log::warn!(
            "grace period force-ended: elapsed={} pending_at_end={}",
            now.saturating_sub(self.started_at),
            self.pending.len()
        );
        true
    }
}
