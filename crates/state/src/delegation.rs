use ahash::{HashMap, HashMapExt};

use crate::error::{StateError, StateErrorKind, StateResult};
use crate::ids::{ClientId, SessionId};

/// Delegation recall lifecycle, tracked alongside the delegation's entry in
/// the stateid registry. A delegation starts `Granted`; a conflicting
/// access from another client moves it to `Recalling` and arms a deadline;
/// the owning client answers with DELEGRETURN (moving it to `Returned`,
/// which callers then free from the stateid registry) or lets the deadline
/// pass, at which point the reaper revokes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecallState {
    Granted,
    Recalling { deadline: u64 },
    Returned,
    Revoked,
}

pub struct Delegation {
    stateid_index: u64,
    client_id: ClientId,
    session_id: SessionId,
    is_write: bool,
    state: RecallState,
}

impl Delegation {
    pub fn stateid_index(&self) -> u64 {
        self.stateid_index
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn is_write(&self) -> bool {
        self.is_write
    }

    pub fn state(&self) -> RecallState {
        self.state
    }

    pub fn is_recalling(&self) -> bool {
        matches!(self.state, RecallState::Recalling { .. })
    }
}

/// Registry of outstanding delegations, keyed by the index of their
/// backing stateid. Kept separate from [`crate::stateid_registry`] since a
/// delegation has its own recall state machine that open and lock
/// stateids do not.
#[derive(Default)]
pub struct DelegationRegistry {
    by_index: HashMap<u64, Delegation>,
}

impl DelegationRegistry {
    pub fn new() -> Self {
        Self {
            by_index: HashMap::new(),
        }
    }

    pub fn grant(
        &mut self,
        stateid_index: u64,
        client_id: ClientId,
        session_id: SessionId,
        is_write: bool,
    ) {
        self.by_index.insert(
            stateid_index,
            Delegation {
                stateid_index,
                client_id,
                session_id,
                is_write,
                state: RecallState::Granted,
            },
        );
    }

    pub fn get(&self, stateid_index: u64) -> Option<&Delegation> {
        self.by_index.get(&stateid_index)
    }

    pub fn for_client(&self, client_id: ClientId) -> impl Iterator<Item = &Delegation> {
        self.by_index.values().filter(move |d| d.client_id == client_id)
    }

    /// Begin recall: a back-channel CB_RECALL is about to be sent, with the
    /// given absolute deadline after which the reaper may revoke instead of
    /// waiting further.
    pub fn begin_recall(&mut self, stateid_index: u64, deadline: u64) -> StateResult<()> {
        let deleg = self
            .by_index
            .get_mut(&stateid_index)
            .ok_or(StateError(StateErrorKind::BadStateid))?;
        deleg.state = RecallState::Recalling { deadline };
        Ok(())
    }

    /// The client answered with DELEGRETURN. Marks the delegation returned
    /// but does not remove it: the caller still needs to free the backing
    /// stateid in the stateid registry, after which the delegation record
    /// itself is dropped via `remove`.
    pub fn mark_returned(&mut self, stateid_index: u64) -> StateResult<()> {
        let deleg = self
            .by_index
            .get_mut(&stateid_index)
            .ok_or(StateError(StateErrorKind::BadStateid))?;
        deleg.state = RecallState::Returned;
        Ok(())
    }

    pub fn revoke(&mut self, stateid_index: u64) {
        if let Some(deleg) = self.by_index.get_mut(&stateid_index) {
            deleg.state = RecallState::Revoked;
        }
    }

    pub fn remove(&mut self, stateid_index: u64) -> Option<Delegation> {
        self.by_index.remove(&stateid_index)
    }

    /// Delegations still in `Recalling` whose deadline has passed, for the
    /// reaper to revoke.
    pub fn overdue_recalls(&self, now: u64) -> impl Iterator<Item = u64> + '_ {
        self.by_index.values().filter_map(move |d| match d.state {
            RecallState::Recalling { deadline } if now >= deadline => Some(d.stateid_index),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_starts_in_granted_state() {
        let mut reg = DelegationRegistry::new();
        reg.grant(1, ClientId(1), SessionId(1), false);
        assert_eq!(reg.get(1).unwrap().state(), RecallState::Granted);
    }

    #[test]
    fn recall_then_return_clears_recalling_flag() {
        let mut reg = DelegationRegistry::new();
        reg.grant(1, ClientId(1), SessionId(1), true);
        reg.begin_recall(1, 100).unwrap();
        assert!(reg.get(1).unwrap().is_recalling());

        reg.mark_returned(1).unwrap();
        assert!(!reg.get(1).unwrap().is_recalling());
        assert_eq!(reg.get(1).unwrap().state(), RecallState::Returned);
    }

    #[test]
    fn overdue_recalls_are_reported_once_deadline_passes() {
        let mut reg = DelegationRegistry::new();
        reg.grant(1, ClientId(1), SessionId(1), false);
        reg.begin_recall(1, 100).unwrap();

        assert_eq!(reg.overdue_recalls(50).count(), 0);
        assert_eq!(reg.overdue_recalls(100).collect::<Vec<_>>(), vec![1]);

        reg.revoke(1);
        assert_eq!(reg.get(1).unwrap().state(), RecallState::Revoked);
        assert_eq!(reg.overdue_recalls(200).count(), 0);
    }
}
