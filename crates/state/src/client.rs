use ahash::{HashMap, HashSet, HashMapExt, HashSetExt};

use crate::error::{StateError, StateErrorKind, StateResult};
use crate::ids::{ClientId, IdAllocator, SessionId};

/// A single EXCHANGE_ID-negotiated client record.
///
/// `owner`/`verifier` together identify one client instance across
/// reconnects: a client that reboots presents the same `owner` with a new
/// `verifier`, which is how the registry tells a restart apart from a
/// second concurrent client sharing an owner string by coincidence.
pub struct Client {
    id: ClientId,
    owner: Vec<u8>,
    verifier: [u8; 8],
    principal: String,
    confirmed: bool,
    reclaim_complete: bool,
    created_at: u64,
    last_renewal: u64,
    sessions: HashSet<SessionId>,
    next_cs_seqid: u32,
}

impl Client {
    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn owner(&self) -> &[u8] {
        &self.owner
    }

    pub fn verifier(&self) -> [u8; 8] {
        self.verifier
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn reclaim_complete(&self) -> bool {
        self.reclaim_complete
    }

    pub fn set_reclaim_complete(&mut self) {
        self.reclaim_complete = true;
    }

    pub fn last_renewal(&self) -> u64 {
        self.last_renewal
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn sessions(&self) -> impl Iterator<Item = SessionId> + '_ {
        self.sessions.iter().copied()
    }

    pub fn has_expired(&self, now: u64, lease_seconds: u64) -> bool {
        now.saturating_sub(self.last_renewal) >= lease_seconds
    }
}

/// CREATE_SESSION carries its own per-client sequence number, independent
/// of any session's slot tables (which do not exist yet when the first
/// CREATE_SESSION for a client arrives). Tracked on the client record so
/// EXCHANGE_ID's owner-replace path resets it along with everything else.
impl ClientRegistry {
    pub fn expected_create_session_seqid(&self, id: ClientId) -> StateResult<u32> {
        Ok(self
            .get(id)
            .ok_or(StateError(StateErrorKind::StaleClientId))?
            .next_cs_seqid)
    }

    pub fn advance_create_session_seqid(&mut self, id: ClientId) -> StateResult<()> {
        let client = self
            .get_mut(id)
            .ok_or(StateError(StateErrorKind::StaleClientId))?;
        client.next_cs_seqid = client.next_cs_seqid.wrapping_add(1);
        Ok(())
    }
}

/// Outcome of matching an EXCHANGE_ID request against the registry.
/// Mirrors the three cases this core actually distinguishes; the fuller
/// RFC 8881 case table collapses principal mismatches and verifier
/// mismatches under the same `InUse` rejection, since both represent a
/// caller asking to take over an identity with state still attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// No confirmed record for this owner existed, or a matching
    /// unconfirmed one was replaced outright.
    NewUnconfirmed(ClientId),
    /// The same client reconnected with an identical verifier: this is the
    /// trunking/update case, the existing id is reused unchanged.
    Update(ClientId),
}

/// Registry of client records keyed by `ClientId`, with a secondary index
/// on `co_ownerid` to support EXCHANGE_ID's replace/update/reject logic
/// without a linear scan.
#[derive(Default)]
pub struct ClientRegistry {
    by_id: HashMap<ClientId, Client>,
    by_owner: HashMap<Vec<u8>, ClientId>,
    ids: IdAllocator,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            by_owner: HashMap::new(),
            ids: IdAllocator::default(),
        }
    }

    pub fn get(&self, id: ClientId) -> Option<&Client> {
        self.by_id.get(&id)
    }

    pub fn get_mut(&mut self, id: ClientId) -> Option<&mut Client> {
        self.by_id.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Client> {
        self.by_id.values()
    }

    /// Handle one EXCHANGE_ID request.
    ///
    /// Replaces an existing record for the same owner when it is
    /// unconfirmed (a client that never finished CREATE_SESSION gets no
    /// protection against being superseded), or when it is confirmed but
    /// carries no live sessions (a clean client restart). A confirmed
    /// record presenting a new verifier for the same owner and principal is
    /// a reboot: it replaces the old record unconditionally, and the
    /// returned `ClientId` is the old one's, so the caller can purge its
    /// sessions and state from the other registries. A confirmed record
    /// with live sessions and a *different* principal is rejected with
    /// `ClientIdInUse`: the caller must wait out the old lease or the
    /// administrator must evict it explicitly.
    pub fn exchange_id(
        &mut self,
        owner: Vec<u8>,
        verifier: [u8; 8],
        principal: &str,
        now: u64,
    ) -> StateResult<(ExchangeOutcome, Option<ClientId>)> {
        if let Some(&existing_id) = self.by_owner.get(&owner) {
            let existing = self
                .by_id
                .get(&existing_id)
                .expect("owner index points at a live client");

            if existing.confirmed {
                if existing.verifier == verifier && existing.principal == principal {
                    return Ok((ExchangeOutcome::Update(existing_id), None));
                }
                if existing.principal != principal && existing.session_count() > 0 {
                    return Err(StateError(StateErrorKind::ClientIdInUse));
                }
                if existing.session_count() > 0 {
                    // Same owner and principal, new verifier, with live
                    // sessions: a reboot. The caller purges `existing_id`'s
                    // sessions and state; leave its record in place until
                    // then so that teardown can still read it.
                    let id = self.mint(owner, verifier, principal, now);
                    return Ok((ExchangeOutcome::NewUnconfirmed(id), Some(existing_id)));
                }
            }

            self.by_id.remove(&existing_id);
        }

        let id = self.mint(owner, verifier, principal, now);
        Ok((ExchangeOutcome::NewUnconfirmed(id), None))
    }

    fn mint(&mut self, owner: Vec<u8>, verifier: [u8; 8], principal: &str, now: u64) -> ClientId {
        let id = ClientId(self.ids.next());
        self.by_owner.insert(owner.clone(), id);
        self.by_id.insert(
            id,
            Client {
                id,
                owner,
                verifier,
                principal: principal.to_owned(),
                confirmed: false,
                reclaim_complete: false,
                created_at: now,
                last_renewal: now,
                sessions: HashSet::new(),
                next_cs_seqid: 1,
            },
        );
        id
    }

    /// Mark a client confirmed once its first CREATE_SESSION succeeds with
    /// the expected sequence id.
    pub fn confirm(&mut self, id: ClientId, now: u64) -> StateResult<()> {
        let client = self
            .by_id
            .get_mut(&id)
            .ok_or(StateError(StateErrorKind::StaleClientId))?;
        client.confirmed = true;
        client.last_renewal = now;
        Ok(())
    }

    pub fn touch(&mut self, id: ClientId, now: u64) -> StateResult<()> {
        let client = self
            .by_id
            .get_mut(&id)
            .ok_or(StateError(StateErrorKind::StaleClientId))?;
        client.last_renewal = now;
        Ok(())
    }

    pub fn attach_session(&mut self, id: ClientId, session: SessionId) -> StateResult<()> {
        let client = self
            .by_id
            .get_mut(&id)
            .ok_or(StateError(StateErrorKind::StaleClientId))?;
        client.sessions.insert(session);
        Ok(())
    }

    pub fn detach_session(&mut self, id: ClientId, session: SessionId) {
        if let Some(client) = self.by_id.get_mut(&id) {
            client.sessions.remove(&session);
        }
    }

    /// Destroy a client record outright. Refuses while any session remains
    /// attached, mirroring DESTROY_CLIENTID's CLID_BUSY case.
    pub fn destroy(&mut self, id: ClientId) -> StateResult<()> {
        let client = self
            .by_id
            .get(&id)
            .ok_or(StateError(StateErrorKind::StaleClientId))?;
        if client.session_count() > 0 {
            return Err(StateError(StateErrorKind::ClientIdBusy));
        }
        let owner = client.owner.clone();
        self.by_id.remove(&id);
        self.by_owner.remove(&owner);
        Ok(())
    }

    /// Forcibly remove a client and its owner index entry regardless of
    /// attached sessions, for use once the caller has already torn down
    /// those sessions itself (lease expiry, administrative eviction).
    pub fn remove_unconditionally(&mut self, id: ClientId) -> Option<Client> {
        let client = self.by_id.remove(&id)?;
        self.by_owner.remove(&client.owner);
        Some(client)
    }

    pub fn created_at(&self, id: ClientId) -> Option<u64> {
        self.by_id.get(&id).map(|c| c.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_owner_creates_unconfirmed_client() {
        let mut reg = ClientRegistry::new();
        let (outcome, purge) = reg
            .exchange_id(b"owner-a".to_vec(), [1; 8], "user@realm", 0)
            .unwrap();
        assert!(purge.is_none());
        match outcome {
            ExchangeOutcome::NewUnconfirmed(id) => {
                assert!(!reg.get(id).unwrap().is_confirmed());
            }
            other => panic!("expected NewUnconfirmed, got {other:?}"),
        }
    }

    #[test]
    fn same_owner_and_verifier_after_confirm_is_update() {
        let mut reg = ClientRegistry::new();
        let id = match reg
            .exchange_id(b"owner-a".to_vec(), [1; 8], "user@realm", 0)
            .unwrap()
            .0
        {
            ExchangeOutcome::NewUnconfirmed(id) => id,
            _ => unreachable!(),
        };
        reg.confirm(id, 0).unwrap();

        let (outcome, purge) = reg
            .exchange_id(b"owner-a".to_vec(), [1; 8], "user@realm", 10)
            .unwrap();
        assert_eq!(outcome, ExchangeOutcome::Update(id));
        assert!(purge.is_none());
    }

    #[test]
    fn reboot_with_no_sessions_replaces_confirmed_client() {
        let mut reg = ClientRegistry::new();
        let old = match reg
            .exchange_id(b"owner-a".to_vec(), [1; 8], "user@realm", 0)
            .unwrap()
            .0
        {
            ExchangeOutcome::NewUnconfirmed(id) => id,
            _ => unreachable!(),
        };
        reg.confirm(old, 0).unwrap();

        let (outcome, purge) = reg
            .exchange_id(b"owner-a".to_vec(), [2; 8], "user@realm", 10)
            .unwrap();
        assert!(purge.is_none());
        match outcome {
            ExchangeOutcome::NewUnconfirmed(new_id) => assert_ne!(new_id, old),
            other => panic!("expected NewUnconfirmed, got {other:?}"),
        }
        assert!(reg.get(old).is_none());
    }

    #[test]
    fn reboot_with_live_sessions_replaces_and_reports_purge() {
        let mut reg = ClientRegistry::new();
        let old = match reg
            .exchange_id(b"owner-a".to_vec(), [1; 8], "user@realm", 0)
            .unwrap()
            .0
        {
            ExchangeOutcome::NewUnconfirmed(id) => id,
            _ => unreachable!(),
        };
        reg.confirm(old, 0).unwrap();
        reg.attach_session(old, SessionId(1)).unwrap();

        let (outcome, purge) = reg
            .exchange_id(b"owner-a".to_vec(), [2; 8], "user@realm", 10)
            .unwrap();
        assert_eq!(purge, Some(old));
        match outcome {
            ExchangeOutcome::NewUnconfirmed(new_id) => assert_ne!(new_id, old),
            other => panic!("expected NewUnconfirmed, got {other:?}"),
        }
        // The old record is left in place for the caller to tear down via
        // the reported `purge` id; it is not removed here.
        assert!(reg.get(old).is_some());
    }

    #[test]
    fn reboot_with_live_sessions_and_different_principal_is_rejected() {
        let mut reg = ClientRegistry::new();
        let old = match reg
            .exchange_id(b"owner-a".to_vec(), [1; 8], "user@realm", 0)
            .unwrap()
            .0
        {
            ExchangeOutcome::NewUnconfirmed(id) => id,
            _ => unreachable!(),
        };
        reg.confirm(old, 0).unwrap();
        reg.attach_session(old, SessionId(1)).unwrap();

        let err = reg
            .exchange_id(b"owner-a".to_vec(), [2; 8], "someone-else@realm", 10)
            .unwrap_err();
        assert_eq!(err.kind(), StateErrorKind::ClientIdInUse);
    }

    #[test]
    fn destroy_refuses_while_sessions_attached() {
        let mut reg = ClientRegistry::new();
        let id = match reg
            .exchange_id(b"owner-a".to_vec(), [1; 8], "user@realm", 0)
            .unwrap()
            .0
        {
            ExchangeOutcome::NewUnconfirmed(id) => id,
            _ => unreachable!(),
        };
        reg.attach_session(id, SessionId(1)).unwrap();

        let err = reg.destroy(id).unwrap_err();
        assert_eq!(err.kind(), StateErrorKind::ClientIdBusy);

        reg.detach_session(id, SessionId(1));
        reg.destroy(id).unwrap();
        assert!(reg.get(id).is_none());
    }

    #[test]
    fn lease_expiry_is_relative_to_last_renewal() {
        let mut reg = ClientRegistry::new();
        let id = match reg
            .exchange_id(b"owner-a".to_vec(), [1; 8], "user@realm", 100)
            .unwrap()
            .0
        {
            ExchangeOutcome::NewUnconfirmed(id) => id,
            _ => unreachable!(),
        };
        let client = reg.get(id).unwrap();
        assert!(!client.has_expired(189, 90));
        assert!(client.has_expired(190, 90));
    }
}
