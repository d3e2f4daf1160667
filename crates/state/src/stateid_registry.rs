use ahash::{HashMap, HashMapExt};

use wire::{Stateid, StateidType};

use crate::error::{StateError, StateErrorKind, StateResult};
use crate::ids::{ClientId, IdAllocator, SessionId};

/// Registry entry backing one open, lock, or delegation stateid.
#[derive(Debug)]
pub struct StateidEntry {
    index: u64,
    kind: StateidType,
    seqid: u32,
    client_id: ClientId,
    session_id: SessionId,
    /// True for an open stateid with at least one byte-range lock still
    /// held under it, and for a delegation that has not yet been returned
    /// or revoked. Either case blocks FREE_STATEID.
    encumbered: bool,
    revoked: bool,
}

impl StateidEntry {
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn kind(&self) -> StateidType {
        self.kind
    }

    pub fn seqid(&self) -> u32 {
        self.seqid
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    pub fn is_encumbered(&self) -> bool {
        self.encumbered
    }
}

/// Client-, lock-, and delegation-stateid registry for one server boot
/// instance. Every stateid this registry mints carries `boot_epoch` in its
/// opaque "other" field, so a stateid from a previous server instance is
/// rejected as stale without a registry lookup at all.
pub struct StateidRegistry {
    boot_epoch: u32,
    entries: HashMap<u64, StateidEntry>,
    ids: IdAllocator,
}

impl StateidRegistry {
    pub fn new(boot_epoch: u32) -> Self {
        Self {
            boot_epoch,
            entries: HashMap::new(),
            ids: IdAllocator::default(),
        }
    }

    pub fn boot_epoch(&self) -> u32 {
        self.boot_epoch
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn mint(
        &mut self,
        kind: StateidType,
        client_id: ClientId,
        session_id: SessionId,
    ) -> Stateid {
        let index = self.ids.next();
        self.entries.insert(
            index,
            StateidEntry {
                index,
                kind,
                seqid: 1,
                client_id,
                session_id,
                encumbered: false,
                revoked: false,
            },
        );
        Stateid::new(kind, self.boot_epoch, index, 1)
    }

    pub fn get(&self, index: u64) -> Option<&StateidEntry> {
        self.entries.get(&index)
    }

    /// Validate a stateid presented by a client against this registry:
    /// reject special (all-zero / all-ones) ids, stale boot epochs, unknown
    /// indices, and seqid mismatches, in that order.
    ///
    /// A `seqid` of zero in the presented stateid is treated as "don't
    /// care" and always matches, since some operations reference whatever
    /// stateid a prior operation in the same COMPOUND produced without
    /// knowing its exact sequence number.
    pub fn validate(&self, stateid: &Stateid) -> StateResult<&StateidEntry> {
        if stateid.is_special() {
            return Err(StateError(StateErrorKind::BadStateid));
        }
        if stateid.boot_epoch() != self.boot_epoch {
            return Err(StateError(StateErrorKind::StaleStateid));
        }
        let entry = self
            .entries
            .get(&stateid.index())
            .ok_or(StateError(StateErrorKind::BadStateid))?;

        if entry.revoked {
            return Err(StateError(StateErrorKind::ExpiredStateid));
        }
        if stateid.seqid != 0 {
            if stateid.seqid < entry.seqid {
                return Err(StateError(StateErrorKind::OldStateid));
            }
            if stateid.seqid > entry.seqid {
                return Err(StateError(StateErrorKind::BadStateid));
            }
        }
        Ok(entry)
    }

    /// TEST_STATEID's per-item check: identical to `validate` but named for
    /// the call site that never mutates state off the back of it.
    pub fn test(&self, stateid: &Stateid) -> StateResult<()> {
        self.validate(stateid).map(|_| ())
    }

    /// Advance an entry's seqid by one and return the new wire stateid.
    /// Called whenever the state an entry represents changes shape (a lock
    /// range grows, a delegation gets upgraded).
    pub fn bump_seqid(&mut self, index: u64) -> StateResult<Stateid> {
        let entry = self
            .entries
            .get_mut(&index)
            .ok_or(StateError(StateErrorKind::BadStateid))?;
        entry.seqid = entry.seqid.wrapping_add(1);
        Ok(Stateid::new(
            entry.kind,
            self.boot_epoch,
            entry.index,
            entry.seqid,
        ))
    }

    pub fn set_encumbered(&mut self, index: u64, encumbered: bool) {
        if let Some(entry) = self.entries.get_mut(&index) {
            entry.encumbered = encumbered;
        }
    }

    pub fn revoke(&mut self, index: u64) {
        if let Some(entry) = self.entries.get_mut(&index) {
            entry.revoked = true;
            entry.encumbered = false;
        }
    }

    /// FREE_STATEID: validate, then reject an open stateid with locks still
    /// attached or a delegation not yet returned or revoked, then delete
    /// the entry outright. A freed index is never reused.
    pub fn free(&mut self, stateid: &Stateid) -> StateResult<()> {
        let entry = self.validate(stateid)?;
        if entry.encumbered {
            return Err(StateError(StateErrorKind::LocksHeld));
        }
        self.entries.remove(&stateid.index());
        Ok(())
    }

    pub fn entries_for_client(&self, client_id: ClientId) -> impl Iterator<Item = &StateidEntry> {
        self.entries.values().filter(move |e| e.client_id == client_id)
    }

    pub fn entries_for_session(&self, session_id: SessionId) -> impl Iterator<Item = &StateidEntry> {
        self.entries
            .values()
            .filter(move |e| e.session_id == session_id)
    }

    pub fn remove(&mut self, index: u64) {
        self.entries.remove(&index);
    }
}
