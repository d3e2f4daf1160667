use ahash::{HashMap, HashMapExt, HashSet, HashSetExt};

use crate::error::{StateError, StateErrorKind, StateResult};
use crate::ids::{ClientId, ConnId, IdAllocator, SessionId};
use crate::slot::SlotTable;

/// Channel attributes negotiated at CREATE_SESSION, independently for the
/// fore and back channels. Values are clamped server-side rather than
/// rejected outright: a client asking for a bigger slot table than the
/// server will run gets the server's maximum instead of an error.
#[derive(Debug, Clone, Copy)]
pub struct ChannelAttrs {
    pub max_request_size: u32,
    pub max_response_size: u32,
    pub max_ops: u32,
    pub slot_count: usize,
}

impl ChannelAttrs {
    pub fn negotiate(requested: ChannelAttrs, server_max: ChannelAttrs) -> ChannelAttrs {
        ChannelAttrs {
            max_request_size: requested.max_request_size.min(server_max.max_request_size),
            max_response_size: requested
                .max_response_size
                .min(server_max.max_response_size),
            max_ops: requested.max_ops.min(server_max.max_ops),
            slot_count: requested.slot_count.min(server_max.slot_count).max(1),
        }
    }
}

/// One NFSv4.1 session: a client-visible handle bound to a slot table pair
/// and, over its lifetime, to zero or more connections.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    client_id: ClientId,
    fore: SlotTable,
    back: Option<SlotTable>,
    back_channel_ready: bool,
    connections: HashSet<ConnId>,
    created_at: u64,
}

impl Session {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn fore(&self) -> &SlotTable {
        &self.fore
    }

    pub fn fore_mut(&mut self) -> &mut SlotTable {
        &mut self.fore
    }

    pub fn back(&self) -> Option<&SlotTable> {
        self.back.as_ref()
    }

    pub fn back_mut(&mut self) -> Option<&mut SlotTable> {
        self.back.as_mut()
    }

    pub fn has_back_channel(&self) -> bool {
        self.back.is_some()
    }

    pub fn back_channel_ready(&self) -> bool {
        self.back_channel_ready
    }

    pub fn set_back_channel_ready(&mut self, ready: bool) {
        self.back_channel_ready = ready;
    }

    pub fn connections(&self) -> impl Iterator<Item = ConnId> + '_ {
        self.connections.iter().copied()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }
}

/// Registry of sessions keyed by `SessionId`.
#[derive(Default)]
pub struct SessionRegistry {
    by_id: HashMap<SessionId, Session>,
    ids: IdAllocator,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            ids: IdAllocator::default(),
        }
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.by_id.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.by_id.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.by_id.values()
    }

    pub fn for_client(&self, client_id: ClientId) -> impl Iterator<Item = &Session> {
        self.by_id.values().filter(move |s| s.client_id == client_id)
    }

    pub fn create(
        &mut self,
        client_id: ClientId,
        fore: ChannelAttrs,
        back: Option<ChannelAttrs>,
        now: u64,
    ) -> SessionId {
        let id = SessionId(self.ids.next());
        self.by_id.insert(
            id,
            Session {
                id,
                client_id,
                fore: SlotTable::new(fore.slot_count),
                back: back.map(|b| SlotTable::new(b.slot_count)),
                back_channel_ready: false,
                connections: HashSet::new(),
                created_at: now,
            },
        );
        id
    }

    /// Remove a session outright. Callers are responsible for first
    /// detaching it from its client's session set and from any bound
    /// connections, since those live in separate registries this one does
    /// not reach into.
    pub fn destroy(&mut self, id: SessionId) -> StateResult<Session> {
        self.by_id
            .remove(&id)
            .ok_or(StateError(StateErrorKind::BadSession))
    }

    pub fn bind_connection(&mut self, id: SessionId, conn: ConnId) -> StateResult<()> {
        let session = self
            .by_id
            .get_mut(&id)
            .ok_or(StateError(StateErrorKind::BadSession))?;
        session.connections.insert(conn);
        Ok(())
    }

    pub fn unbind_connection(&mut self, id: SessionId, conn: ConnId) {
        if let Some(session) = self.by_id.get_mut(&id) {
            session.connections.remove(&conn);
        }
    }

    /// Sessions with no bound connection at all, which includes the one
    /// just dropped by a closed TCP connection. Used by the connection
    /// lifecycle hook to decide whether a session has gone orphaned.
    pub fn is_orphaned(&self, id: SessionId) -> bool {
        self.by_id
            .get(&id)
            .map(|s| s.connections.is_empty())
            .unwrap_or(true)
    }
}
