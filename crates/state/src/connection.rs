use ahash::{HashMap, HashMapExt, HashSet, HashSetExt};

use crate::error::{StateError, StateErrorKind, StateResult};
use crate::ids::{ConnId, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnTransport {
    Tcp,
    Rdma,
}

/// Channel direction a connection carries for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelDirection {
    Fore,
    Back,
    Both,
}

impl ChannelDirection {
    pub fn carries_back(self) -> bool {
        matches!(self, Self::Back | Self::Both)
    }

    pub fn carries_fore(self) -> bool {
        matches!(self, Self::Fore | Self::Both)
    }
}

/// Direction a BIND_CONN_TO_SESSION request asks for, distinct from
/// [`ChannelDirection`] (what was actually granted): a request can be
/// downgraded when the back channel is already owned elsewhere, but never
/// upgraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionRequest {
    Fore,
    Back,
    Both,
}

pub struct BoundConnection {
    conn_id: ConnId,
    session_id: SessionId,
    transport: ConnTransport,
    direction: ChannelDirection,
    bound_at: u64,
    last_activity: u64,
    draining: bool,
}

impl BoundConnection {
    pub fn conn_id(&self) -> ConnId {
        self.conn_id
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn transport(&self) -> ConnTransport {
        self.transport
    }

    pub fn direction(&self) -> ChannelDirection {
        self.direction
    }

    pub fn bound_at(&self) -> u64 {
        self.bound_at
    }

    pub fn last_activity(&self) -> u64 {
        self.last_activity
    }

    pub fn is_draining(&self) -> bool {
        self.draining
    }
}

/// Registry of connection-to-session bindings, implementing trunking (many
/// connections per session) and back-channel ownership (at most one
/// connection backs the callback channel at a time).
#[derive(Default)]
pub struct ConnectionRegistry {
    by_conn: HashMap<ConnId, BoundConnection>,
    by_session: HashMap<SessionId, HashSet<ConnId>>,
    back_owner: HashMap<SessionId, ConnId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            by_conn: HashMap::new(),
            by_session: HashMap::new(),
            back_owner: HashMap::new(),
        }
    }

    pub fn get(&self, conn_id: ConnId) -> Option<&BoundConnection> {
        self.by_conn.get(&conn_id)
    }

    pub fn connections_for_session(&self, session_id: SessionId) -> impl Iterator<Item = ConnId> + '_ {
        self.by_session
            .get(&session_id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn count_for_session(&self, session_id: SessionId) -> usize {
        self.by_session.get(&session_id).map(HashSet::len).unwrap_or(0)
    }

    pub fn back_channel_owner(&self, session_id: SessionId) -> Option<ConnId> {
        self.back_owner.get(&session_id).copied()
    }

    pub fn touch(&mut self, conn_id: ConnId, now: u64) {
        if let Some(bound) = self.by_conn.get_mut(&conn_id) {
            bound.last_activity = now;
        }
    }

    pub fn is_draining(&self, conn_id: ConnId) -> bool {
        self.by_conn.get(&conn_id).map(BoundConnection::is_draining).unwrap_or(false)
    }

    /// Mark a connection draining (or not), for graceful connection
    /// migration. Returns whether the connection was known.
    pub fn set_draining(&mut self, conn_id: ConnId, draining: bool) -> bool {
        match self.by_conn.get_mut(&conn_id) {
            Some(bound) => {
                bound.draining = draining;
                true
            }
            None => false,
        }
    }

    /// Bind a connection to a session, requesting (not necessarily
    /// receiving) a channel direction. Rebinding an already-bound
    /// connection to the same session simply renegotiates its direction in
    /// place; rebinding it to a *different* session first releases its
    /// prior binding, including any back-channel ownership it held there.
    ///
    /// RDMA transports never carry the back channel in this core, so a
    /// back-channel request over RDMA is silently downgraded to fore-only
    /// rather than rejected. A BACK request that would leave the session
    /// with no fore-capable connection at all is rejected with
    /// `NFS4ERR_INVAL` instead: some connection must always be able to
    /// carry ordinary COMPOUNDs.
    pub fn bind(
        &mut self,
        conn_id: ConnId,
        session_id: SessionId,
        transport: ConnTransport,
        requested: DirectionRequest,
        max_connections_per_session: usize,
        now: u64,
    ) -> StateResult<ChannelDirection> {
        if self.by_conn.get(&conn_id).is_some_and(|c| c.session_id != session_id) {
            self.unbind(conn_id);
        }

        let already_bound_here = self
            .by_conn
            .get(&conn_id)
            .is_some_and(|c| c.session_id == session_id);

        if !already_bound_here && self.count_for_session(session_id) >= max_connections_per_session {
            return Err(StateError(StateErrorKind::Resource));
        }

        let rdma = transport == ConnTransport::Rdma;

        let direction = match requested {
            DirectionRequest::Fore => ChannelDirection::Fore,
            // FORE_OR_BOTH is opportunistic: it takes Both only if the back
            // channel is free or already its own, and otherwise settles
            // for Fore without disturbing whoever currently owns it.
            DirectionRequest::Both => {
                let back_free_or_mine = !rdma
                    && match self.back_owner.get(&session_id) {
                        None => true,
                        Some(&owner) => owner == conn_id,
                    };
                if back_free_or_mine {
                    self.back_owner.insert(session_id, conn_id);
                    ChannelDirection::Both
                } else {
                    ChannelDirection::Fore
                }
            }
            // A plain BACK request is a deliberate ask to carry the
            // callback channel, so it takes over from whoever currently
            // owns it (demoting that connection to Fore) rather than
            // backing off. The only thing that can block it is the
            // fore-retention invariant.
            DirectionRequest::Back => {
                if rdma {
                    ChannelDirection::Fore
                } else if self.other_fore_capable(session_id, conn_id) == 0 {
                    return Err(StateError(StateErrorKind::Inval));
                } else {
                    if let Some(&owner) = self.back_owner.get(&session_id) {
                        if owner != conn_id {
                            if let Some(prev) = self.by_conn.get_mut(&owner) {
                                prev.direction = ChannelDirection::Fore;
                            }
                        }
                    }
                    self.back_owner.insert(session_id, conn_id);
                    ChannelDirection::Back
                }
            }
        };

        self.by_conn.insert(
            conn_id,
            BoundConnection {
                conn_id,
                session_id,
                transport,
                direction,
                bound_at: now,
                last_activity: now,
                draining: false,
            },
        );
        self.by_session.entry(session_id).or_insert_with(HashSet::new).insert(conn_id);

        Ok(direction)
    }

    /// Count connections bound to `session_id`, other than `excluding`,
    /// that currently carry the fore channel.
    fn other_fore_capable(&self, session_id: SessionId, excluding: ConnId) -> usize {
        self.by_session
            .get(&session_id)
            .into_iter()
            .flat_map(|set| set.iter())
            .filter(|&&other| other != excluding)
            .filter_map(|other| self.by_conn.get(other))
            .filter(|bound| bound.direction.carries_fore())
            .count()
    }

    /// Drop a connection's binding entirely, releasing back-channel
    /// ownership if it held it. Returns the session it had been bound to,
    /// if any, so the caller can check whether that session is now
    /// orphaned.
    pub fn unbind(&mut self, conn_id: ConnId) -> Option<SessionId> {
        let bound = self.by_conn.remove(&conn_id)?;
        if let Some(set) = self.by_session.get_mut(&bound.session_id) {
            set.remove(&conn_id);
        }
        if self.back_owner.get(&bound.session_id) == Some(&conn_id) {
            self.back_owner.remove(&bound.session_id);
        }
        Some(bound.session_id)
    }

    /// Drop every binding for a session, for DESTROY_SESSION.
    pub fn unbind_session(&mut self, session_id: SessionId) {
        if let Some(conns) = self.by_session.remove(&session_id) {
            for conn in conns {
                self.by_conn.remove(&conn);
            }
        }
        self.back_owner.remove(&session_id);
    }
}
