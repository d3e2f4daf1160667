//! External connection lifecycle hooks. The socket accept loop and TLS/GSS
//! handshake live outside this crate; what it needs from them is just two
//! calls — one when a connection becomes usable, one when it goes away —
//! so the session and connection registries stay in sync with reality.

use ahash::HashMap;
use parking_lot::Mutex;

use state::{ConnId, MetricsRecorder};

use crate::identity::Identity;

/// Tracks which authenticated identity owns each live connection, so
/// BIND_CONN_TO_SESSION and SEQUENCE can confirm a connection is being
/// driven by the principal that created the session it's bound to.
#[derive(Default)]
pub struct ConnectionTracker {
    identities: Mutex<HashMap<ConnId, Identity>>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self {
            identities: Mutex::new(HashMap::default()),
        }
    }

    /// Record a newly accepted, authenticated connection.
    pub fn on_accept(&self, conn_id: ConnId, identity: Identity) {
        self.identities.lock().insert(conn_id, identity);
    }

    /// A connection closed: forget its identity and release any session
    /// bindings it held, via `state`.
    pub fn on_close<C: state::Clock, M: MetricsRecorder>(
        &self,
        conn_id: ConnId,
        state_manager: &state::StateManager<C, M>,
    ) {
        self.identities.lock().remove(&conn_id);
        state_manager.on_connection_closed(conn_id);
    }

    pub fn identity_of(&self, conn_id: ConnId) -> Option<Identity> {
        self.identities.lock().get(&conn_id).cloned()
    }
}
