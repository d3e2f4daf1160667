use crate::client::ClientRegistry;
use crate::connection::ConnectionRegistry;
use crate::delegation::DelegationRegistry;
use crate::grace::GracePeriodState;
use crate::ids::ClientId;
use crate::metrics::MetricsRecorder;
use crate::session::SessionRegistry;
use crate::stateid_registry::StateidRegistry;

/// One lease-reaper sweep: find every client whose lease has expired and
/// tear down everything it owns.
///
/// Callers acquire the registries' lock(s) in the fixed order — client,
/// session, and stateid/delegation state before the connection registry —
/// and hold them only for the duration of this call, never across a
/// suspension point. Sweeps are skipped entirely while grace is active, so
/// a client that is merely slow to reclaim is not evicted out from under
/// itself.
///
/// Returns the ids of every client evicted, for logging and metrics at the
/// call site.
pub fn sweep_expired_clients(
    clients: &mut ClientRegistry,
    sessions: &mut SessionRegistry,
    connections: &mut ConnectionRegistry,
    stateids: &mut StateidRegistry,
    delegations: &mut DelegationRegistry,
    grace: &GracePeriodState,
    now: u64,
    lease_seconds: u64,
    metrics: &impl MetricsRecorder,
) -> Vec<ClientId> {
    if grace.is_active() {
        return Vec::new();
    }

    let expired: Vec<ClientId> = clients
        .iter()
        .filter(|c| c.has_expired(now, lease_seconds))
        .map(|c| c.id())
        .collect();

    for &client_id in &expired {
        evict_client(
            clients,
            sessions,
            connections,
            stateids,
            delegations,
            client_id,
        );
        metrics.lease_evictions();
        log::info!("client {client_id} evicted: lease expired");
    }

    expired
}

/// Tear down one client's sessions, connections, stateids, and
/// delegations, then remove the client record itself. Used by both the
/// lease reaper and administrative eviction, so both paths leave the
/// registries in the same state.
pub fn evict_client(
    clients: &mut ClientRegistry,
    sessions: &mut SessionRegistry,
    connections: &mut ConnectionRegistry,
    stateids: &mut StateidRegistry,
    delegations: &mut DelegationRegistry,
    client_id: ClientId,
) {
    let Some(client) = clients.get(client_id) else {
        return;
    };
    let session_ids: Vec<_> = client.sessions().collect();

    for session_id in session_ids {
        connections.unbind_session(session_id);
        let _ = sessions.destroy(session_id);
    }

    let stale_stateids: Vec<_> = stateids
        .entries_for_client(client_id)
        .map(|e| e.index())
        .collect();
    for index in stale_stateids {
        delegations.remove(index);
        stateids.remove(index);
    }

    clients.remove_unconditionally(client_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ExchangeOutcome;
    use crate::connection::ConnTransport;
    use crate::ids::SessionId;
    use crate::metrics::NoopMetrics;
    use crate::session::ChannelAttrs;
    use wire::StateidType;

    fn attrs() -> ChannelAttrs {
        ChannelAttrs {
            max_request_size: 1024,
            max_response_size: 1024,
            max_ops: 8,
            slot_count: 8,
        }
    }

    #[test]
    fn expired_client_is_evicted_and_cleaned_up() {
        let mut clients = ClientRegistry::new();
        let mut sessions = SessionRegistry::new();
        let mut connections = ConnectionRegistry::new();
        let mut stateids = StateidRegistry::new(1);
        let mut delegations = DelegationRegistry::new();
        let grace = GracePeriodState::new(0, 0, Vec::<ClientId>::new());

        let client_id = match clients
            .exchange_id(b"owner".to_vec(), [1; 8], "user", 0)
            .unwrap()
            .0
        {
            ExchangeOutcome::NewUnconfirmed(id) => id,
            _ => unreachable!(),
        };
        clients.confirm(client_id, 0).unwrap();

        let session_id = sessions.create(client_id, attrs(), None, 0);
        clients.attach_session(client_id, session_id).unwrap();
        connections
            .bind(
                crate::ids::ConnId(1),
                session_id,
                ConnTransport::Tcp,
                crate::connection::DirectionRequest::Fore,
                8,
                0,
            )
            .unwrap();
        let sid = stateids.mint(StateidType::Open, client_id, session_id);

        let evicted = sweep_expired_clients(
            &mut clients,
            &mut sessions,
            &mut connections,
            &mut stateids,
            &mut delegations,
            &grace,
            1_000,
            90,
            &NoopMetrics,
        );

        assert_eq!(evicted, vec![client_id]);
        assert!(clients.get(client_id).is_none());
        assert!(sessions.get(session_id).is_none());
        assert_eq!(connections.count_for_session(session_id), 0);
        assert!(stateids.get(sid.index()).is_none());
    }

    #[test]
    fn sweep_is_a_no_op_during_active_grace() {
        let mut clients = ClientRegistry::new();
        let mut sessions = SessionRegistry::new();
        let mut connections = ConnectionRegistry::new();
        let mut stateids = StateidRegistry::new(1);
        let mut delegations = DelegationRegistry::new();
        let grace = GracePeriodState::new(0, 90, vec![ClientId(1)]);

        let client_id = match clients
            .exchange_id(b"owner".to_vec(), [1; 8], "user", 0)
            .unwrap()
            .0
        {
            ExchangeOutcome::NewUnconfirmed(id) => id,
            _ => unreachable!(),
        };
        clients.confirm(client_id, 0).unwrap();

        let evicted = sweep_expired_clients(
            &mut clients,
            &mut sessions,
            &mut connections,
            &mut stateids,
            &mut delegations,
            &grace,
            1_000,
            90,
            &NoopMetrics,
        );

        assert!(evicted.is_empty());
        assert!(clients.get(client_id).is_some());
    }
}
