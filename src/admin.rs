//! Read-mostly administrative surface: what a control plane (out of scope
//! for this crate) would call to report on or intervene in server state.
//! Every method here is a thin, structured wrapper over [`state::StateManager`] —
//! no new state lives in this module.

use state::{ChannelDirection, ClientId, Clock, ConnId, GraceStatus, MetricsRecorder, SessionId, StateManager, StateResult};

#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub client_id: ClientId,
    pub session_id: SessionId,
    pub fore: usize,
    pub back: usize,
    pub both: usize,
    pub total: usize,
    pub last_activity: u64,
    pub connections: Vec<ConnId>,
}

#[derive(Debug, Clone, Copy)]
pub struct ConnectionBinding {
    pub conn_id: ConnId,
    pub direction: ChannelDirection,
    pub bound_at: u64,
    pub last_activity: u64,
    pub draining: bool,
}

pub struct AdminApi<'a, C: Clock, M: MetricsRecorder> {
    state: &'a StateManager<C, M>,
}

impl<'a, C: Clock, M: MetricsRecorder> AdminApi<'a, C, M> {
    pub fn new(state: &'a StateManager<C, M>) -> Self {
        Self { state }
    }

    pub fn grace_status(&self) -> GraceStatus {
        self.state.grace_status()
    }

    pub fn force_end_grace(&self) -> bool {
        self.state.force_end_grace()
    }

    pub fn evict_client(&self, client_id: ClientId) -> StateResult<()> {
        self.state.evict_client(client_id)
    }

    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        self.state
            .list_sessions()
            .into_iter()
            .filter_map(|session_id| self.state.session_report(session_id))
            .map(|report| SessionSummary {
                client_id: report.client_id,
                session_id: report.session_id,
                fore: report.directions.fore,
                back: report.directions.back,
                both: report.directions.both,
                total: report.directions.total,
                last_activity: report.last_activity,
                connections: report.connections,
            })
            .collect()
    }

    pub fn connection_bindings(&self, session_id: SessionId) -> Vec<ConnectionBinding> {
        self.state
            .connection_reports(session_id)
            .into_iter()
            .map(|report| ConnectionBinding {
                conn_id: report.conn_id,
                direction: report.direction,
                bound_at: report.bound_at,
                last_activity: report.last_activity,
                draining: report.draining,
            })
            .collect()
    }

    /// Mark a connection draining so the server stops accepting new
    /// COMPOUNDs on it while the client migrates to another connection.
    pub fn set_connection_draining(&self, conn_id: ConnId, draining: bool) -> bool {
        self.state.set_connection_draining(conn_id, draining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use state::{DirectionRequest, ExchangeOutcome, ManualClock, NoopMetrics, StateManagerConfig};

    #[test]
    fn list_sessions_reports_connection_counts() {
        let mgr = StateManager::new(StateManagerConfig::default(), ManualClock::default(), NoopMetrics);
        let client_id = match mgr.exchange_id(b"owner".to_vec(), [1; 8], "user").unwrap() {
            ExchangeOutcome::NewUnconfirmed(id) => id,
            _ => unreachable!(),
        };
        let result = mgr
            .create_session(client_id, 1, mgr.config().server_fore_max, None)
            .unwrap();
        mgr.bind_connection(
            state::ConnId(1),
            result.session_id,
            state::ConnTransport::Tcp,
            DirectionRequest::Fore,
        )
        .unwrap();

        let admin = AdminApi::new(&mgr);
        let sessions = admin.list_sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].client_id, client_id);
        assert_eq!(sessions[0].total, 1);
        assert_eq!(sessions[0].fore, 1);
        assert_eq!(sessions[0].back, 0);

        let bindings = admin.connection_bindings(result.session_id);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].conn_id, state::ConnId(1));
        assert!(!bindings[0].draining);

        assert!(admin.set_connection_draining(state::ConnId(1), true));
        let bindings = admin.connection_bindings(result.session_id);
        assert!(bindings[0].draining);
    }
}
