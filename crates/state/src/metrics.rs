/// Nil-safe metrics sink, injected as a generic type parameter resolved
/// once at construction rather than a trait object, so the default
/// (no metrics) case costs nothing.
pub trait MetricsRecorder: Send + Sync {
    fn bind_total(&self, _direction: &str) {}
    fn unbind_total(&self, _reason: &str) {}
    fn bound_connections(&self, _session_id: u64, _count: usize) {}
    fn sessions(&self, _client_id: u64, _count: usize) {}
    fn stateids(&self, _kind: &str, _count: usize) {}
    fn lease_renewals(&self) {}
    fn lease_evictions(&self) {}
    fn grace_active(&self, _active: bool) {}
    fn grace_clients_reclaimed(&self, _count: usize) {}
    fn slot_replay_hits(&self) {}
    fn seq_misordered(&self) {}
    fn delay_returned(&self, _reason: &str) {}
}

#[derive(Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsRecorder for NoopMetrics {}
