use state::{Clock, MetricsRecorder, StateManager};
use wire::lifecycle::{TestStateidArgs, TestStateidResult};
use wire::{Nfs4Status, XdrReader};

/// TEST_STATEID never fails the whole operation for an individual bad
/// stateid — each one gets its own status in the result vector, matching
/// RFC 8881's "this operation has no 'hard' error cases" behavior.
pub fn handle<C: Clock, M: MetricsRecorder>(
    state: &StateManager<C, M>,
    reader: &mut XdrReader,
) -> Result<TestStateidResult, Nfs4Status> {
    let args = TestStateidArgs::decode(reader).map_err(Nfs4Status::from)?;

    let statuses = args
        .stateids
        .iter()
        .map(|stateid| match state.test_stateid(stateid) {
            Ok(()) => Nfs4Status::Ok,
            Err(err) => err.into(),
        })
        .collect();

    Ok(TestStateidResult { statuses })
}
