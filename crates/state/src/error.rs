use wire::Nfs4Status;

/// The internal error taxonomy, kept independent of the wire-level status
/// enum so StateManager never has to think in terms of NFS4ERR_* numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateErrorKind {
    BadSession,
    BadSlot,
    BadStateid,
    OldStateid,
    StaleStateid,
    ExpiredStateid,
    LocksHeld,
    StaleClientId,
    ClientIdBusy,
    ClientIdInUse,
    CompleteAlready,
    Grace,
    Delay,
    Inval,
    Resource,
    NotSupp,
    ServerFault,
    SeqMisordered,
    RetryUncachedRep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateError(pub StateErrorKind);

impl StateError {
    pub fn kind(self) -> StateErrorKind {
        self.0
    }
}

impl std::error::Error for StateError {}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl From<StateErrorKind> for StateError {
    fn from(kind: StateErrorKind) -> Self {
        Self(kind)
    }
}

impl From<StateError> for Nfs4Status {
    fn from(err: StateError) -> Self {
        match err.0 {
            StateErrorKind::BadSession => Nfs4Status::BadSession,
            StateErrorKind::BadSlot => Nfs4Status::BadSlot,
            StateErrorKind::BadStateid => Nfs4Status::BadStateid,
            StateErrorKind::OldStateid => Nfs4Status::OldStateid,
            StateErrorKind::StaleStateid => Nfs4Status::StaleStateid,
            StateErrorKind::ExpiredStateid => Nfs4Status::Expired,
            StateErrorKind::LocksHeld => Nfs4Status::LocksHeld,
            StateErrorKind::StaleClientId => Nfs4Status::StaleClientId,
            StateErrorKind::ClientIdBusy => Nfs4Status::ClientIdBusy,
            StateErrorKind::ClientIdInUse => Nfs4Status::ClientIdInUse,
            StateErrorKind::CompleteAlready => Nfs4Status::CompleteAlready,
            StateErrorKind::Grace => Nfs4Status::Grace,
            StateErrorKind::Delay => Nfs4Status::Delay,
            StateErrorKind::Inval => Nfs4Status::Inval,
            StateErrorKind::Resource => Nfs4Status::Resource,
            StateErrorKind::NotSupp => Nfs4Status::NotSupp,
            StateErrorKind::ServerFault => Nfs4Status::ServerFault,
            StateErrorKind::SeqMisordered => Nfs4Status::SeqMisordered,
            StateErrorKind::RetryUncachedRep => Nfs4Status::RetryUncachedRep,
        }
    }
}

pub type StateResult<T> = Result<T, StateError>;
