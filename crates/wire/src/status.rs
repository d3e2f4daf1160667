/// Wire-level NFSv4 status codes the core can produce.
///
/// This is not an exhaustive list of RFC 8881's NFS4ERR_* space — only the
/// ones this core's error taxonomy ever emits, plus `Ok`. A
/// handler for an opaque filesystem operation may return any other RFC
/// code; the dispatcher passes those through without interpreting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Nfs4Status {
    Ok,
    BadSession,
    BadSlot,
    BadXdr,
    BadStateid,
    OldStateid,
    StaleStateid,
    Expired,
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
    WrongSec,
    ServerFault,
    SeqMisordered,
    RetryUncachedRep,
    OpNotInSession,
    OpIllegal,
}

impl Nfs4Status {
    /// The numeric NFS4ERR_* value RFC 8881 assigns.
    pub fn code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Inval => 22,
            Self::NotSupp => 10004,
            Self::ServerFault => 10006,
            Self::Delay => 10008,
            Self::Expired => 10011,
            Self::Grace => 10013,
            Self::WrongSec => 10016,
            Self::ClientIdInUse => 10017,
            Self::Resource => 10018,
            Self::StaleClientId => 10022,
            Self::StaleStateid => 10023,
            Self::OldStateid => 10024,
            Self::BadStateid => 10025,
            Self::LocksHeld => 10037,
            Self::BadXdr => 10036,
            Self::BadSession => 10052,
            Self::BadSlot => 10053,
            Self::CompleteAlready => 10054,
            Self::SeqMisordered => 10063,
            Self::RetryUncachedRep => 10067,
            Self::OpNotInSession => 10070,
            Self::ClientIdBusy => 10074,
            Self::OpIllegal => 10044,
        }
    }

    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl Default for Nfs4Status {
    fn default() -> Self {
        Self::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_is_zero() {
        assert_eq!(Nfs4Status::Ok.code(), 0);
    }

    #[test]
    fn distinct_statuses_have_distinct_codes() {
        let all = [
            Nfs4Status::BadSession,
            Nfs4Status::BadSlot,
            Nfs4Status::BadXdr,
            Nfs4Status::BadStateid,
            Nfs4Status::OldStateid,
            Nfs4Status::StaleStateid,
            Nfs4Status::Expired,
            Nfs4Status::LocksHeld,
            Nfs4Status::StaleClientId,
            Nfs4Status::ClientIdBusy,
            Nfs4Status::ClientIdInUse,
            Nfs4Status::CompleteAlready,
            Nfs4Status::Grace,
            Nfs4Status::Delay,
            Nfs4Status::Inval,
            Nfs4Status::Resource,
            Nfs4Status::NotSupp,
            Nfs4Status::WrongSec,
            Nfs4Status::ServerFault,
            Nfs4Status::SeqMisordered,
            Nfs4Status::RetryUncachedRep,
            Nfs4Status::OpNotInSession,
            Nfs4Status::OpIllegal,
        ];

        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.code(), b.code(), "{a:?} and {b:?} collide");
            }
        }
    }
}
