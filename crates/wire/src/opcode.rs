/// NFSv4.1 operation codes relevant to the dispatch core.
///
/// Only the ops the core must recognize by number are enumerated here:
/// the lifecycle ops it implements directly, the session-exempt set, and
/// the v4.0-only set it must reject. Filesystem operations (READ, WRITE,
/// OPEN, LOCK, ...) are opaque to the core and are represented by
/// [`Nfs4Op::Other`] carrying the raw code: decoding and executing them is
/// an external collaborator's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nfs4Op {
    Access,
    Close,
    Commit,
    Create,
    DelegPurge,
    DelegReturn,
    GetAttr,
    GetFh,
    Link,
    Lock,
    Lockt,
    Locku,
    Lookup,
    LookupP,
    Nverify,
    Open,
    OpenAttr,
    OpenConfirm,
    OpenDowngrade,
    PutFh,
    PutPubFh,
    PutRootFh,
    Read,
    ReadDir,
    ReadLink,
    Remove,
    Rename,
    Renew,
    RestoreFh,
    SaveFh,
    SecInfo,
    SetAttr,
    SetClientId,
    SetClientIdConfirm,
    Verify,
    Write,
    ReleaseLockOwner,
    BackchannelCtl,
    BindConnToSession,
    ExchangeId,
    CreateSession,
    DestroySession,
    FreeStateid,
    GetDirDelegation,
    GetDeviceInfo,
    GetDeviceList,
    LayoutCommit,
    LayoutGet,
    LayoutReturn,
    SecinfoNoName,
    Sequence,
    SetSsv,
    TestStateid,
    WantDelegation,
    DestroyClientId,
    ReclaimComplete,
    Illegal,
    /// Any op code this table does not assign a name to. The core still
    /// dispatches it to an injected filesystem operation handler by raw
    /// code; it just has no lifecycle-specific behavior of its own.
    Other(u32),
}

impl Nfs4Op {
    pub fn from_code(code: u32) -> Self {
        match code {
            3 => Self::Access,
            4 => Self::Close,
            5 => Self::Commit,
            6 => Self::Create,
            7 => Self::DelegPurge,
            8 => Self::DelegReturn,
            9 => Self::GetAttr,
            10 => Self::GetFh,
            11 => Self::Link,
            12 => Self::Lock,
            13 => Self::Lockt,
            14 => Self::Locku,
            15 => Self::Lookup,
            16 => Self::LookupP,
            17 => Self::Nverify,
            18 => Self::Open,
            19 => Self::OpenAttr,
            20 => Self::OpenConfirm,
            21 => Self::OpenDowngrade,
            22 => Self::PutFh,
            23 => Self::PutPubFh,
            24 => Self::PutRootFh,
            25 => Self::Read,
            26 => Self::ReadDir,
            27 => Self::ReadLink,
            28 => Self::Remove,
            29 => Self::Rename,
            30 => Self::Renew,
            31 => Self::RestoreFh,
            32 => Self::SaveFh,
            33 => Self::SecInfo,
            34 => Self::SetAttr,
            35 => Self::SetClientId,
            36 => Self::SetClientIdConfirm,
            37 => Self::Verify,
            38 => Self::Write,
            39 => Self::ReleaseLockOwner,
            40 => Self::BackchannelCtl,
            41 => Self::BindConnToSession,
            42 => Self::ExchangeId,
            43 => Self::CreateSession,
            44 => Self::DestroySession,
            45 => Self::FreeStateid,
            46 => Self::GetDirDelegation,
            47 => Self::GetDeviceInfo,
            48 => Self::GetDeviceList,
            49 => Self::LayoutCommit,
            50 => Self::LayoutGet,
            51 => Self::LayoutReturn,
            52 => Self::SecinfoNoName,
            53 => Self::Sequence,
            54 => Self::SetSsv,
            55 => Self::TestStateid,
            56 => Self::WantDelegation,
            57 => Self::DestroyClientId,
            58 => Self::ReclaimComplete,
            0 => Self::Illegal,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            Self::Access => 3,
            Self::Close => 4,
            Self::Commit => 5,
            Self::Create => 6,
            Self::DelegPurge => 7,
            Self::DelegReturn => 8,
            Self::GetAttr => 9,
            Self::GetFh => 10,
            Self::Link => 11,
            Self::Lock => 12,
            Self::Lockt => 13,
            Self::Locku => 14,
            Self::Lookup => 15,
            Self::LookupP => 16,
            Self::Nverify => 17,
            Self::Open => 18,
            Self::OpenAttr => 19,
            Self::OpenConfirm => 20,
            Self::OpenDowngrade => 21,
            Self::PutFh => 22,
            Self::PutPubFh => 23,
            Self::PutRootFh => 24,
            Self::Read => 25,
            Self::ReadDir => 26,
            Self::ReadLink => 27,
            Self::Remove => 28,
            Self::Rename => 29,
            Self::Renew => 30,
            Self::RestoreFh => 31,
            Self::SaveFh => 32,
            Self::SecInfo => 33,
            Self::SetAttr => 34,
            Self::SetClientId => 35,
            Self::SetClientIdConfirm => 36,
            Self::Verify => 37,
            Self::Write => 38,
            Self::ReleaseLockOwner => 39,
            Self::BackchannelCtl => 40,
            Self::BindConnToSession => 41,
            Self::ExchangeId => 42,
            Self::CreateSession => 43,
            Self::DestroySession => 44,
            Self::FreeStateid => 45,
            Self::GetDirDelegation => 46,
            Self::GetDeviceInfo => 47,
            Self::GetDeviceList => 48,
            Self::LayoutCommit => 49,
            Self::LayoutGet => 50,
            Self::LayoutReturn => 51,
            Self::SecinfoNoName => 52,
            Self::Sequence => 53,
            Self::SetSsv => 54,
            Self::TestStateid => 55,
            Self::WantDelegation => 56,
            Self::DestroyClientId => 57,
            Self::ReclaimComplete => 58,
            Self::Illegal => 0,
            Self::Other(code) => code,
        }
    }

    /// Ops that may legally begin a v4.1 COMPOUND without a preceding
    /// SEQUENCE.
    pub fn is_session_exempt(self) -> bool {
        matches!(
            self,
            Self::BindConnToSession
                | Self::ExchangeId
                | Self::CreateSession
                | Self::DestroySession
                | Self::DestroyClientId
                | Self::BackchannelCtl
        )
    }

    /// v4.0-only ops that a v4.1 COMPOUND must reject with NOTSUPP after
    /// consuming their arguments.
    pub fn is_v40_only(self) -> bool {
        matches!(
            self,
            Self::SetClientId
                | Self::SetClientIdConfirm
                | Self::Renew
                | Self::OpenConfirm
                | Self::ReleaseLockOwner
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_exempt_ops_bypass_sequence_gating() {
        for op in [
            Nfs4Op::BindConnToSession,
            Nfs4Op::ExchangeId,
            Nfs4Op::CreateSession,
            Nfs4Op::DestroySession,
            Nfs4Op::DestroyClientId,
            Nfs4Op::BackchannelCtl,
        ] {
            assert!(op.is_session_exempt());
        }
        assert!(!Nfs4Op::Sequence.is_session_exempt());
        assert!(!Nfs4Op::PutFh.is_session_exempt());
    }

    #[test]
    fn v40_only_ops_are_flagged_for_rejection() {
        for op in [
            Nfs4Op::SetClientId,
            Nfs4Op::SetClientIdConfirm,
            Nfs4Op::Renew,
            Nfs4Op::OpenConfirm,
            Nfs4Op::ReleaseLockOwner,
        ] {
            assert!(op.is_v40_only());
        }
        assert!(!Nfs4Op::Open.is_v40_only());
    }

    #[test]
    fn code_roundtrips() {
        for code in 3..=58u32 {
            let op = Nfs4Op::from_code(code);
            assert_eq!(op.code(), code);
        }
    }

    #[test]
    fn unknown_code_is_other() {
        assert_eq!(Nfs4Op::from_code(9999), Nfs4Op::Other(9999));
    }
}
