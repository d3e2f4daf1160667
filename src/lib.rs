//! NFSv4.1 session/client/stateid state management and COMPOUND dispatch
//! for the DittoFS userspace filesystem server.
//!
//! This crate owns everything RFC 8881 calls "session trunking", minus the
//! filesystem operations themselves: EXCHANGE_ID, CREATE_SESSION,
//! DESTROY_SESSION, DESTROY_CLIENTID, RECLAIM_COMPLETE,
//! BIND_CONN_TO_SESSION, SEQUENCE, FREE_STATEID, and TEST_STATEID, plus the
//! slot-replay cache, lease/reaper, and grace-period machinery those ops
//! depend on. A surrounding server provides the TCP accept loop, the
//! storage backend, and an [`dispatch::FsOpExecutor`] for every operation
//! this crate does not implement directly.

pub mod admin;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod identity;
pub mod lifecycle;

pub use admin::AdminApi;
pub use config::{ChannelLimits, ServerConfig};
pub use connection::ConnectionTracker;
pub use dispatch::{dispatch_compound, DispatchContext, FsOpExecutor};
pub use identity::{Identity, SecFlavor, StateProtection};

pub use state::{
    BoundConnection, ChannelAttrs, ChannelDirection, Client, ClientId, ClientRegistry, Clock,
    ConnId, ConnTransport, Delegation, DelegationRegistry, DirectionRequest, ExchangeOutcome,
    GracePeriodState, GracePhase, GraceStatus, ManualClock, MetricsRecorder, NoopMetrics,
    RecallState, Session, SessionId, SessionRegistry, SlotDecision, SlotDecisionSummary,
    StateError, StateErrorKind, StateManager, StateManagerConfig, StateResult, SystemClock,
};
pub use wire::{Nfs4Op, Nfs4Status, SessionHandle, Stateid, StateidType, XdrReader, XdrWriter};
