use dittofs_nfs4_core::{
    dispatch_compound, AdminApi, ConnId, ConnTransport, ConnectionTracker, DirectionRequest,
    DispatchContext, ExchangeOutcome, FsOpExecutor, Identity, ManualClock, NoopMetrics,
    Nfs4Status, SecFlavor, SessionHandle, ServerConfig, StateManager, XdrReader, XdrWriter,
};

/// A stub for every filesystem operation: this test suite never exercises
/// one, so it just reports NOTSUPP without touching the cursor.
struct StubExecutor;

impl FsOpExecutor for StubExecutor {
    fn execute(&mut self, _op_code: u32, _reader: &mut XdrReader, writer: &mut XdrWriter) -> Nfs4Status {
        writer.put_u32(Nfs4Status::NotSupp.code() as u32);
        Nfs4Status::NotSupp
    }
}

fn manager() -> StateManager<ManualClock, NoopMetrics> {
    StateManager::new(ServerConfig::default().to_state_config(), ManualClock::default(), NoopMetrics)
}

fn compound_header(tag: &[u8], numops: u32) -> XdrWriter {
    let mut w = XdrWriter::default();
    w.put_opaque(tag);
    w.put_u32(1); // minorversion
    w.put_u32(numops);
    w
}

fn read_reply_header(reply: &[u8]) -> (Nfs4Status, Vec<u8>, u32) {
    let mut r = XdrReader::new(reply);
    let status_code = r.read_u32().unwrap() as i32;
    let status = status_from_code(status_code);
    let tag = r.read_opaque(128).unwrap().to_vec();
    let numres = r.read_u32().unwrap();
    (status, tag, numres)
}

fn status_from_code(code: i32) -> Nfs4Status {
    match code {
        0 => Nfs4Status::Ok,
        10004 => Nfs4Status::NotSupp,
        10052 => Nfs4Status::BadSession,
        10054 => Nfs4Status::CompleteAlready,
        10070 => Nfs4Status::OpNotInSession,
        other => panic!("unexpected status code {other}"),
    }
}

fn exchange_id_compound(owner: &[u8], verifier: [u8; 8]) -> Vec<u8> {
    let mut w = compound_header(b"t", 1);
    w.put_u32(42); // EXCHANGE_ID opcode
    w.put_fixed(&verifier);
    w.put_opaque(owner);
    w.put_u32(0); // SP4_NONE
    w.freeze()
}

fn create_session_compound(client_id: u64, seqid: u32) -> Vec<u8> {
    let mut w = compound_header(b"t", 1);
    w.put_u32(43); // CREATE_SESSION
    w.put_u64(client_id);
    w.put_u32(seqid);
    w.put_u32(0); // flags
    write_channel_attrs(&mut w);
    write_channel_attrs(&mut w);
    w.put_u32(0); // no back channel requested
    w.freeze()
}

fn write_channel_attrs(w: &mut XdrWriter) {
    w.put_u32(0) // headerpadsize
        .put_u32(1_048_576) // maxrequestsize
        .put_u32(1_048_576) // maxresponsesize
        .put_u32(0) // maxresponsesize_cached
        .put_u32(16) // maxoperations
        .put_u32(64); // maxrequests
}

fn sequence_op(w: &mut XdrWriter, session: SessionHandle, seqid: u32, slot: u32, highest_slot: u32, cache_this: bool) {
    w.put_u32(53); // SEQUENCE
    w.put_fixed(&session.to_bytes());
    w.put_u32(seqid);
    w.put_u32(slot);
    w.put_u32(highest_slot);
    w.put_u32(if cache_this { 1 } else { 0 });
}

#[test]
fn exchange_id_then_create_session_confirms_client() {
    let mgr = manager();
    let mut fs = StubExecutor;
    let ctx = DispatchContext {
        conn_id: ConnId(1),
        principal: "alice@realm",
    };

    let reply = dispatch_compound(&mgr, &mut fs, &ctx, &exchange_id_compound(b"owner-a", [9; 8]));
    let (status, _tag, numres) = read_reply_header(&reply);
    assert_eq!(status, Nfs4Status::Ok);
    assert_eq!(numres, 1);

    let client_id = match mgr.exchange_id(b"owner-a".to_vec(), [9; 8], "alice@realm").unwrap() {
        ExchangeOutcome::Update(id) => id,
        ExchangeOutcome::NewUnconfirmed(id) => id,
    };

    let reply = dispatch_compound(&mgr, &mut fs, &ctx, &create_session_compound(client_id.get(), 1));
    let (status, _tag, numres) = read_reply_header(&reply);
    assert_eq!(status, Nfs4Status::Ok);
    assert_eq!(numres, 1);

    let admin = AdminApi::new(&mgr);
    assert_eq!(admin.list_sessions().len(), 1);
}

#[test]
fn sequence_replays_cached_reply_byte_for_byte() {
    let mgr = manager();
    let mut fs = StubExecutor;
    let ctx = DispatchContext {
        conn_id: ConnId(1),
        principal: "bob@realm",
    };

    let client_id = match mgr.exchange_id(b"owner-b".to_vec(), [1; 8], "bob@realm").unwrap() {
        ExchangeOutcome::NewUnconfirmed(id) => id,
        ExchangeOutcome::Update(id) => id,
    };
    let created = mgr
        .create_session(client_id, 1, mgr.config().server_fore_max, None)
        .unwrap();
    let handle = SessionHandle::new(mgr.boot_epoch(), created.session_id.get());

    let mut w = compound_header(b"seq", 1);
    sequence_op(&mut w, handle, 1, 0, 0, true);
    let body = w.freeze();

    let first = dispatch_compound(&mgr, &mut fs, &ctx, &body);
    let second = dispatch_compound(&mgr, &mut fs, &ctx, &body);
    assert_eq!(first, second);
}

#[test]
fn destroy_session_on_stale_boot_epoch_is_rejected() {
    let mgr = manager();
    let mut fs = StubExecutor;
    let ctx = DispatchContext {
        conn_id: ConnId(1),
        principal: "carol@realm",
    };

    let stale_handle = SessionHandle::new(mgr.boot_epoch().wrapping_add(1), 0);
    let mut w = compound_header(b"d", 1);
    w.put_u32(44); // DESTROY_SESSION
    w.put_fixed(&stale_handle.to_bytes());
    let body = w.freeze();

    let reply = dispatch_compound(&mgr, &mut fs, &ctx, &body);
    let (status, _tag, numres) = read_reply_header(&reply);
    assert_eq!(status, Nfs4Status::BadSession);
    assert_eq!(numres, 1);
}

#[test]
fn first_op_must_be_sequence_or_exempt() {
    let mgr = manager();
    let mut fs = StubExecutor;
    let ctx = DispatchContext {
        conn_id: ConnId(1),
        principal: "dave@realm",
    };

    let mut w = compound_header(b"g", 1);
    w.put_u32(9); // GETATTR, not session-exempt and not SEQUENCE
    let body = w.freeze();

    let reply = dispatch_compound(&mgr, &mut fs, &ctx, &body);
    let (status, _tag, numres) = read_reply_header(&reply);
    assert_eq!(status, Nfs4Status::OpNotInSession);
    assert_eq!(numres, 1);
}

#[test]
fn v40_only_op_after_sequence_is_rejected_without_corrupting_the_stream() {
    let mgr = manager();
    let mut fs = StubExecutor;
    let ctx = DispatchContext {
        conn_id: ConnId(1),
        principal: "erin@realm",
    };

    let client_id = match mgr.exchange_id(b"owner-e".to_vec(), [2; 8], "erin@realm").unwrap() {
        ExchangeOutcome::NewUnconfirmed(id) => id,
        ExchangeOutcome::Update(id) => id,
    };
    let created = mgr
        .create_session(client_id, 1, mgr.config().server_fore_max, None)
        .unwrap();
    let handle = SessionHandle::new(mgr.boot_epoch(), created.session_id.get());

    let mut w = compound_header(b"v40", 2);
    sequence_op(&mut w, handle, 1, 0, 0, false);
    w.put_u32(30); // RENEW, v4.0-only
    w.put_u64(client_id.get());
    let body = w.freeze();

    let reply = dispatch_compound(&mgr, &mut fs, &ctx, &body);
    let (status, _tag, numres) = read_reply_header(&reply);
    assert_eq!(status, Nfs4Status::NotSupp);
    assert_eq!(numres, 2);
}

#[test]
fn connection_tracker_forgets_identity_and_unbinds_on_close() {
    let mgr = manager();
    let tracker = ConnectionTracker::new();
    let client_id = match mgr.exchange_id(b"owner-f".to_vec(), [3; 8], "finn@realm").unwrap() {
        ExchangeOutcome::NewUnconfirmed(id) => id,
        ExchangeOutcome::Update(id) => id,
    };
    let created = mgr
        .create_session(client_id, 1, mgr.config().server_fore_max, None)
        .unwrap();

    let conn_id = ConnId(7);
    tracker.on_accept(conn_id, Identity::new("finn@realm", SecFlavor::Sys));
    mgr.bind_connection(conn_id, created.session_id, ConnTransport::Tcp, DirectionRequest::Fore)
        .unwrap();
    assert_eq!(mgr.connection_bindings(created.session_id).len(), 1);

    tracker.on_close(conn_id, &mgr);
    assert!(tracker.identity_of(conn_id).is_none());
    assert_eq!(mgr.connection_bindings(created.session_id).len(), 0);
}
