//! COMPOUND decode/dispatch loop.
//!
//! NFSv4's XDR has no per-operation length prefix: every argument type is
//! decoded structurally, by a reader that already knows that operation's
//! layout. This core only knows the layout of the lifecycle operations it
//! implements and of the handful of v4.0-only operations it must reject.
//! Everything else — every filesystem operation — is handed to an injected
//! [`FsOpExecutor`] that decodes, executes, and encodes it directly against
//! the shared cursor, since there is no way to "skip" an operation whose
//! shape this crate was never told.

use state::{ClientId, Clock, ConnId, MetricsRecorder, SessionId, StateManager};
use wire::{Nfs4Op, Nfs4Status, XdrReader, XdrWriter};

use crate::lifecycle;
use crate::lifecycle::sequence::SequenceDecision;

const MAX_TAG_LEN: u32 = 128;
const SUPPORTED_MINOR_VERSION: u32 = 1;

/// An embedding server's handler for any operation this core does not
/// implement directly: the READs, WRITEs, OPENs, LOCKs, and everything
/// else that touches the filesystem backend.
///
/// Called with the operation's numeric code already consumed from `reader`
/// (so `reader`'s cursor sits exactly at the start of that op's argument
/// encoding). The implementation must decode its arguments, perform the
/// operation, and append the result to `writer` as the op's own
/// `nfs_resop4` body — status word first, any further fields only when that
/// status is `NFS4_OK` — then return the same status for the dispatcher's
/// bookkeeping.
pub trait FsOpExecutor {
    fn execute(&mut self, op_code: u32, reader: &mut XdrReader, writer: &mut XdrWriter) -> Nfs4Status;
}

/// Caller-supplied context a COMPOUND is dispatched under: which connection
/// it arrived on (for BIND_CONN_TO_SESSION and connection-close bookkeeping)
/// and which principal authenticated it (for EXCHANGE_ID).
pub struct DispatchContext<'a> {
    pub conn_id: ConnId,
    pub principal: &'a str,
}

/// Decode and run one COMPOUND request, returning its fully encoded
/// `COMPOUND4res`.
pub fn dispatch_compound<C, M, F>(
    state: &StateManager<C, M>,
    fs: &mut F,
    ctx: &DispatchContext<'_>,
    body: &[u8],
) -> Vec<u8>
where
    C: Clock,
    M: MetricsRecorder,
    F: FsOpExecutor,
{
    let mut reader = XdrReader::new(body);

    let tag = match reader.read_opaque(MAX_TAG_LEN) {
        Ok(tag) => tag.to_vec(),
        Err(_) => return encode_header_only(&[], Nfs4Status::BadXdr),
    };

    let minorversion = match reader.read_u32() {
        Ok(v) => v,
        Err(_) => return encode_header_only(&tag, Nfs4Status::BadXdr),
    };
    if minorversion != SUPPORTED_MINOR_VERSION {
        return encode_header_only(&tag, Nfs4Status::NotSupp);
    }

    let numops = match reader.read_u32() {
        Ok(n) => n,
        Err(_) => return encode_header_only(&tag, Nfs4Status::BadXdr),
    };

    let mut results = XdrWriter::default();
    let mut num_results: u32 = 0;
    let mut overall_status = Nfs4Status::Ok;
    let mut sequence_ctx: Option<(SessionId, usize, bool)> = None;
    let mut client_ctx: Option<ClientId> = None;

    for i in 0..numops {
        let op_code = match reader.read_u32() {
            Ok(code) => code,
            Err(_) => {
                overall_status = Nfs4Status::BadXdr;
                break;
            }
        };
        let op = Nfs4Op::from_code(op_code);

        if i == 0 && op != Nfs4Op::Sequence && !op.is_session_exempt() {
            results.put_u32(op_code);
            results.put_u32(Nfs4Status::OpNotInSession.code() as u32);
            num_results = 1;
            overall_status = Nfs4Status::OpNotInSession;
            break;
        }

        if op == Nfs4Op::Sequence {
            match lifecycle::sequence::handle(state, &mut reader, ctx.conn_id) {
                SequenceDecision::Replayed { reply, status } => return finalize_cached(reply, status),
                SequenceDecision::Proceed {
                    session_id,
                    slot_id,
                    cache_this,
                    client_id,
                    result,
                } => {
                    results.put_u32(op_code);
                    results.put_u32(Nfs4Status::Ok.code() as u32);
                    result.encode(&mut results);
                    num_results += 1;
                    sequence_ctx = Some((session_id, slot_id, cache_this));
                    client_ctx = Some(client_id);
                    continue;
                }
                SequenceDecision::Rejected(status) => {
                    results.put_u32(op_code);
                    results.put_u32(status.code() as u32);
                    num_results += 1;
                    overall_status = status;
                    break;
                }
            }
        }

        if op.is_v40_only() {
            skip_v40_args(op, &mut reader);
            results.put_u32(op_code);
            results.put_u32(Nfs4Status::NotSupp.code() as u32);
            num_results += 1;
            overall_status = Nfs4Status::NotSupp;
            break;
        }

        let status = match op {
            Nfs4Op::Illegal => {
                results.put_u32(op_code);
                results.put_u32(Nfs4Status::OpIllegal.code() as u32);
                Nfs4Status::OpIllegal
            }
            Nfs4Op::ExchangeId => encode_result(&mut results, op_code, lifecycle::exchange_id::handle(state, ctx.principal, &mut reader)),
            Nfs4Op::CreateSession => encode_result(&mut results, op_code, lifecycle::create_session::handle(state, &mut reader)),
            Nfs4Op::DestroySession => encode_unit_result(&mut results, op_code, lifecycle::destroy_session::handle(state, &mut reader)),
            Nfs4Op::DestroyClientId => encode_unit_result(&mut results, op_code, lifecycle::destroy_clientid::handle(state, &mut reader)),
            Nfs4Op::ReclaimComplete => {
                let client_id = client_ctx.unwrap_or(ClientId(0));
                encode_unit_result(
                    &mut results,
                    op_code,
                    lifecycle::reclaim_complete::handle(state, client_id, &mut reader),
                )
            }
            Nfs4Op::BindConnToSession => encode_result(
                &mut results,
                op_code,
                lifecycle::bind_conn_to_session::handle(state, ctx.conn_id, &mut reader),
            ),
            Nfs4Op::FreeStateid => encode_unit_result(&mut results, op_code, lifecycle::free_stateid::handle(state, &mut reader)),
            Nfs4Op::TestStateid => encode_result(&mut results, op_code, lifecycle::test_stateid::handle(state, &mut reader)),
            _ => dispatch_fs_op(fs, op_code, &mut reader, &mut results),
        };
        num_results += 1;

        if !status.is_ok() {
            overall_status = status;
            break;
        }
    }

    let mut out = XdrWriter::default();
    out.put_u32(overall_status.code() as u32);
    out.put_opaque(&tag);
    out.put_u32(num_results);
    out.put_fixed(&results.freeze());
    let reply = out.freeze();

    if let Some((session_id, slot_id, cache_this)) = sequence_ctx {
        let _ = state.complete_sequence(session_id, slot_id, reply.clone(), overall_status, cache_this);
    }

    reply
}

/// Encode a result that has no body beyond its status word.
fn encode_unit_result(writer: &mut XdrWriter, op_code: u32, result: Result<(), Nfs4Status>) -> Nfs4Status {
    writer.put_u32(op_code);
    match result {
        Ok(()) => {
            writer.put_u32(Nfs4Status::Ok.code() as u32);
            Nfs4Status::Ok
        }
        Err(status) => {
            writer.put_u32(status.code() as u32);
            status
        }
    }
}

/// Encode a result carrying a body on success, consistent with how every
/// RFC 8881 `*4res` union is discriminated by its leading status word.
fn encode_result<T: Encodable>(writer: &mut XdrWriter, op_code: u32, result: Result<T, Nfs4Status>) -> Nfs4Status {
    writer.put_u32(op_code);
    match result {
        Ok(body) => {
            writer.put_u32(Nfs4Status::Ok.code() as u32);
            body.encode(writer);
            Nfs4Status::Ok
        }
        Err(status) => {
            writer.put_u32(status.code() as u32);
            status
        }
    }
}

trait Encodable {
    fn encode(&self, writer: &mut XdrWriter);
}

impl Encodable for wire::lifecycle::ExchangeIdResult {
    fn encode(&self, writer: &mut XdrWriter) {
        wire::lifecycle::ExchangeIdResult::encode(self, writer)
    }
}

impl Encodable for wire::lifecycle::CreateSessionResult {
    fn encode(&self, writer: &mut XdrWriter) {
        wire::lifecycle::CreateSessionResult::encode(self, writer)
    }
}

impl Encodable for wire::lifecycle::BindConnToSessionResult {
    fn encode(&self, writer: &mut XdrWriter) {
        wire::lifecycle::BindConnToSessionResult::encode(self, writer)
    }
}

impl Encodable for wire::lifecycle::TestStateidResult {
    fn encode(&self, writer: &mut XdrWriter) {
        wire::lifecycle::TestStateidResult::encode(self, writer)
    }
}

/// Run an injected filesystem operation, containing a panic so one bad
/// operation cannot take down the whole COMPOUND loop. The op code is
/// already written to `writer`; on a panic anything the handler wrote for
/// its own body is discarded and replaced with a bare `NFS4ERR_SERVERFAULT`.
fn dispatch_fs_op<F: FsOpExecutor>(fs: &mut F, op_code: u32, reader: &mut XdrReader, writer: &mut XdrWriter) -> Nfs4Status {
    let mark = writer.len();
    writer.put_u32(op_code);

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| fs.execute(op_code, reader, writer)));

    match outcome {
        Ok(status) => status,
        Err(_) => {
            log::error!("filesystem operation {op_code} panicked during dispatch");
            writer.truncate(mark);
            writer.put_u32(op_code);
            writer.put_u32(Nfs4Status::ServerFault.code() as u32);
            Nfs4Status::ServerFault
        }
    }
}

fn encode_header_only(tag: &[u8], status: Nfs4Status) -> Vec<u8> {
    let mut out = XdrWriter::default();
    out.put_u32(status.code() as u32);
    out.put_opaque(tag);
    out.put_u32(0);
    out.freeze()
}

fn finalize_cached(reply: Vec<u8>, _status: Nfs4Status) -> Vec<u8> {
    reply
}

/// Consume the arguments of a v4.0-only operation without interpreting
/// them, so the cursor lands correctly on the next operation before this
/// one is rejected with NFS4ERR_NOTSUPP.
fn skip_v40_args(op: Nfs4Op, reader: &mut XdrReader) {
    const MAX_OPAQUE: u32 = 1024;
    let _ = match op {
        Nfs4Op::SetClientId => (|| -> Result<(), wire::Error> {
            reader.read_fixed(8)?; // client verifier
            reader.skip_opaque(MAX_OPAQUE)?; // client id string
            reader.read_u32()?; // cb_program
            reader.skip_opaque(MAX_OPAQUE)?; // r_netid
            reader.skip_opaque(MAX_OPAQUE)?; // r_addr
            reader.read_u32()?; // callback_ident
            Ok(())
        })(),
        Nfs4Op::SetClientIdConfirm => (|| -> Result<(), wire::Error> {
            reader.read_u64()?; // clientid
            reader.read_fixed(8)?; // verifier
            Ok(())
        })(),
        Nfs4Op::Renew => (|| -> Result<(), wire::Error> {
            reader.read_u64()?; // clientid
            Ok(())
        })(),
        Nfs4Op::OpenConfirm => (|| -> Result<(), wire::Error> {
            reader.read_fixed(16)?; // stateid
            reader.read_u32()?; // seqid
            Ok(())
        })(),
        Nfs4Op::ReleaseLockOwner => (|| -> Result<(), wire::Error> {
            reader.read_u64()?; // clientid
            reader.skip_opaque(MAX_OPAQUE)?; // owner
            Ok(())
        })(),
        _ => Ok(()),
    };
}
