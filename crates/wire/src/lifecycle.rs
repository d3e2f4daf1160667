//! Argument and result encodings for the nine session-management
//! operations this core implements directly. Everything else in a
//! COMPOUND is decoded by an injected filesystem operation handler that
//! knows the backend's own wire format.

use crate::reader::XdrReader;
use crate::session_handle::SessionHandle;
use crate::stateid::Stateid;
use crate::writer::XdrWriter;
use crate::{Error, Nfs4Status};

const MAX_OWNER_LEN: u32 = 1024;

fn read_bool(reader: &mut XdrReader) -> Result<bool, Error> {
    Ok(reader.read_u32()? != 0)
}

fn put_bool(writer: &mut XdrWriter, value: bool) -> &mut XdrWriter {
    writer.put_u32(if value { 1 } else { 0 })
}

fn read_verifier(reader: &mut XdrReader) -> Result<[u8; 8], Error> {
    let bytes = reader.read_fixed(8)?;
    Ok(bytes.try_into().unwrap())
}

/// Channel attributes as carried on the wire for CREATE_SESSION's fore and
/// back channel arguments/results. `max_requests` (the number of
/// concurrent slots requested) is the only field this core actually
/// negotiates; the rest pass through unchanged from whatever the embedding
/// server configures.
#[derive(Debug, Clone, Copy)]
pub struct ChannelAttrsWire {
    pub header_pad_size: u32,
    pub max_request_size: u32,
    pub max_response_size: u32,
    pub max_response_size_cached: u32,
    pub max_ops: u32,
    pub max_requests: u32,
}

impl ChannelAttrsWire {
    pub fn decode(reader: &mut XdrReader) -> Result<Self, Error> {
        Ok(Self {
            header_pad_size: reader.read_u32()?,
            max_request_size: reader.read_u32()?,
            max_response_size: reader.read_u32()?,
            max_response_size_cached: reader.read_u32()?,
            max_ops: reader.read_u32()?,
            max_requests: reader.read_u32()?,
        })
    }

    pub fn encode(&self, writer: &mut XdrWriter) {
        writer
            .put_u32(self.header_pad_size)
            .put_u32(self.max_request_size)
            .put_u32(self.max_response_size)
            .put_u32(self.max_response_size_cached)
            .put_u32(self.max_ops)
            .put_u32(self.max_requests);
    }
}

pub struct ExchangeIdArgs {
    pub client_owner: Vec<u8>,
    pub verifier: [u8; 8],
    pub state_protect_how: u32,
}

impl ExchangeIdArgs {
    pub fn decode(reader: &mut XdrReader) -> Result<Self, Error> {
        let verifier = read_verifier(reader)?;
        let client_owner = reader.read_opaque(MAX_OWNER_LEN)?.to_vec();
        let state_protect_how = reader.read_u32()?;
        Ok(Self {
            client_owner,
            verifier,
            state_protect_how,
        })
    }
}

pub struct ExchangeIdResult {
    pub client_id: u64,
    pub sequence_id: u32,
    pub flags: u32,
}

impl ExchangeIdResult {
    pub fn encode(&self, writer: &mut XdrWriter) {
        writer
            .put_u64(self.client_id)
            .put_u32(self.sequence_id)
            .put_u32(self.flags);
    }
}

pub struct CreateSessionArgs {
    pub client_id: u64,
    pub seqid: u32,
    pub flags: u32,
    pub fore_chan: ChannelAttrsWire,
    pub back_chan: Option<ChannelAttrsWire>,
}

impl CreateSessionArgs {
    pub fn decode(reader: &mut XdrReader) -> Result<Self, Error> {
        let client_id = reader.read_u64()?;
        let seqid = reader.read_u32()?;
        let flags = reader.read_u32()?;
        let fore_chan = ChannelAttrsWire::decode(reader)?;
        let back_chan = ChannelAttrsWire::decode(reader)?;
        let wants_back_chan = read_bool(reader)?;
        Ok(Self {
            client_id,
            seqid,
            flags,
            fore_chan,
            back_chan: wants_back_chan.then_some(back_chan),
        })
    }
}

pub struct CreateSessionResult {
    pub session_id: SessionHandle,
    pub seqid: u32,
    pub flags: u32,
    pub fore_chan: ChannelAttrsWire,
    pub back_chan: Option<ChannelAttrsWire>,
}

impl CreateSessionResult {
    pub fn encode(&self, writer: &mut XdrWriter) {
        writer
            .put_fixed(&self.session_id.to_bytes())
            .put_u32(self.seqid)
            .put_u32(self.flags);
        self.fore_chan.encode(writer);
        put_bool(writer, self.back_chan.is_some());
        if let Some(back) = &self.back_chan {
            back.encode(writer);
        }
    }
}

pub struct DestroySessionArgs {
    pub session_id: SessionHandle,
}

impl DestroySessionArgs {
    pub fn decode(reader: &mut XdrReader) -> Result<Self, Error> {
        let bytes: [u8; 16] = reader.read_fixed(16)?.try_into().unwrap();
        Ok(Self {
            session_id: SessionHandle::from_bytes(bytes),
        })
    }
}

pub struct DestroyClientIdArgs {
    pub client_id: u64,
}

impl DestroyClientIdArgs {
    pub fn decode(reader: &mut XdrReader) -> Result<Self, Error> {
        Ok(Self {
            client_id: reader.read_u64()?,
        })
    }
}

pub struct ReclaimCompleteArgs {
    pub one_fs: bool,
}

impl ReclaimCompleteArgs {
    pub fn decode(reader: &mut XdrReader) -> Result<Self, Error> {
        Ok(Self {
            one_fs: read_bool(reader)?,
        })
    }
}

/// Requested/granted connection direction, per RFC 8881's
/// `channel_dir_from_client4` / `channel_dir_from_server4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedDirection {
    Fore,
    Back,
    Both,
}

impl RequestedDirection {
    fn decode(code: u32) -> Result<Self, Error> {
        match code {
            1 => Ok(Self::Fore),
            2 => Ok(Self::Back),
            3 => Ok(Self::Both),
            _ => Err(Error::BadXdr),
        }
    }

    fn wants_back(self) -> bool {
        matches!(self, Self::Back | Self::Both)
    }
}

pub struct BindConnToSessionArgs {
    pub session_id: SessionHandle,
    pub direction: RequestedDirection,
    pub use_rdma: bool,
}

impl BindConnToSessionArgs {
    pub fn decode(reader: &mut XdrReader) -> Result<Self, Error> {
        let bytes: [u8; 16] = reader.read_fixed(16)?.try_into().unwrap();
        let direction = RequestedDirection::decode(reader.read_u32()?)?;
        let use_rdma = read_bool(reader)?;
        Ok(Self {
            session_id: SessionHandle::from_bytes(bytes),
            direction,
            use_rdma,
        })
    }

    pub fn wants_back_channel(&self) -> bool {
        self.direction.wants_back()
    }
}

pub struct BindConnToSessionResult {
    pub session_id: SessionHandle,
    pub granted_both: bool,
    pub use_rdma: bool,
}

impl BindConnToSessionResult {
    pub fn encode(&self, writer: &mut XdrWriter) {
        writer.put_fixed(&self.session_id.to_bytes());
        writer.put_u32(if self.granted_both { 3 } else { 1 });
        put_bool(writer, self.use_rdma);
    }
}

pub struct SequenceArgs {
    pub session_id: SessionHandle,
    pub sequence_id: u32,
    pub slot_id: u32,
    pub highest_slot_id: u32,
    pub cache_this: bool,
}

impl SequenceArgs {
    pub fn decode(reader: &mut XdrReader) -> Result<Self, Error> {
        let bytes: [u8; 16] = reader.read_fixed(16)?.try_into().unwrap();
        let sequence_id = reader.read_u32()?;
        let slot_id = reader.read_u32()?;
        let highest_slot_id = reader.read_u32()?;
        let cache_this = read_bool(reader)?;
        Ok(Self {
            session_id: SessionHandle::from_bytes(bytes),
            sequence_id,
            slot_id,
            highest_slot_id,
            cache_this,
        })
    }
}

/// SEQUENCE's `sr_status_flags` bits this core can actually set. The full
/// RFC bitmap has a dozen more, all tied to backend state this crate does
/// not track.
pub const SEQ4_STATUS_CB_PATH_DOWN: u32 = 0x0000_0001;
pub const SEQ4_STATUS_EXPIRED_ALL_STATE_REVOKED: u32 = 0x0000_0002;

pub struct SequenceResult {
    pub session_id: SessionHandle,
    pub sequence_id: u32,
    pub slot_id: u32,
    pub highest_slot_id: u32,
    pub target_highest_slot_id: u32,
    pub status_flags: u32,
}

impl SequenceResult {
    pub fn encode(&self, writer: &mut XdrWriter) {
        writer
            .put_fixed(&self.session_id.to_bytes())
            .put_u32(self.sequence_id)
            .put_u32(self.slot_id)
            .put_u32(self.highest_slot_id)
            .put_u32(self.target_highest_slot_id)
            .put_u32(self.status_flags);
    }
}

pub struct FreeStateidArgs {
    pub stateid: Stateid,
}

impl FreeStateidArgs {
    pub fn decode(reader: &mut XdrReader) -> Result<Self, Error> {
        let seqid = reader.read_u32()?;
        let other: [u8; 12] = reader.read_fixed(12)?.try_into().unwrap();
        Ok(Self {
            stateid: Stateid { seqid, other },
        })
    }
}

/// RFC 8881 doesn't fix a hard limit on TEST_STATEID's array, but an
/// unbounded count lets a client force an arbitrarily large allocation
/// before a single byte of stateid data has been validated.
const MAX_TEST_STATEIDS: usize = 1024;

#[derive(Debug)]
pub struct TestStateidArgs {
    pub stateids: Vec<Stateid>,
}

impl TestStateidArgs {
    pub fn decode(reader: &mut XdrReader) -> Result<Self, Error> {
        let count = reader.read_u32()? as usize;
        if count > MAX_TEST_STATEIDS {
            return Err(Error::BadXdr);
        }
        let mut stateids = Vec::with_capacity(count);
        for _ in 0..count {
            let seqid = reader.read_u32()?;
            let other: [u8; 12] = reader.read_fixed(12)?.try_into().unwrap();
            stateids.push(Stateid { seqid, other });
        }
        Ok(Self { stateids })
    }
}

pub struct TestStateidResult {
    pub statuses: Vec<Nfs4Status>,
}

impl TestStateidResult {
    pub fn encode(&self, writer: &mut XdrWriter) {
        writer.put_u32(self.statuses.len() as u32);
        for status in &self.statuses {
            writer.put_u32(status.code() as u32);
        }
    }
}
