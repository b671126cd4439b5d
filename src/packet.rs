use super::{address, instruction::WarpInstruction};
use once_cell::sync::Lazy;
use smallvec::SmallVec;
use std::sync::{atomic, Arc};

/// Requestor of a memory request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Master {
    /// instruction fetch unit
    Inst,
    /// load store queue (lanes and control port)
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Command {
    ReadReq,
    WriteReq,
    FlushReq,
    ReadResp,
    WriteResp,
    FlushResp,
}

impl Command {
    #[must_use]
    #[inline]
    pub fn is_read(self) -> bool {
        matches!(self, Command::ReadReq | Command::ReadResp)
    }

    #[must_use]
    #[inline]
    pub fn is_write(self) -> bool {
        matches!(self, Command::WriteReq | Command::WriteResp)
    }

    #[must_use]
    #[inline]
    pub fn is_flush(self) -> bool {
        matches!(self, Command::FlushReq | Command::FlushResp)
    }

    #[must_use]
    #[inline]
    pub fn is_request(self) -> bool {
        matches!(
            self,
            Command::ReadReq | Command::WriteReq | Command::FlushReq
        )
    }

    #[must_use]
    #[inline]
    pub fn is_response(self) -> bool {
        !self.is_request()
    }

    #[must_use]
    pub fn response(self) -> Self {
        match self {
            Command::ReadReq | Command::ReadResp => Command::ReadResp,
            Command::WriteReq | Command::WriteResp => Command::WriteResp,
            Command::FlushReq | Command::FlushResp => Command::FlushResp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Request {
    /// Virtual address.
    pub vaddr: address,
    /// Physical address, once translated.
    pub paddr: Option<address>,
    /// Requested number of bytes.
    pub size: u32,
    pub inst_fetch: bool,
    pub master: Master,
    pub pc: address,
    pub core_id: Option<usize>,
    pub warp_id: Option<usize>,
}

impl Request {
    #[must_use]
    pub fn new(vaddr: address, size: u32, master: Master, pc: address) -> Self {
        Self {
            vaddr,
            paddr: None,
            size,
            inst_fetch: false,
            master,
            pc,
            core_id: None,
            warp_id: None,
        }
    }

    /// Instruction fetch of `size` bytes starting at `vaddr`.
    #[must_use]
    pub fn inst_fetch(vaddr: address, size: u32, pc: address) -> Self {
        Self {
            inst_fetch: true,
            ..Self::new(vaddr, size, Master::Inst, pc)
        }
    }

    #[must_use]
    pub fn with_context(mut self, core_id: usize, warp_id: usize) -> Self {
        self.core_id = Some(core_id);
        self.warp_id = Some(warp_id);
        self
    }
}

/// State attached by the sender and handed back with the response.
///
/// Only loads carry a sender state, since only loads return data to the core.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SenderState {
    pub instr: Arc<WarpInstruction>,
}

/// A memory transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Packet {
    pub uid: u64,
    pub req: Request,
    pub cmd: Command,
    pub data: SmallVec<[u8; 16]>,
    pub sender_state: Option<SenderState>,
}

static PACKET_UID: Lazy<atomic::AtomicU64> = Lazy::new(|| atomic::AtomicU64::new(0));

/// Generate a unique ID that can be used to identify packets
pub fn generate_uid() -> u64 {
    PACKET_UID.fetch_add(1, atomic::Ordering::SeqCst)
}

impl std::fmt::Display for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}@{:#x}", self.cmd, self.req.vaddr)
    }
}

impl Packet {
    #[must_use]
    pub fn new(req: Request, cmd: Command) -> Self {
        Self {
            uid: generate_uid(),
            req,
            cmd,
            data: SmallVec::new(),
            sender_state: None,
        }
    }

    /// Allocates a zeroed payload for the requested size.
    pub fn allocate(&mut self) {
        self.data = smallvec::smallvec![0; self.req.size as usize];
    }

    #[must_use]
    pub fn with_sender_state(mut self, instr: Arc<WarpInstruction>) -> Self {
        self.sender_state = Some(SenderState { instr });
        self
    }

    /// Copies `data` into the payload.
    ///
    /// The payload must have been allocated.
    pub fn set_data(&mut self, data: &[u8]) {
        let n = data.len().min(self.data.len());
        self.data[..n].copy_from_slice(&data[..n]);
    }

    /// Copies the payload into `out`, returning the number of bytes copied.
    pub fn write_data(&self, out: &mut [u8]) -> usize {
        let n = self.data.len().min(out.len());
        out[..n].copy_from_slice(&self.data[..n]);
        n
    }

    #[must_use]
    #[inline]
    pub fn size(&self) -> u32 {
        self.req.size
    }

    #[must_use]
    #[inline]
    pub fn vaddr(&self) -> address {
        self.req.vaddr
    }

    #[must_use]
    #[inline]
    pub fn is_inst_fetch(&self) -> bool {
        self.req.inst_fetch
    }

    #[must_use]
    #[inline]
    pub fn is_read(&self) -> bool {
        self.cmd.is_read()
    }

    #[must_use]
    #[inline]
    pub fn is_write(&self) -> bool {
        self.cmd.is_write()
    }

    #[must_use]
    #[inline]
    pub fn is_flush(&self) -> bool {
        self.cmd.is_flush()
    }

    /// Turns this request into its response.
    pub fn make_response(&mut self) {
        self.cmd = self.cmd.response();
    }
}
