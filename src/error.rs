use crate::{
    address,
    instruction::{MemOp, MemorySpace},
    packet::Command,
    translation::{Fault, Mode},
};

/// Contract violations that abort the simulation.
///
/// Backpressure is never reported as an error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("instruction translation encountered fault ({fault}) for address {vaddr:#x}")]
    TranslationFault { fault: Fault, vaddr: address },

    #[error("instruction translation for address {vaddr:#x} completed in {mode:?} mode")]
    UnexpectedTranslationMode { mode: Mode, vaddr: address },

    #[error("fetch of address {addr:#x} while line {line:#x} is already being fetched")]
    DuplicateFetch { addr: address, line: address },

    #[error("fetch response for line {line:#x} without a pending fetch")]
    UnknownFetchResponse { line: address },

    #[error("response to {vaddr:#x} on the instruction port is not an instruction fetch")]
    NotInstFetch { vaddr: address },

    #[error("retry received on the instruction port while no fetch is waiting")]
    UnexpectedRetry,

    #[error("fetch of {vaddr:#x} rejected on retry")]
    RetryRejected { vaddr: address },

    #[error("memory space {space:?} of instruction {uid} is not routed through the lsq")]
    UnsupportedSpace { space: MemorySpace, uid: u64 },

    #[error("unsupported memory operation {op:?} of instruction {uid}")]
    UnsupportedOperation { op: MemOp, uid: u64 },

    #[error("invalid access of {data_size} bytes x {vector_length} by instruction {uid}")]
    InvalidAccessSize {
        data_size: u32,
        vector_length: u32,
        uid: u64,
    },

    #[error("lane {lane} of instruction {uid} rejected after an earlier lane was accepted")]
    PartialIssue { lane: usize, uid: u64 },

    #[error("response to {vaddr:#x} on lane {lane} carries no instruction")]
    MissingSenderState { lane: usize, vaddr: address },

    #[error("response on lane {lane} refers to instruction {uid} which did not load on that lane")]
    MalformedSenderState { lane: usize, uid: u64 },

    #[error("unexpected {cmd:?} response on lane {lane}")]
    UnexpectedResponse { cmd: Command, lane: usize },

    #[error("writeback of lane {lane} blocked while lane {blocked} is already blocked")]
    WritebackAlreadyBlocked { lane: usize, blocked: usize },

    #[error("load from invalid space {space:?}")]
    InvalidLoadSpace { space: MemorySpace },

    #[error("store to invalid space {space:?}")]
    InvalidStoreSpace { space: MemorySpace },

    #[error("received unhandled {cmd:?} packet on the control port")]
    UnexpectedControlPacket { cmd: Command },

    #[error("flush request rejected by the control port")]
    FlushRejected,

    #[error("kernel finish requested while flush {uid} is still pending")]
    FlushPending { uid: u64 },

    #[error("unexpected retry on port {port}")]
    UnexpectedPortRetry { port: String },

    #[error("core {core_id} is not bound to a shader")]
    NotInitialized { core_id: usize },

    #[error("lane {lane} out of range (warp size is {warp_size})")]
    InvalidLane { lane: usize, warp_size: usize },

    #[error(transparent)]
    Occupancy(#[from] stats::occupancy::Error),
}
