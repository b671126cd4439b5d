use crate::{
    address,
    config::{MAX_ACCESS_BUFFER_SIZE, MAX_WARP_SIZE},
};
use bitvec::BitArr;

/// Thread active mask.
///
/// Bitmask where a 1 at position i means that lane i is active for the current instruction.
pub type ActiveMask = BitArr!(for MAX_WARP_SIZE, in u32);

#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, strum::EnumIter)]
pub enum MemorySpace {
    Undefined,
    Register,
    Local,
    Shared,
    ParamUnclassified,
    /// global to all threads in a kernel (read-only)
    ParamKernel,
    /// local to a thread (read-writable)
    ParamLocal,
    Constant,
    Texture,
    Surface,
    Global,
    Generic,
    Instruction,
}

impl MemorySpace {
    /// Spaces whose accesses are routed through the lane ports of the core.
    ///
    /// All other spaces are served by a separate path of the shader model.
    #[must_use]
    pub fn is_lsq_routed(self) -> bool {
        matches!(self, MemorySpace::Global | MemorySpace::Constant)
    }

    /// Statistics class of a load from this space.
    #[must_use]
    pub fn load_class(self) -> Option<stats::MemorySpace> {
        match self {
            MemorySpace::Local => Some(stats::MemorySpace::Local),
            MemorySpace::Shared => Some(stats::MemorySpace::Shared),
            MemorySpace::ParamKernel => Some(stats::MemorySpace::ParamKernel),
            MemorySpace::ParamLocal => Some(stats::MemorySpace::ParamLocal),
            MemorySpace::Constant => Some(stats::MemorySpace::Constant),
            MemorySpace::Texture => Some(stats::MemorySpace::Texture),
            MemorySpace::Surface => Some(stats::MemorySpace::Surface),
            MemorySpace::Global => Some(stats::MemorySpace::Global),
            MemorySpace::Generic => Some(stats::MemorySpace::Generic),
            MemorySpace::Undefined
            | MemorySpace::Register
            | MemorySpace::ParamUnclassified
            | MemorySpace::Instruction => None,
        }
    }

    /// Statistics class of a store to this space.
    ///
    /// Read-only spaces can not be stored to.
    #[must_use]
    pub fn store_class(self) -> Option<stats::MemorySpace> {
        match self {
            MemorySpace::Local => Some(stats::MemorySpace::Local),
            MemorySpace::Shared => Some(stats::MemorySpace::Shared),
            MemorySpace::ParamLocal => Some(stats::MemorySpace::ParamLocal),
            MemorySpace::Global => Some(stats::MemorySpace::Global),
            MemorySpace::Generic => Some(stats::MemorySpace::Generic),
            MemorySpace::ParamKernel
            | MemorySpace::Constant
            | MemorySpace::Texture
            | MemorySpace::Surface
            | MemorySpace::Undefined
            | MemorySpace::Register
            | MemorySpace::ParamUnclassified
            | MemorySpace::Instruction => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemOp {
    Load,
    Store,
    /// Any other operation, e.g. an atomic or a barrier.
    Other,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct PerThreadInfo {
    /// Effective address
    pub addr: address,
    /// Store data of this lane
    pub data: [u8; MAX_ACCESS_BUFFER_SIZE as usize],
}

/// A memory instruction executed by all active lanes of a warp.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct WarpInstruction {
    /// Globally unique id for this warp instruction.
    pub uid: u64,
    pub warp_id: usize,
    pub pc: address,
    pub memory_space: MemorySpace,
    pub mem_op: MemOp,
    /// size of the word being operated on
    pub data_size: u32,
    /// number of words accessed per lane
    pub vector_length: u32,
    pub active_mask: ActiveMask,
    pub threads: Vec<PerThreadInfo>,
}

impl WarpInstruction {
    #[must_use]
    pub fn new(
        uid: u64,
        warp_id: usize,
        pc: address,
        memory_space: MemorySpace,
        mem_op: MemOp,
        data_size: u32,
    ) -> Self {
        Self {
            uid,
            warp_id,
            pc,
            memory_space,
            mem_op,
            data_size,
            vector_length: 1,
            active_mask: ActiveMask::ZERO,
            threads: vec![PerThreadInfo::default(); MAX_WARP_SIZE],
        }
    }

    #[must_use]
    pub fn with_vector_length(mut self, vector_length: u32) -> Self {
        self.vector_length = vector_length;
        self
    }

    /// Activates `lane` with effective address `addr`.
    #[must_use]
    pub fn with_lane(mut self, lane: usize, addr: address) -> Self {
        self.set_addr(lane, addr);
        self
    }

    /// Activates `lane` with effective address `addr` and store data `data`.
    #[must_use]
    pub fn with_store_lane(mut self, lane: usize, addr: address, data: &[u8]) -> Self {
        self.set_addr(lane, addr);
        self.threads[lane].data[..data.len()].copy_from_slice(data);
        self
    }

    #[inline]
    pub fn set_addr(&mut self, lane: usize, addr: address) {
        self.active_mask.set(lane, true);
        self.threads[lane].addr = addr;
    }

    #[must_use]
    #[inline]
    pub fn active(&self, lane: usize) -> bool {
        self.active_mask.get(lane).is_some_and(|active| *active)
    }

    /// Active lanes in ascending order.
    pub fn active_lanes(&self) -> impl Iterator<Item = usize> + '_ {
        self.active_mask.iter_ones()
    }

    #[must_use]
    #[inline]
    pub fn active_thread_count(&self) -> usize {
        self.active_mask.count_ones()
    }

    #[must_use]
    #[inline]
    pub fn is_load(&self) -> bool {
        self.mem_op == MemOp::Load
    }

    #[must_use]
    #[inline]
    pub fn is_store(&self) -> bool {
        self.mem_op == MemOp::Store
    }

    #[must_use]
    #[inline]
    pub fn addr(&self, lane: usize) -> address {
        self.threads[lane].addr
    }

    /// Store data of `lane`, sized to the access of a single lane.
    #[must_use]
    pub fn data(&self, lane: usize) -> &[u8] {
        let size = (self.access_size() as usize).min(MAX_ACCESS_BUFFER_SIZE as usize);
        &self.threads[lane].data[..size]
    }

    /// Number of bytes accessed by every active lane.
    #[must_use]
    #[inline]
    pub fn access_size(&self) -> u32 {
        self.data_size * self.vector_length
    }
}

impl std::fmt::Display for WarpInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{:?}[{:?}](uid={}, warp={}, pc={:#x})",
            self.mem_op, self.memory_space, self.uid, self.warp_id, self.pc
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{MemOp, MemorySpace, WarpInstruction};
    use strum::IntoEnumIterator;

    #[test]
    fn active_lanes_are_ascending() {
        let instr = WarpInstruction::new(0, 0, 0x100, MemorySpace::Global, MemOp::Load, 4)
            .with_lane(7, 0x20)
            .with_lane(1, 0x10)
            .with_lane(3, 0x18);
        assert_eq!(instr.active_lanes().collect::<Vec<_>>(), vec![1, 3, 7]);
        assert_eq!(instr.active_thread_count(), 3);
        assert!(instr.active(3));
        assert!(!instr.active(2));
        assert!(!instr.active(100));
        assert_eq!(instr.addr(7), 0x20);
    }

    #[test]
    fn store_data_is_sized_to_access() {
        let instr = WarpInstruction::new(0, 0, 0x100, MemorySpace::Global, MemOp::Store, 4)
            .with_vector_length(2)
            .with_store_lane(0, 0x40, &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(instr.access_size(), 8);
        assert_eq!(instr.data(0), &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn only_global_and_const_are_lsq_routed() {
        let routed: Vec<_> = MemorySpace::iter()
            .filter(|space| space.is_lsq_routed())
            .collect();
        assert_eq!(routed, vec![MemorySpace::Constant, MemorySpace::Global]);
    }

    #[test]
    fn read_only_spaces_have_no_store_class() {
        assert!(MemorySpace::Constant.load_class().is_some());
        assert!(MemorySpace::Constant.store_class().is_none());
        assert!(MemorySpace::ParamKernel.store_class().is_none());
        assert!(MemorySpace::ParamLocal.store_class().is_some());
        assert!(MemorySpace::Register.load_class().is_none());
        assert!(MemorySpace::Instruction.load_class().is_none());
    }
}
