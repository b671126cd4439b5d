use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Instruction categories reported by the shader model.
#[derive(
    Debug,
    Copy,
    Clone,
    strum::EnumIter,
    strum::EnumCount,
    strum::FromRepr,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[repr(usize)]
pub enum InstructionKind {
    Unknown = 0,
    Alu = 1,
    Mad = 2,
    Control = 3,
    Sfu = 4,
    Memory = 5,
    Texture = 6,
    Nop = 7,
}

pub const NUM_INSTRUCTION_KINDS: usize = 8;

/// Per category instruction counts.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionCounts(pub [u64; NUM_INSTRUCTION_KINDS]);

impl std::ops::AddAssign for InstructionCounts {
    fn add_assign(&mut self, other: Self) {
        for (count, other) in self.0.iter_mut().zip(other.0) {
            *count += other;
        }
    }
}

impl InstructionCounts {
    pub fn inc(&mut self, kind: InstructionKind, count: u64) {
        self.0[kind as usize] += count;
    }

    #[must_use]
    pub fn get(&self, kind: InstructionKind) -> u64 {
        self.0[kind as usize]
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }
}

impl std::fmt::Debug for InstructionCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut out = f.debug_struct("InstructionCounts");
        for kind in InstructionKind::iter() {
            let count = self.get(kind);
            if count > 0 {
                out.field(&format!("{kind:?}"), &count);
            }
        }
        out.finish_non_exhaustive()
    }
}
