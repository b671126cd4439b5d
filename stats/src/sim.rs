use serde::{Deserialize, Serialize};

/// Core activity counters.
#[derive(Clone, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sim {
    /// Number of cycles the core was executing at least one block.
    pub active_cycles: u64,
    /// Number of cycles the core issued at least one instruction instance.
    pub not_stalled_cycles: u64,
    /// Total instructions executed by all lanes of the core.
    pub instruction_instances: u64,
    pub kernels_completed: u64,
}

impl std::ops::AddAssign for Sim {
    fn add_assign(&mut self, other: Self) {
        self.active_cycles += other.active_cycles;
        self.not_stalled_cycles += other.not_stalled_cycles;
        self.instruction_instances += other.instruction_instances;
        self.kernels_completed += other.kernels_completed;
    }
}

impl Sim {
    /// Instruction instances per active cycle.
    #[must_use]
    pub fn instructions_per_cycle(&self) -> f64 {
        if self.active_cycles == 0 {
            return 0.0;
        }
        self.instruction_instances as f64 / self.active_cycles as f64
    }
}
