#![allow(clippy::cast_precision_loss)]

pub mod fetch;
pub mod instructions;
pub mod mem;
pub mod occupancy;
pub mod sim;

pub use fetch::Fetch;
pub use instructions::{InstructionCounts, InstructionKind};
pub use mem::{Accesses, MemorySpace};
pub use occupancy::Occupancy;
pub use sim::Sim;

use serde::{Deserialize, Serialize};

/// Counters of a single core.
///
/// Stats of many cores are summed with `+=` by whoever collects them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub accesses: Accesses,
    pub instructions: InstructionCounts,
    pub fetch: Fetch,
    pub sim: Sim,
}

impl std::ops::AddAssign for Stats {
    fn add_assign(&mut self, other: Self) {
        self.accesses += other.accesses;
        self.instructions += other.instructions;
        self.fetch += other.fetch;
        self.sim += other.sim;
    }
}

#[cfg(test)]
mod tests {
    use super::{InstructionKind, MemorySpace, Stats};
    use pretty_assertions_sorted::assert_eq_sorted;

    #[test]
    fn aggregate_cores() {
        let mut core0 = Stats::default();
        core0.accesses.inc(MemorySpace::Global, false, 4);
        core0.instructions.inc(InstructionKind::Alu, 2);
        core0.fetch.requests = 3;
        core0.sim.active_cycles = 10;

        let mut core1 = Stats::default();
        core1.accesses.inc(MemorySpace::Global, false, 1);
        core1.accesses.inc(MemorySpace::Shared, true, 1);
        core1.fetch.retries = 1;
        core1.sim.active_cycles = 5;
        core1.sim.kernels_completed = 1;

        let mut total = Stats::default();
        total += core0;
        total += core1;

        let mut expected = Stats::default();
        expected.accesses.inc(MemorySpace::Global, false, 5);
        expected.accesses.inc(MemorySpace::Shared, true, 1);
        expected.instructions.inc(InstructionKind::Alu, 2);
        expected.fetch.requests = 3;
        expected.fetch.retries = 1;
        expected.sim.active_cycles = 15;
        expected.sim.kernels_completed = 1;
        assert_eq_sorted!(total, expected);
    }
}
