//! Per core statistics.
use crate::{config, error::Error, instruction::MemorySpace};
use std::sync::Arc;

/// Counters and block occupancy of a single core.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    core_id: usize,
    config: Arc<config::Core>,
    accesses: stats::Accesses,
    instructions: stats::InstructionCounts,
    sim: stats::Sim,
    occupancy: stats::Occupancy,
    /// Cycle at which the core last went from idle to busy.
    busy_since: u64,
    /// Last cycle an instruction instance was executed in.
    last_active_cycle: Option<u64>,
}

impl Ledger {
    #[must_use]
    pub fn new(core_id: usize, config: Arc<config::Core>) -> Self {
        let occupancy = stats::Occupancy::new(config.max_concurrent_blocks);
        Self {
            core_id,
            config,
            accesses: stats::Accesses::default(),
            instructions: stats::InstructionCounts::default(),
            sim: stats::Sim::default(),
            occupancy,
            busy_since: 0,
            last_active_cycle: None,
        }
    }

    pub fn record_load(&mut self, space: MemorySpace) -> Result<(), Error> {
        let class = space
            .load_class()
            .ok_or(Error::InvalidLoadSpace { space })?;
        self.accesses.inc(class, false, 1);
        Ok(())
    }

    pub fn record_store(&mut self, space: MemorySpace) -> Result<(), Error> {
        let class = space
            .store_class()
            .ok_or(Error::InvalidStoreSpace { space })?;
        self.accesses.inc(class, true, 1);
        Ok(())
    }

    /// Counts an instruction executed in `cycle`.
    ///
    /// Nops neither count as instruction instances nor keep the core
    /// from stalling.
    pub fn record_instruction(&mut self, kind: stats::InstructionKind, cycle: u64) {
        self.instructions.inc(kind, 1);
        if kind == stats::InstructionKind::Nop {
            return;
        }
        self.sim.instruction_instances += 1;
        if self.last_active_cycle != Some(cycle) {
            self.last_active_cycle = Some(cycle);
            self.sim.not_stalled_cycles += 1;
        }
    }

    pub fn record_block_issue(&mut self, slot: usize, cycle: u64) -> Result<(), Error> {
        let became_busy = self.occupancy.activate(slot, self.config.tick(cycle))?;
        if became_busy {
            self.busy_since = cycle;
        }
        Ok(())
    }

    pub fn record_block_commit(&mut self, slot: usize, cycle: u64) -> Result<(), Error> {
        let became_idle = self.occupancy.deactivate(slot, self.config.tick(cycle))?;
        if became_idle {
            self.sim.active_cycles += cycle.saturating_sub(self.busy_since);
        }
        Ok(())
    }

    pub fn kernel_completed(&mut self) {
        self.sim.kernels_completed += 1;
    }

    #[must_use]
    pub fn instructions_per_cycle(&self) -> f64 {
        self.sim.instructions_per_cycle()
    }

    #[must_use]
    pub fn occupancy(&self) -> &stats::Occupancy {
        &self.occupancy
    }

    /// Writes the activity history of every block slot as CSV.
    pub fn write_block_stats<W: std::io::Write>(&self, writer: W, cycle: u64) -> csv::Result<()> {
        self.occupancy
            .write_csv(self.core_id, self.config.tick(cycle), writer)
    }

    /// Snapshot of the counters, without fetch statistics.
    #[must_use]
    pub fn stats(&self) -> stats::Stats {
        stats::Stats {
            accesses: self.accesses.clone(),
            instructions: self.instructions.clone(),
            fetch: stats::Fetch::default(),
            sim: self.sim.clone(),
        }
    }
}
