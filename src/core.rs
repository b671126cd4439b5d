use super::{
    address, config,
    error::Error,
    fetch::FetchUnit,
    flush::FlushCoordinator,
    instruction::{MemorySpace, WarpInstruction},
    ledger::Ledger,
    lsq::LoadStoreQueue,
    packet::Packet,
    port::{Delivery, Port},
    shader::{Gpu, ShaderModel},
    translation::{TranslationState, Translator},
    writeback::WritebackArbiter,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Memory timing model of a single shader core.
///
/// Owns one instruction port, one data port per lane and a control
/// port. Everything the memory system sends back (responses, retries,
/// completed translations) is handed to the matching `recv_*` or
/// `finish_*` method by the owner of the core.
pub struct Core<S, T, P>
where
    S: ShaderModel,
{
    core_id: usize,
    config: Arc<config::Core>,
    shader: Option<Arc<Mutex<S>>>,
    fetch: FetchUnit<S::FetchContext, T, P>,
    lsq: LoadStoreQueue<P>,
    writeback: WritebackArbiter,
    flush: FlushCoordinator<P>,
    ledger: Ledger,
}

impl<S, T, P> std::fmt::Debug for Core<S, T, P>
where
    S: ShaderModel,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Core")
            .field("core_id", &self.core_id)
            .field("initialized", &self.shader.is_some())
            .field("fetch", &self.fetch)
            .field("writeback", &self.writeback)
            .field("flush", &self.flush)
            .finish_non_exhaustive()
    }
}

impl<S, T, P> Core<S, T, P>
where
    S: ShaderModel,
    T: Translator,
    P: Port,
{
    pub fn new(
        core_id: usize,
        config: Arc<config::Core>,
        translator: T,
        inst_port: P,
        lane_ports: Vec<P>,
        control_port: P,
    ) -> Self {
        Self {
            core_id,
            fetch: FetchUnit::new(core_id, Arc::clone(&config), translator, inst_port),
            lsq: LoadStoreQueue::new(core_id, Arc::clone(&config), lane_ports),
            writeback: WritebackArbiter::new(core_id),
            flush: FlushCoordinator::new(core_id, control_port),
            ledger: Ledger::new(core_id, Arc::clone(&config)),
            shader: None,
            config,
        }
    }

    /// Binds the core to its shader model.
    pub fn initialize<G>(&mut self, gpu: &G)
    where
        G: Gpu<Shader = S>,
    {
        log::debug!("core {}: bound to shader", self.core_id);
        self.shader = Some(gpu.get_shader(self.core_id));
    }

    fn shader(&self) -> Result<&Arc<Mutex<S>>, Error> {
        self.shader.as_ref().ok_or(Error::NotInitialized {
            core_id: self.core_id,
        })
    }

    #[must_use]
    pub fn id(&self) -> usize {
        self.core_id
    }

    #[must_use]
    pub fn config(&self) -> &config::Core {
        &self.config
    }

    #[must_use]
    pub fn can_fetch(&self, addr: address) -> bool {
        self.fetch.can_fetch(addr)
    }

    pub fn fetch(&mut self, addr: address, context: S::FetchContext) -> Result<(), Error> {
        self.fetch.fetch(addr, context)
    }

    pub fn finish_translation(&mut self, state: TranslationState) -> Result<(), Error> {
        self.fetch.finish_translation(state)
    }

    pub fn recv_inst_retry(&mut self) -> Result<(), Error> {
        self.fetch.recv_retry()
    }

    /// Completes an instruction fetch and hands it to the shader model.
    pub fn recv_inst_resp(&mut self, packet: Packet) -> Result<(), Error> {
        let shader = Arc::clone(self.shader()?);
        let context = self.fetch.recv_resp(packet)?;
        shader.lock().accept_fetch_response(context);
        Ok(())
    }

    /// Issues a global or constant memory instruction.
    ///
    /// Returns `true` if the instruction stalled and must be issued again.
    pub fn execute_mem_op(&mut self, instr: &Arc<WarpInstruction>) -> Result<bool, Error> {
        self.lsq.execute_mem_op(instr)
    }

    /// Delivers a load response of `lane`.
    pub fn recv_lsq_data_resp(&mut self, lane: usize, packet: Packet) -> Result<Delivery, Error> {
        let warp_size = self.lsq.num_lanes();
        if lane >= warp_size {
            return Err(Error::InvalidLane { lane, warp_size });
        }
        let shader = self.shader.as_ref().ok_or(Error::NotInitialized {
            core_id: self.core_id,
        })?;
        let mut shader = shader.lock();
        self.writeback
            .commit(&mut *shader, self.config.warp_size, lane, packet)
    }

    /// Lane ports never hold refused requests, so a retry is a protocol error.
    pub fn recv_lsq_retry(&mut self, lane: usize) -> Result<(), Error> {
        Err(Error::UnexpectedPortRetry {
            port: format!("lsq lane {lane}"),
        })
    }

    pub fn recv_lsq_control_resp(&mut self, packet: &Packet) -> Result<(), Error> {
        let shader = Arc::clone(self.shader()?);
        if self.flush.recv_resp(packet)? {
            shader.lock().finish_kernel();
        }
        Ok(())
    }

    pub fn recv_control_retry(&mut self) -> Result<(), Error> {
        Err(Error::UnexpectedPortRetry {
            port: "lsq control".to_string(),
        })
    }

    /// Called by the shader model once its writeback stage is free again.
    pub fn writeback_clear(&mut self) -> Result<(), Error> {
        if let Some(lane) = self.writeback.clear() {
            self.lsq.port_mut(lane)?.send_retry_resp();
        }
        Ok(())
    }

    #[must_use]
    pub fn writeback_blocked(&self) -> Option<usize> {
        self.writeback.blocked()
    }

    /// Flushes the memory system for a finished kernel.
    pub fn finish_kernel(&mut self) -> Result<(), Error> {
        self.flush.finish_kernel()?;
        self.ledger.kernel_completed();
        Ok(())
    }

    #[must_use]
    pub fn is_fetch_stalled(&self) -> bool {
        self.fetch.is_stalled()
    }

    #[must_use]
    pub fn num_pending_fetches(&self) -> usize {
        self.fetch.num_pending()
    }

    #[must_use]
    pub fn num_retry_pending(&self) -> usize {
        self.fetch.num_retry_pending()
    }

    #[must_use]
    pub fn is_flush_pending(&self) -> bool {
        self.flush.is_pending()
    }

    pub fn record_load(&mut self, space: MemorySpace) -> Result<(), Error> {
        self.ledger.record_load(space)
    }

    pub fn record_store(&mut self, space: MemorySpace) -> Result<(), Error> {
        self.ledger.record_store(space)
    }

    pub fn record_instruction(&mut self, kind: stats::InstructionKind, cycle: u64) {
        self.ledger.record_instruction(kind, cycle);
    }

    pub fn record_block_issue(&mut self, slot: usize, cycle: u64) -> Result<(), Error> {
        self.ledger.record_block_issue(slot, cycle)
    }

    pub fn record_block_commit(&mut self, slot: usize, cycle: u64) -> Result<(), Error> {
        self.ledger.record_block_commit(slot, cycle)
    }

    #[must_use]
    pub fn instructions_per_cycle(&self) -> f64 {
        self.ledger.instructions_per_cycle()
    }

    #[must_use]
    pub fn occupancy(&self) -> &stats::Occupancy {
        self.ledger.occupancy()
    }

    pub fn write_block_stats<W: std::io::Write>(&self, writer: W, cycle: u64) -> csv::Result<()> {
        self.ledger.write_block_stats(writer, cycle)
    }

    #[must_use]
    pub fn stats(&self) -> stats::Stats {
        stats::Stats {
            fetch: self.fetch.stats(),
            ..self.ledger.stats()
        }
    }
}
