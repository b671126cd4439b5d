//! Interface to the functional / performance model that drives the core.
use crate::instruction::WarpInstruction;
use parking_lot::Mutex;
use std::sync::Arc;

/// The shader model of one core.
pub trait ShaderModel {
    /// Opaque handle of an instruction fetch, handed back on completion.
    type FetchContext;

    /// Delivers a completed instruction fetch.
    fn accept_fetch_response(&mut self, fetch: Self::FetchContext);

    /// Probes the writeback stage of the load store unit for `instr`.
    ///
    /// Returns `false` while the writeback register is occupied.
    fn ldst_unit_wb_inst(&mut self, instr: &WarpInstruction) -> bool;

    /// Writes the loaded `data` of `lane` into the destination register of `instr`.
    fn write_register(
        &mut self,
        instr: &WarpInstruction,
        warp_size: usize,
        lane: usize,
        data: &[u8],
    );

    /// Notifies that all memory effects of the current kernel are visible.
    fn finish_kernel(&mut self);
}

/// The GPU model that owns the shader models of all cores.
pub trait Gpu {
    type Shader: ShaderModel;

    fn get_shader(&self, core_id: usize) -> Arc<Mutex<Self::Shader>>;
}
