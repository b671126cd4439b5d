use crate::{
    instruction::WarpInstruction,
    shader::{Gpu, ShaderModel},
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct MockShader {
    /// Contexts of completed fetches, in completion order.
    pub fetched: Vec<u64>,
    /// Scripted writeback probe results, consumed one per probe.
    pub wb_script: VecDeque<bool>,
    /// Writeback stage busy for every unscripted probe.
    pub wb_busy: bool,
    pub wb_probes: usize,
    /// `(instruction uid, lane, data)` of every register write.
    pub writes: Vec<(u64, usize, Vec<u8>)>,
    pub kernels_finished: usize,
}

impl ShaderModel for MockShader {
    type FetchContext = u64;

    fn accept_fetch_response(&mut self, fetch: Self::FetchContext) {
        self.fetched.push(fetch);
    }

    fn ldst_unit_wb_inst(&mut self, _instr: &WarpInstruction) -> bool {
        self.wb_probes += 1;
        match self.wb_script.pop_front() {
            Some(free) => free,
            None => !self.wb_busy,
        }
    }

    fn write_register(
        &mut self,
        instr: &WarpInstruction,
        _warp_size: usize,
        lane: usize,
        data: &[u8],
    ) {
        self.writes.push((instr.uid, lane, data.to_vec()));
    }

    fn finish_kernel(&mut self) {
        self.kernels_finished += 1;
    }
}

#[derive(Debug, Default)]
pub struct MockGpu {
    pub shaders: Vec<Arc<Mutex<MockShader>>>,
}

impl MockGpu {
    #[must_use]
    pub fn new(num_cores: usize) -> Self {
        Self {
            shaders: (0..num_cores)
                .map(|_| Arc::new(Mutex::new(MockShader::default())))
                .collect(),
        }
    }
}

impl Gpu for MockGpu {
    type Shader = MockShader;

    fn get_shader(&self, core_id: usize) -> Arc<Mutex<Self::Shader>> {
        Arc::clone(&self.shaders[core_id])
    }
}
