//! Test doubles for the collaborators of a core.
//!
//! Every mock is a cheap handle around shared state, so a test keeps a
//! clone to script and inspect a port while the core owns another.
pub mod port;
pub mod shader;
pub mod translation;

pub use port::MockPort;
pub use shader::{MockGpu, MockShader};
pub use translation::MockTranslator;

use crate::{config, core::Core};
use parking_lot::Mutex;
use std::sync::Arc;

static LOGGER: std::sync::Once = std::sync::Once::new();

pub fn init_logging() {
    LOGGER.call_once(|| {
        env_logger::builder().is_test(true).init();
    });
}

pub type MockCore = Core<MockShader, MockTranslator, MockPort>;

/// A core wired to mocks, with handles to all of them.
pub struct Harness {
    pub core: MockCore,
    pub gpu: MockGpu,
    pub translator: MockTranslator,
    pub inst_port: MockPort,
    pub lane_ports: Vec<MockPort>,
    pub control_port: MockPort,
}

impl Harness {
    /// Core that is not bound to its shader yet.
    #[must_use]
    pub fn uninitialized(config: config::Core) -> Self {
        init_logging();
        let core_id = 0;
        let gpu = MockGpu::new(1);
        let translator = MockTranslator::default();
        let inst_port = MockPort::default();
        let lane_ports: Vec<_> = (0..config.warp_size).map(|_| MockPort::default()).collect();
        let control_port = MockPort::default();
        let core = Core::new(
            core_id,
            Arc::new(config),
            translator.clone(),
            inst_port.clone(),
            lane_ports.clone(),
            control_port.clone(),
        );
        Self {
            core,
            gpu,
            translator,
            inst_port,
            lane_ports,
            control_port,
        }
    }

    #[must_use]
    pub fn new(config: config::Core) -> Self {
        let mut harness = Self::uninitialized(config);
        harness.core.initialize(&harness.gpu);
        harness
    }

    #[must_use]
    pub fn with_warp_size(warp_size: usize) -> Self {
        Self::new(config::Core {
            warp_size,
            ..config::Core::default()
        })
    }

    #[must_use]
    pub fn shader(&self) -> Arc<Mutex<MockShader>> {
        use crate::shader::Gpu;
        self.gpu.get_shader(0)
    }
}
