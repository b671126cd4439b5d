//! Per lane data access issue.
use crate::{
    config,
    error::Error,
    instruction::{MemOp, WarpInstruction},
    packet::{Command, Master, Packet, Request},
    port::Port,
};
use console::style;
use std::sync::Arc;

/// Issues the accesses of memory instructions on one port per lane.
///
/// Lanes never buffer refused requests: the first refusal drops the
/// request and stalls the whole instruction, which is replayed later.
pub struct LoadStoreQueue<P> {
    core_id: usize,
    config: Arc<config::Core>,
    ports: Vec<P>,
}

impl<P> std::fmt::Debug for LoadStoreQueue<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadStoreQueue")
            .field("core_id", &self.core_id)
            .field("lanes", &self.ports.len())
            .finish_non_exhaustive()
    }
}

impl<P> LoadStoreQueue<P>
where
    P: Port,
{
    pub fn new(core_id: usize, config: Arc<config::Core>, ports: Vec<P>) -> Self {
        debug_assert_eq!(ports.len(), config.warp_size);
        Self {
            core_id,
            config,
            ports,
        }
    }

    #[must_use]
    pub fn num_lanes(&self) -> usize {
        self.ports.len()
    }

    pub fn port_mut(&mut self, lane: usize) -> Result<&mut P, Error> {
        let warp_size = self.ports.len();
        self.ports
            .get_mut(lane)
            .ok_or(Error::InvalidLane { lane, warp_size })
    }

    fn check(&self, instr: &WarpInstruction) -> Result<(), Error> {
        if !instr.memory_space.is_lsq_routed() {
            return Err(Error::UnsupportedSpace {
                space: instr.memory_space,
                uid: instr.uid,
            });
        }
        if instr.mem_op == MemOp::Other {
            return Err(Error::UnsupportedOperation {
                op: instr.mem_op,
                uid: instr.uid,
            });
        }
        let valid_data_size = (1..=self.config.max_data_size).contains(&instr.data_size);
        if !valid_data_size || instr.access_size() > self.config.max_access_size {
            return Err(Error::InvalidAccessSize {
                data_size: instr.data_size,
                vector_length: instr.vector_length,
                uid: instr.uid,
            });
        }
        if let Some(lane) = instr.active_lanes().find(|&lane| lane >= self.ports.len()) {
            return Err(Error::InvalidLane {
                lane,
                warp_size: self.ports.len(),
            });
        }
        Ok(())
    }

    fn build_packet(&self, instr: &Arc<WarpInstruction>, lane: usize) -> Packet {
        let req = Request::new(
            instr.addr(lane),
            instr.access_size(),
            Master::Data,
            instr.pc,
        )
        .with_context(self.core_id, instr.warp_id);

        if instr.is_load() {
            let mut packet = Packet::new(req, Command::ReadReq);
            packet.allocate();
            packet.with_sender_state(Arc::clone(instr))
        } else {
            let mut packet = Packet::new(req, Command::WriteReq);
            packet.allocate();
            packet.set_data(instr.data(lane));
            packet
        }
    }

    /// Sends one request per active lane, in ascending lane order.
    ///
    /// Returns `true` if the instruction stalled on its first lane and
    /// must be issued again later. Nothing was sent in that case.
    pub fn execute_mem_op(&mut self, instr: &Arc<WarpInstruction>) -> Result<bool, Error> {
        self.check(instr)?;

        let mut issued = 0;
        for lane in instr.active_lanes() {
            let packet = self.build_packet(instr, lane);
            log::trace!(
                "core {} lane {}: {} of {} bytes",
                self.core_id,
                lane,
                packet,
                packet.size()
            );

            if let Err(packet) = self.ports[lane].send_timing_req(packet) {
                if issued > 0 {
                    return Err(Error::PartialIssue {
                        lane,
                        uid: instr.uid,
                    });
                }
                log::debug!(
                    "{}: {} stalled on lane {} ({})",
                    style(format!("core {} lsq", self.core_id)).yellow(),
                    instr,
                    lane,
                    packet,
                );
                return Ok(true);
            }
            issued += 1;
        }

        log::debug!(
            "{}: issued {} on {} lanes",
            style(format!("core {} lsq", self.core_id)).cyan(),
            instr,
            issued,
        );
        Ok(false)
    }
}
