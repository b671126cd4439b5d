//! Load writeback arbitration.
use crate::{
    config::MAX_ACCESS_BUFFER_SIZE, error::Error, packet::Packet, port::Delivery,
    shader::ShaderModel,
};
use console::style;

/// Commits load responses to the shader model's writeback stage.
///
/// While the writeback stage is busy a single lane can be blocked. The
/// blocked lane is told to resend once the stage clears.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WritebackArbiter {
    core_id: usize,
    blocked: Option<usize>,
}

impl WritebackArbiter {
    #[must_use]
    pub fn new(core_id: usize) -> Self {
        Self {
            core_id,
            blocked: None,
        }
    }

    /// Lane waiting for the writeback stage, if any.
    #[must_use]
    pub fn blocked(&self) -> Option<usize> {
        self.blocked
    }

    /// Writes back the data of a load response on `lane`.
    pub fn commit<S>(
        &mut self,
        shader: &mut S,
        warp_size: usize,
        lane: usize,
        packet: Packet,
    ) -> Result<Delivery, Error>
    where
        S: ShaderModel + ?Sized,
    {
        if !packet.cmd.is_read() || !packet.cmd.is_response() {
            return Err(Error::UnexpectedResponse {
                cmd: packet.cmd,
                lane,
            });
        }
        let Some(state) = packet.sender_state.as_ref() else {
            return Err(Error::MissingSenderState {
                lane,
                vaddr: packet.vaddr(),
            });
        };
        let instr = &state.instr;
        if !instr.is_load() || !instr.memory_space.is_lsq_routed() || !instr.active(lane) {
            return Err(Error::MalformedSenderState {
                lane,
                uid: instr.uid,
            });
        }

        if !shader.ldst_unit_wb_inst(&state.instr) {
            if let Some(blocked) = self.blocked {
                return Err(Error::WritebackAlreadyBlocked { lane, blocked });
            }
            log::debug!(
                "{}: writeback busy, blocking lane {} ({})",
                style(format!("core {} writeback", self.core_id)).yellow(),
                lane,
                packet,
            );
            self.blocked = Some(lane);
            return Ok(Delivery::Refused(packet));
        }

        let mut data = [0u8; MAX_ACCESS_BUFFER_SIZE as usize];
        let size = packet.write_data(&mut data);
        shader.write_register(&state.instr, warp_size, lane, &data[..size]);
        log::debug!(
            "{}: lane {} wrote {} bytes for {}",
            style(format!("core {} writeback", self.core_id)).cyan(),
            lane,
            size,
            state.instr,
        );
        Ok(Delivery::Accepted)
    }

    /// Releases the blocked lane, returning it so it can be told to retry.
    pub fn clear(&mut self) -> Option<usize> {
        let lane = self.blocked.take();
        if let Some(lane) = lane {
            log::debug!(
                "{}: writeback cleared, retrying lane {}",
                style(format!("core {} writeback", self.core_id)).cyan(),
                lane,
            );
        }
        lane
    }
}

#[cfg(test)]
mod tests {
    use super::WritebackArbiter;
    use crate::{
        error::Error,
        instruction::{MemOp, MemorySpace, WarpInstruction},
        packet::{Command, Master, Packet, Request},
        port::Delivery,
        testing::{self, MockShader},
    };
    use std::sync::Arc;

    fn response_for(instr: WarpInstruction, data: &[u8]) -> Packet {
        let size = instr.access_size();
        let mut packet = Packet::new(Request::new(0x100, size, Master::Data, 0x80), Command::ReadReq)
            .with_sender_state(Arc::new(instr));
        packet.allocate();
        packet.set_data(data);
        packet.make_response();
        packet
    }

    fn load_response(lane: usize, data: &[u8]) -> Packet {
        response_for(
            WarpInstruction::new(3, 0, 0x80, MemorySpace::Global, MemOp::Load, 4)
                .with_lane(lane, 0x100),
            data,
        )
    }

    #[test]
    fn free_writeback_commits_data() -> Result<(), Error> {
        testing::init_logging();
        let mut shader = MockShader::default();
        let mut wb = WritebackArbiter::new(0);
        let delivery = wb.commit(&mut shader, 32, 5, load_response(5, &[9, 8, 7, 6]))?;
        assert_eq!(delivery, Delivery::Accepted);
        assert_eq!(shader.writes, vec![(3, 5, vec![9, 8, 7, 6])]);
        assert_eq!(wb.blocked(), None);
        Ok(())
    }

    #[test]
    fn busy_writeback_blocks_a_single_lane() -> Result<(), Error> {
        testing::init_logging();
        let mut shader = MockShader::default();
        shader.wb_busy = true;
        let mut wb = WritebackArbiter::new(0);

        let delivery = wb.commit(&mut shader, 32, 1, load_response(1, &[1]))?;
        assert!(matches!(delivery, Delivery::Refused(_)));
        assert_eq!(wb.blocked(), Some(1));
        assert!(shader.writes.is_empty());

        assert_eq!(
            wb.commit(&mut shader, 32, 2, load_response(2, &[2])),
            Err(Error::WritebackAlreadyBlocked {
                lane: 2,
                blocked: 1
            })
        );

        assert_eq!(wb.clear(), Some(1));
        assert_eq!(wb.clear(), None);
        Ok(())
    }

    #[test]
    fn only_load_responses_are_written_back() {
        let mut shader = MockShader::default();
        let mut wb = WritebackArbiter::new(0);

        let mut write = Packet::new(Request::new(0x40, 4, Master::Data, 0), Command::WriteReq);
        write.make_response();
        assert_eq!(
            wb.commit(&mut shader, 32, 0, write),
            Err(Error::UnexpectedResponse {
                cmd: Command::WriteResp,
                lane: 0
            })
        );

        let mut orphan = Packet::new(Request::new(0x40, 4, Master::Data, 0), Command::ReadReq);
        orphan.make_response();
        assert_eq!(
            wb.commit(&mut shader, 32, 0, orphan),
            Err(Error::MissingSenderState {
                lane: 0,
                vaddr: 0x40
            })
        );
        assert_eq!(shader.wb_probes, 0);
    }

    #[test]
    fn full_lane_buffer_is_written_back() -> Result<(), Error> {
        let mut shader = MockShader::default();
        let mut wb = WritebackArbiter::new(0);
        let data: Vec<u8> = (0..16).collect();
        let instr = WarpInstruction::new(4, 0, 0x80, MemorySpace::Constant, MemOp::Load, 4)
            .with_vector_length(4)
            .with_lane(0, 0x100);
        assert_eq!(instr.access_size(), 16);

        let delivery = wb.commit(&mut shader, 32, 0, response_for(instr, &data))?;
        assert!(delivery.is_accepted());
        assert_eq!(shader.writes, vec![(4, 0, data)]);
        Ok(())
    }

    #[test]
    fn store_instruction_is_not_written_back() {
        let mut shader = MockShader::default();
        let mut wb = WritebackArbiter::new(0);
        let store = WarpInstruction::new(9, 0, 0x80, MemorySpace::Global, MemOp::Store, 4)
            .with_lane(7, 0x100);
        assert_eq!(
            wb.commit(&mut shader, 32, 7, response_for(store, &[1, 2, 3, 4])),
            Err(Error::MalformedSenderState { lane: 7, uid: 9 })
        );
        assert!(shader.writes.is_empty());
        assert_eq!(shader.wb_probes, 0);
    }

    #[test]
    fn load_outside_lsq_spaces_is_not_written_back() {
        let mut shader = MockShader::default();
        let mut wb = WritebackArbiter::new(0);
        let shared = WarpInstruction::new(10, 0, 0x80, MemorySpace::Shared, MemOp::Load, 4)
            .with_lane(2, 0x100);
        assert_eq!(
            wb.commit(&mut shader, 32, 2, response_for(shared, &[1, 2, 3, 4])),
            Err(Error::MalformedSenderState { lane: 2, uid: 10 })
        );
        assert!(shader.writes.is_empty());
    }

    #[test]
    fn response_on_inactive_lane_is_not_written_back() {
        let mut shader = MockShader::default();
        shader.wb_busy = true;
        let mut wb = WritebackArbiter::new(0);
        let load = WarpInstruction::new(11, 0, 0x80, MemorySpace::Global, MemOp::Load, 4)
            .with_lane(1, 0x100);
        assert_eq!(
            wb.commit(&mut shader, 32, 7, response_for(load, &[1, 2, 3, 4])),
            Err(Error::MalformedSenderState { lane: 7, uid: 11 })
        );
        // rejected before the writeback stage is probed, nothing gets blocked
        assert_eq!(wb.blocked(), None);
        assert!(shader.writes.is_empty());
    }
}
