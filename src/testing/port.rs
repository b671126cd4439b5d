use crate::{packet::Packet, port::Port};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct PortState {
    /// Scripted accept decisions, consumed one per send.
    pub script: VecDeque<bool>,
    /// Refuse every unscripted send.
    pub busy: bool,
    pub sent: Vec<Packet>,
    pub refused: usize,
    pub retries_sent: usize,
}

/// Port that records accepted packets.
#[derive(Debug, Clone, Default)]
pub struct MockPort(pub Arc<Mutex<PortState>>);

impl MockPort {
    pub fn set_busy(&self, busy: bool) {
        self.0.lock().busy = busy;
    }

    /// Queues accept decisions for the next sends.
    pub fn script(&self, decisions: impl IntoIterator<Item = bool>) {
        self.0.lock().script.extend(decisions);
    }

    #[must_use]
    pub fn sent(&self) -> Vec<Packet> {
        self.0.lock().sent.clone()
    }

    #[must_use]
    pub fn take_sent(&self) -> Vec<Packet> {
        std::mem::take(&mut self.0.lock().sent)
    }

    #[must_use]
    pub fn refused(&self) -> usize {
        self.0.lock().refused
    }

    #[must_use]
    pub fn retries_sent(&self) -> usize {
        self.0.lock().retries_sent
    }
}

impl Port for MockPort {
    fn send_timing_req(&mut self, packet: Packet) -> Result<(), Packet> {
        let mut state = self.0.lock();
        let accept = match state.script.pop_front() {
            Some(accept) => accept,
            None => !state.busy,
        };
        if accept {
            state.sent.push(packet);
            Ok(())
        } else {
            state.refused += 1;
            Err(packet)
        }
    }

    fn send_retry_resp(&mut self) {
        self.0.lock().retries_sent += 1;
    }
}
