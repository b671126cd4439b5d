//! Instruction fetch engine.
use crate::{
    address, config,
    error::Error,
    fifo::Fifo,
    packet::{Command, Packet, Request},
    port::Port,
    translation::{Mode, TranslationState, Translator},
};
use console::style;
use std::collections::HashMap;
use std::sync::Arc;

/// Fetches whole instruction cache lines through a single port.
///
/// At most one fetch per line is in flight. Fetches refused by the port
/// wait in a FIFO retry queue and are resent only after the port signals
/// a retry.
pub struct FetchUnit<C, T, P> {
    core_id: usize,
    config: Arc<config::Core>,
    translator: T,
    port: P,
    /// Fetch context per line with an outstanding fetch.
    busy_lines: HashMap<address, C>,
    retry_packets: Fifo<Packet>,
    stats: stats::Fetch,
}

#[allow(clippy::missing_fields_in_debug)]
impl<C, T, P> std::fmt::Debug for FetchUnit<C, T, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchUnit")
            .field("core_id", &self.core_id)
            .field("busy_lines", &self.busy_lines.len())
            .field("retry_packets", &self.retry_packets.len())
            .finish()
    }
}

impl<C, T, P> FetchUnit<C, T, P>
where
    T: Translator,
    P: Port,
{
    pub fn new(core_id: usize, config: Arc<config::Core>, translator: T, port: P) -> Self {
        Self {
            core_id,
            config,
            translator,
            port,
            busy_lines: HashMap::new(),
            retry_packets: Fifo::new(),
            stats: stats::Fetch::default(),
        }
    }

    /// Whether the line of `addr` has no outstanding fetch.
    #[must_use]
    pub fn can_fetch(&self, addr: address) -> bool {
        !self.busy_lines.contains_key(&self.config.line_addr(addr))
    }

    /// Starts fetching the line containing `addr`.
    ///
    /// The line is claimed right away; the request is sent once its
    /// translation completes.
    pub fn fetch(&mut self, addr: address, context: C) -> Result<(), Error> {
        let line = self.config.line_addr(addr);
        if self.busy_lines.contains_key(&line) {
            return Err(Error::DuplicateFetch { addr, line });
        }
        let size = self.config.line_size();
        log::debug!(
            "{}: fetch request addr={:#x} size={} line={:#x}",
            style(format!("core {} fetch", self.core_id)).green(),
            addr,
            size,
            line,
        );

        let req = Request::inst_fetch(line, size, addr);
        self.busy_lines.insert(line, context);
        self.translator
            .begin_translate_timing(TranslationState::new(req, Mode::Read));
        Ok(())
    }

    /// Continues a fetch once its translation completed.
    pub fn finish_translation(&mut self, state: TranslationState) -> Result<(), Error> {
        let req = state.finish()?;
        let mut packet = Packet::new(req, Command::ReadReq);
        packet.allocate();
        debug_assert!(packet.is_inst_fetch());
        self.send_inst_access(packet);
        Ok(())
    }

    fn send_inst_access(&mut self, packet: Packet) {
        self.stats.requests += 1;
        log::debug!(
            "{}: sending inst read of {} bytes to vaddr={:#x}",
            style(format!("core {} fetch", self.core_id)).green(),
            packet.size(),
            packet.vaddr(),
        );

        if let Some(head) = self.retry_packets.first() {
            // wait for the port to ask for the packets ahead of us
            log::trace!("core {} fetch: {} stalled behind {}", self.core_id, packet, head);
            self.retry_packets.enqueue(packet);
            return;
        }
        if let Err(packet) = self.port.send_timing_req(packet) {
            log::debug!(
                "{}: send failed vaddr={:#x} waiting={}",
                style(format!("core {} fetch", self.core_id)).yellow(),
                packet.vaddr(),
                self.retry_packets.len() + 1,
            );
            self.retry_packets.enqueue(packet);
        }
    }

    /// Handles a retry signal of the instruction port.
    ///
    /// Resends the head of the retry queue and keeps draining in order
    /// until the queue is empty or the port refuses again.
    pub fn recv_retry(&mut self) -> Result<(), Error> {
        self.stats.retries += 1;
        let Some(head) = self.retry_packets.dequeue() else {
            return Err(Error::UnexpectedRetry);
        };
        log::debug!(
            "{}: received retry, vaddr={:#x}",
            style(format!("core {} fetch", self.core_id)).green(),
            head.vaddr(),
        );
        if let Err(head) = self.port.send_timing_req(head) {
            let vaddr = head.vaddr();
            self.retry_packets.requeue(head);
            return Err(Error::RetryRejected { vaddr });
        }

        while let Some(next) = self.retry_packets.dequeue() {
            if let Err(next) = self.port.send_timing_req(next) {
                self.retry_packets.requeue(next);
                log::trace!(
                    "core {} fetch: port busy again, waiting {}",
                    self.core_id,
                    self.retry_packets
                );
                break;
            }
        }
        Ok(())
    }

    /// Completes the fetch of the responding line, returning its context.
    pub fn recv_resp(&mut self, packet: Packet) -> Result<C, Error> {
        if !packet.is_inst_fetch() {
            return Err(Error::NotInstFetch {
                vaddr: packet.vaddr(),
            });
        }
        let line = self.config.line_addr(packet.vaddr());
        let context = self
            .busy_lines
            .remove(&line)
            .ok_or(Error::UnknownFetchResponse { line })?;
        log::debug!(
            "{}: finished fetch on vaddr={:#x}",
            style(format!("core {} fetch", self.core_id)).green(),
            packet.vaddr(),
        );
        Ok(context)
    }

    /// Whether sends wait for a retry signal of the port.
    #[must_use]
    pub fn is_stalled(&self) -> bool {
        !self.retry_packets.is_empty()
    }

    #[must_use]
    pub fn num_pending(&self) -> usize {
        self.busy_lines.len()
    }

    #[must_use]
    pub fn num_retry_pending(&self) -> usize {
        self.retry_packets.len()
    }

    #[must_use]
    pub fn stats(&self) -> stats::Fetch {
        self.stats
    }
}
