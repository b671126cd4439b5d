//! Kernel completion handshake on the control port.
use crate::{
    error::Error,
    packet::{Command, Master, Packet, Request},
    port::Port,
};
use console::style;

/// Flushes the memory system at the end of a kernel.
///
/// The shader model is told the kernel finished only once the flush
/// response arrives.
pub struct FlushCoordinator<P> {
    core_id: usize,
    port: P,
    /// Uid of the outstanding flush request.
    pending: Option<u64>,
}

impl<P> std::fmt::Debug for FlushCoordinator<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlushCoordinator")
            .field("core_id", &self.core_id)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl<P> FlushCoordinator<P>
where
    P: Port,
{
    pub fn new(core_id: usize, port: P) -> Self {
        Self {
            core_id,
            port,
            pending: None,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Sends a flush request for the finished kernel.
    pub fn finish_kernel(&mut self) -> Result<(), Error> {
        if let Some(uid) = self.pending {
            return Err(Error::FlushPending { uid });
        }
        let packet = Packet::new(Request::new(0, 0, Master::Data, 0), Command::FlushReq);
        let uid = packet.uid;
        log::debug!(
            "{}: kernel finished, sending flush {}",
            style(format!("core {} flush", self.core_id)).magenta(),
            uid,
        );
        self.port
            .send_timing_req(packet)
            .map_err(|_| Error::FlushRejected)?;
        self.pending = Some(uid);
        Ok(())
    }

    /// Handles a response on the control port.
    ///
    /// Returns `true` if the shader model must be notified that its
    /// kernel finished.
    pub fn recv_resp(&mut self, packet: &Packet) -> Result<bool, Error> {
        if !packet.is_flush() {
            return Err(Error::UnexpectedControlPacket { cmd: packet.cmd });
        }
        match self.pending.take() {
            Some(uid) => {
                log::debug!(
                    "{}: flush {} complete",
                    style(format!("core {} flush", self.core_id)).magenta(),
                    uid,
                );
                Ok(true)
            }
            None => {
                log::warn!(
                    "core {}: flush response {} without a finished kernel",
                    self.core_id,
                    packet.uid
                );
                Ok(false)
            }
        }
    }
}
