//! Timing port contract between the core and the memory system.
use crate::packet::Packet;

/// A master port of the core.
///
/// Responses and retry signals travel the other way: the owner of the
/// core calls the matching `recv_*` method of the core.
pub trait Port {
    /// Attempts to send a timing request.
    ///
    /// A busy port hands the packet back.
    /// A refused sender must wait for a retry signal before sending again.
    fn send_timing_req(&mut self, packet: Packet) -> Result<(), Packet>;

    /// Signals the peer that a previously refused response can be resent.
    fn send_retry_resp(&mut self);
}

impl<P> Port for Box<P>
where
    P: Port + ?Sized,
{
    fn send_timing_req(&mut self, packet: Packet) -> Result<(), Packet> {
        (**self).send_timing_req(packet)
    }

    fn send_retry_resp(&mut self) {
        (**self).send_retry_resp();
    }
}

/// Outcome of delivering a response to the core.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Accepted,
    /// The core can not take the response now.
    ///
    /// The sender keeps the packet until the core sends a retry on the port.
    Refused(Packet),
}

impl Delivery {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Delivery::Accepted)
    }
}
