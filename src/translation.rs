//! Address translation bridge for instruction fetches.
use crate::{address, error::Error, packet::Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Read,
    Write,
    Execute,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fault {
    PageFault,
    ProtectionFault,
    AlignmentFault,
    Generic(String),
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Fault::PageFault => write!(f, "page fault"),
            Fault::ProtectionFault => write!(f, "protection fault"),
            Fault::AlignmentFault => write!(f, "alignment fault"),
            Fault::Generic(name) => write!(f, "{name}"),
        }
    }
}

/// The one in-flight translation of a fetched line.
///
/// Moved to the translator when the translation starts and handed back
/// to the core once it completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationState {
    pub req: Request,
    pub mode: Mode,
    pub fault: Option<Fault>,
}

impl TranslationState {
    #[must_use]
    pub fn new(req: Request, mode: Mode) -> Self {
        Self {
            req,
            mode,
            fault: None,
        }
    }

    #[must_use]
    #[inline]
    pub fn vaddr(&self) -> address {
        self.req.vaddr
    }

    /// Completes the translation with physical address `paddr`.
    pub fn complete(&mut self, paddr: address) {
        self.req.paddr = Some(paddr);
        self.fault = None;
    }

    pub fn fail(&mut self, fault: Fault) {
        self.fault = Some(fault);
    }

    /// Resolved request of a completed instruction read translation.
    pub fn finish(self) -> Result<Request, Error> {
        if let Some(fault) = self.fault {
            return Err(Error::TranslationFault {
                fault,
                vaddr: self.req.vaddr,
            });
        }
        if self.mode != Mode::Read {
            return Err(Error::UnexpectedTranslationMode {
                mode: self.mode,
                vaddr: self.req.vaddr,
            });
        }
        Ok(self.req)
    }
}

/// Address translation service (e.g. an instruction TLB).
pub trait Translator {
    /// Starts translating `state.req`.
    ///
    /// Completion is asynchronous: the owner of the core later passes the
    /// completed state to `Core::finish_translation`.
    fn begin_translate_timing(&mut self, state: TranslationState);
}

impl<T> Translator for Box<T>
where
    T: Translator + ?Sized,
{
    fn begin_translate_timing(&mut self, state: TranslationState) {
        (**self).begin_translate_timing(state);
    }
}
