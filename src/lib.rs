#![allow(
    non_camel_case_types,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]

//! Memory timing model of a GPU shader core.
//!
//! The core schedules instruction fetches, per lane data accesses, load
//! writeback and the kernel completion flush. Program execution itself
//! is left to a [`shader::ShaderModel`].

pub mod config;
pub mod core;
pub mod error;
pub mod fetch;
pub mod fifo;
pub mod flush;
pub mod instruction;
pub mod ledger;
pub mod lsq;
pub mod packet;
pub mod port;
pub mod shader;
pub mod translation;
pub mod writeback;

#[cfg(test)]
pub mod testing;

pub use self::core::Core;
pub use error::Error;
pub use instruction::{MemOp, MemorySpace, WarpInstruction};
pub use packet::{Command, Packet, Request};
pub use port::{Delivery, Port};
pub use shader::{Gpu, ShaderModel};
pub use translation::{TranslationState, Translator};

pub type address = u64;
