//! DMA engine (SDMA) command-stream decoding.
//!
//! SDMA packets carry their opcode in the low byte of the header and a
//! sub-opcode in the next byte; unlike PM4, the payload length is not in the
//! header but fixed per (opcode, sub-opcode) — with two exceptions (`NOP`
//! padding and linear `WRITE`, whose trailing data count lives in the
//! packet body). `INDIRECT` packets reference further buffers and can be
//! followed recursively.

#![forbid(unsafe_code)]

mod build;
mod decode;
pub mod header;
mod opcode;
mod tables;

pub use crate::build::build_stream;
pub use crate::decode::{decode_stream, ib_target, IbTarget};
pub use crate::opcode::SdmaOpcode;
