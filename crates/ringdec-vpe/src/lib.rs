//! Post-processing engine (VPE) command-stream decoding.
//!
//! VPE reuses the DMA-engine header shape (opcode low byte, sub-opcode next
//! byte, fixed per-opcode lengths) with its own opcode set built around
//! config descriptors rather than copies. `INDIRECT` packets reference
//! further buffers and can be followed recursively.

#![forbid(unsafe_code)]

mod build;
mod decode;
mod opcode;
mod tables;

pub use crate::build::build_stream;
pub use crate::decode::{decode_stream, ib_target};
pub use crate::opcode::VpeOpcode;
pub use ringdec_sdma::header;
