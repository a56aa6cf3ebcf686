//! Graphics/compute (PM4) command-stream decoding.
//!
//! PM4 is the packet format consumed by the graphics and compute engine
//! front-ends. A buffer is a sequence of packets, each one header word plus
//! a payload whose length the header declares:
//!
//! - type 0: register block write (base offset in the low 16 bits, one
//!   register value per payload word)
//! - type 2: single-word filler
//! - type 3: typed opcode (opcode number in bits `[8, 16)`)
//!
//! Typed opcodes may reference further buffers (indirect buffers); the
//! builder can prefetch and attach those, and the decoder can follow them
//! recursively.

#![forbid(unsafe_code)]

mod build;
mod decode;
pub mod header;
mod opcode;
mod tables;

pub use crate::build::build_stream;
pub use crate::decode::{decode_stream, ib_target, IbTarget};
pub use crate::opcode::Pm4Opcode;
