//! Video-codec (VCN) command-stream decoding.
//!
//! The codec block speaks two unrelated formats:
//!
//! - **decode** rings carry PM4 type-0 register writes; the interesting ones
//!   program the `GPCOM_VCPU_*` mailbox with the address of a message buffer,
//!   which holds its own nested tagged-record format ([`msg`]).
//! - **encode** rings carry self-framed packages: a size word, an opcode
//!   word, then payload.
//!
//! Unlike the graphics and DMA families, a malformed token here aborts the
//! rest of the pass, not just the one token.

#![forbid(unsafe_code)]

pub mod dec;
pub mod enc;
pub mod msg;
